pub mod heartbeat;
pub mod sns;

pub use heartbeat::{Heartbeat, HealthCheckPing};
pub use sns::SnsNotifier;

/// SNS rejects subjects longer than this.
pub const MAX_SUBJECT_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("SNS publish failed: {0}")]
    Publish(String),

    #[error("heartbeat request to {url} failed: {reason}")]
    Heartbeat { url: String, reason: String },
}

/// A generic payload for any alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub source: String,
    pub subject: String,
    pub message: String,
}

impl Alert {
    /// Builds the change notification for a watched value.
    pub fn value_changed(
        subject_prefix: &str,
        name: &str,
        old_value: Option<&str>,
        new_value: &str,
    ) -> Self {
        Self {
            source: name.to_string(),
            subject: sanitize_subject(&format!("{}: {}", subject_prefix, name)),
            message: format!(
                "{} has changed!\nOld value: {}\nNew Value: {}",
                name,
                old_value.unwrap_or("null"),
                new_value
            ),
        }
    }
}

/// SNS subjects must be printable ASCII on a single line.
fn sanitize_subject(subject: &str) -> String {
    subject
        .chars()
        .map(|c| match c {
            c if c.is_control() => ' ',
            c if !c.is_ascii() => '?',
            c => c,
        })
        .take(MAX_SUBJECT_LEN)
        .collect()
}

#[derive(Debug, Clone)]
pub enum NotificationDestination {
    Sns { topic_arn: String },
}

/// Outbound channel for change notifications.
#[allow(async_fn_in_trait)]
pub trait Notifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError>;
}
