//! AWS SNS delivery for change notifications.

use crate::{Alert, NotificationDestination, Notifier, NotifyError};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sns::error::DisplayErrorContext;
use tracing::{debug, info};

/// Publishes every alert to a single SNS topic.
#[derive(Clone)]
pub struct SnsNotifier {
    client: aws_sdk_sns::Client,
    destination: NotificationDestination,
}

impl SnsNotifier {
    /// Builds the SNS client from the AWS default provider chain, optionally pinning the region.
    pub async fn new(topic_arn: String, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        info!("SNS notifications enabled for topic {}", topic_arn);
        Self {
            client: aws_sdk_sns::Client::new(&sdk_config),
            destination: NotificationDestination::Sns { topic_arn },
        }
    }
}

impl Notifier for SnsNotifier {
    async fn send(&self, alert: &Alert) -> Result<(), NotifyError> {
        match &self.destination {
            NotificationDestination::Sns { topic_arn } => {
                let output = self
                    .client
                    .publish()
                    .topic_arn(topic_arn)
                    .subject(&alert.subject)
                    .message(&alert.message)
                    .send()
                    .await
                    .map_err(|e| NotifyError::Publish(DisplayErrorContext(&e).to_string()))?;

                debug!(
                    message_id = output.message_id().unwrap_or_default(),
                    "SNS notification published for {}", alert.source
                );
                Ok(())
            }
        }
    }
}
