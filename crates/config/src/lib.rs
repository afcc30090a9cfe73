//! # Config Structure
//!
//! This module defines the process configuration for an alert check run.
//! It uses the `config` crate to layer an optional settings file (`Settings.toml` by
//! default) under environment variables prefixed with `ALERTS__`, where `__` also
//! separates nested keys (`ALERTS__DATABASE__URL`, `ALERTS__HEARTBEAT__SLUG`, ...).
//!
//! Alert definitions themselves are not part of this configuration; they live in the
//! config store and are loaded at the start of every run.

use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "ALERTS";
pub const DEFAULT_SETTINGS: &str = "Settings";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub heartbeat: HeartbeatConfig,
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Apply the bundled schema migrations before loading alerts
    #[serde(default)]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// SNS topic every change notification is published to
    pub topic_arn: String,
    /// Falls back to the AWS default provider chain when unset
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_subject_prefix")]
    pub subject_prefix: String,
}

fn default_subject_prefix() -> String {
    "EHub Alert".to_string()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartbeatPolicy {
    /// Ping only when every alert was checked without error
    #[default]
    OnSuccess,
    /// Ping whenever the evaluation loop was entered, even if it aborted
    Always,
}

impl HeartbeatPolicy {
    pub fn should_ping(&self, completed: bool) -> bool {
        match self {
            HeartbeatPolicy::OnSuccess => completed,
            HeartbeatPolicy::Always => true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HeartbeatConfig {
    #[serde(default = "default_heartbeat_base_url")]
    pub base_url: String,
    /// Secret check slug; the heartbeat is skipped when unset
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub policy: HeartbeatPolicy,
}

fn default_heartbeat_base_url() -> String {
    "https://hc-ping.com".to_string()
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            base_url: default_heartbeat_base_url(),
            slug: None,
            policy: HeartbeatPolicy::default(),
        }
    }
}

impl HeartbeatConfig {
    /// Full ping URL, if a slug is configured.
    pub fn ping_url(&self) -> Option<String> {
        self.slug
            .as_deref()
            .filter(|slug| !slug.trim().is_empty())
            .map(|slug| format!("{}/{}", self.base_url.trim_end_matches('/'), slug.trim()))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunConfig {
    /// Keep checking the remaining alerts when one of them fails
    #[serde(default)]
    pub isolate_failures: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads `Settings.*` from the working directory (if present) and the environment.
    pub fn new() -> Result<Self, SettingsError> {
        Self::load(DEFAULT_SETTINGS)
    }

    /// Loads the given settings file (if present) and the environment.
    pub fn load(settings_path: &str) -> Result<Self, SettingsError> {
        let builder = Config::builder()
            .add_source(File::with_name(settings_path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let cfg: AppConfig = builder.build()?.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses configuration from an in-memory TOML document, without environment overrides.
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        let cfg: AppConfig = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.database.url.trim().is_empty() {
            return Err(SettingsError::Invalid("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(SettingsError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }
        if self.notifications.topic_arn.trim().is_empty() {
            return Err(SettingsError::Invalid(
                "notifications.topic_arn must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [database]
        url = "postgres://localhost/alerts"

        [notifications]
        topic_arn = "arn:aws:sns:eu-west-1:123456789012:alerts"
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let cfg = AppConfig::from_toml(MINIMAL).unwrap();

        assert_eq!(cfg.database.max_connections, 1);
        assert!(!cfg.database.run_migrations);
        assert_eq!(cfg.notifications.subject_prefix, "EHub Alert");
        assert_eq!(cfg.notifications.region, None);
        assert_eq!(cfg.heartbeat.base_url, "https://hc-ping.com");
        assert_eq!(cfg.heartbeat.policy, HeartbeatPolicy::OnSuccess);
        assert!(!cfg.run.isolate_failures);
        assert_eq!(cfg.logging.level, "info");
    }

    #[test]
    fn test_full_config() {
        let cfg = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://db/alerts"
            max_connections = 2
            run_migrations = true

            [notifications]
            topic_arn = "arn:aws:sns:us-east-1:1:t"
            region = "us-east-1"
            subject_prefix = "Chain Alert"

            [heartbeat]
            base_url = "https://hc.example.com/"
            slug = "abc-123"
            policy = "always"

            [run]
            isolate_failures = true

            [logging]
            level = "debug"
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(cfg.database.max_connections, 2);
        assert!(cfg.database.run_migrations);
        assert_eq!(cfg.notifications.region.as_deref(), Some("us-east-1"));
        assert_eq!(cfg.notifications.subject_prefix, "Chain Alert");
        assert_eq!(cfg.heartbeat.policy, HeartbeatPolicy::Always);
        assert_eq!(
            cfg.heartbeat.ping_url().as_deref(),
            Some("https://hc.example.com/abc-123")
        );
        assert!(cfg.run.isolate_failures);
        assert!(cfg.logging.json);
    }

    #[test]
    fn test_missing_topic_is_rejected() {
        let err = AppConfig::from_toml(
            r#"
            [database]
            url = "postgres://db/alerts"

            [notifications]
            topic_arn = "  "
            "#,
        )
        .unwrap_err();

        assert!(matches!(err, SettingsError::Invalid(_)));
    }

    #[test]
    fn test_ping_url_requires_slug() {
        let mut hb = HeartbeatConfig::default();
        assert_eq!(hb.ping_url(), None);

        hb.slug = Some("".into());
        assert_eq!(hb.ping_url(), None);

        hb.slug = Some("slug".into());
        assert_eq!(hb.ping_url().as_deref(), Some("https://hc-ping.com/slug"));
    }

    #[test]
    fn test_heartbeat_policy() {
        assert!(HeartbeatPolicy::OnSuccess.should_ping(true));
        assert!(!HeartbeatPolicy::OnSuccess.should_ping(false));
        assert!(HeartbeatPolicy::Always.should_ping(false));
    }
}
