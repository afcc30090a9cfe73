use alert_config::{AppConfig, LoggingConfig, DEFAULT_SETTINGS};
use anyhow::Context;
use clap::Parser;
use dotenvy::dotenv;
use monitor::{run_alert_check, AlertStore, RpcReader, RunContext};
use notifications::{HealthCheckPing, SnsNotifier};
use store::PostgresStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Checks every configured on-chain read once and notifies on changed values.
#[derive(Debug, Parser)]
#[command(name = "alert_check", version)]
struct Cli {
    /// Settings file (extension optional, defaults to `Settings.*` in the working directory);
    /// environment variables prefixed ALERTS__ override it
    #[arg(long, env = "ALERT_SETTINGS")]
    settings: Option<String>,

    /// Keep checking the remaining alerts when one fails (the run still exits non-zero)
    #[arg(long)]
    isolate_failures: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    let cli = Cli::parse();

    let settings = match cli.settings.as_deref() {
        Some(path) => AppConfig::load(path),
        None => AppConfig::new(),
    }
    .with_context(|| {
        format!(
            "failed to load configuration from {}",
            cli.settings.as_deref().unwrap_or(DEFAULT_SETTINGS)
        )
    })?;
    init_logging(&settings.logging);

    let notifier = SnsNotifier::new(
        settings.notifications.topic_arn.clone(),
        settings.notifications.region.clone(),
    )
    .await;
    let heartbeat = settings.heartbeat.ping_url().map(HealthCheckPing::new);

    let store = PostgresStore::connect(&settings.database.url, settings.database.max_connections)
        .await
        .context("failed to connect to the alert database")?;

    if settings.database.run_migrations {
        if let Err(e) = store.migrate().await {
            store.close().await;
            return Err(e).context("failed to apply database migrations");
        }
    }

    let ctx = RunContext {
        store: &store,
        reader: &RpcReader,
        notifier: &notifier,
        heartbeat: heartbeat.as_ref(),
        subject_prefix: &settings.notifications.subject_prefix,
        heartbeat_policy: settings.heartbeat.policy,
        isolate_failures: cli.isolate_failures || settings.run.isolate_failures,
    };

    let report = run_alert_check(&ctx).await.context("alert check failed")?;
    info!(
        "Checked {} alerts: {} changed, {} unchanged",
        report.checked, report.changed, report.unchanged
    );

    Ok(())
}

fn init_logging(cfg: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", cfg.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if cfg.json {
        builder.json().init();
    } else {
        builder.init();
    }
}
