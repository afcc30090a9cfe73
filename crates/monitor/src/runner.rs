//! # Alert Run
//! One complete pass: load the alert definitions, evaluate them in order, then finalize.
//!
//! Finalizing always releases the store once the definitions were requested, and decides
//! explicitly whether the heartbeat fires: under `HeartbeatPolicy::OnSuccess` only a loop
//! that checked every alert without error pings, `HeartbeatPolicy::Always` pings after any
//! loop that was entered. A failed config load never pings.

use crate::error::{MonitorError, Result};
use crate::evaluator::AlertEvaluator;
use crate::primitives::models::RunReport;
use crate::reader::RemoteReader;
use crate::store::AlertStore;
use alert_config::HeartbeatPolicy;
use notifications::{Heartbeat, Notifier};
use tracing::{error, info, warn};

/// Everything one run needs, constructed once by the caller.
pub struct RunContext<'a, S, R, N, H> {
    pub store: &'a S,
    pub reader: &'a R,
    pub notifier: &'a N,
    pub heartbeat: Option<&'a H>,
    pub subject_prefix: &'a str,
    pub heartbeat_policy: HeartbeatPolicy,
    pub isolate_failures: bool,
}

pub async fn run_alert_check<S, R, N, H>(ctx: &RunContext<'_, S, R, N, H>) -> Result<RunReport>
where
    S: AlertStore,
    R: RemoteReader,
    N: Notifier,
    H: Heartbeat,
{
    let definitions = match ctx.store.load_definitions().await {
        Ok(definitions) => definitions,
        Err(e) => {
            error!("Failed to load alert definitions: {}", e);
            ctx.store.close().await;
            return Err(e);
        }
    };
    info!("Loaded {} alert definitions", definitions.len());

    let evaluator = AlertEvaluator::new(ctx.store, ctx.reader, ctx.notifier, ctx.subject_prefix)
        .isolate_failures(ctx.isolate_failures);
    let mut report = RunReport::default();
    let evaluated = evaluator.evaluate(&definitions, &mut report).await;

    ctx.store.close().await;

    let completed = evaluated.is_ok() && report.failed.is_empty();
    info!(
        checked = report.checked,
        changed = report.changed,
        unchanged = report.unchanged,
        failed = report.failed.len(),
        completed,
        "Alert check finished"
    );

    let pinged = send_heartbeat(ctx, completed).await;

    match (evaluated, pinged) {
        (Err(e), Err(ping_err)) => {
            error!("Health check ping failed: {}", ping_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), Err(ping_err)) => Err(ping_err),
        (Ok(()), Ok(())) if !report.failed.is_empty() => Err(MonitorError::AlertsFailed {
            failed: report.failed.len(),
            total: report.checked,
        }),
        (Ok(()), Ok(())) => Ok(report),
    }
}

async fn send_heartbeat<S, R, N, H>(ctx: &RunContext<'_, S, R, N, H>, completed: bool) -> Result<()>
where
    H: Heartbeat,
{
    if !ctx.heartbeat_policy.should_ping(completed) {
        warn!(
            policy = ?ctx.heartbeat_policy,
            "Not all alerts were checked successfully - skipping health check ping"
        );
        return Ok(());
    }

    let Some(heartbeat) = ctx.heartbeat else {
        warn!("No health check configured - skipping ping");
        return Ok(());
    };

    if completed {
        info!("All alerts checked successfully - Sending health check ping");
    } else {
        warn!(policy = ?ctx.heartbeat_policy, "Alert check failed - sending health check ping anyway");
    }
    heartbeat.ping().await?;
    Ok(())
}
