//! # Alert Evaluator
//! Checks every alert definition in order: look up the last known value, perform the
//! remote read, and on change persist the new value before sending the notification.

use crate::error::{MonitorError, Result};
use crate::primitives::models::{AlertDefinition, AlertState, FailedCheck, RunReport};
use crate::reader::RemoteReader;
use crate::store::AlertStore;
use chrono::Utc;
use notifications::{Alert, Notifier};
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Changed {
        previous: Option<String>,
        current: String,
    },
    Unchanged,
}

/// A value counts as changed when nothing was stored yet or the stored rendering differs.
pub fn has_changed(prior: Option<&AlertState>, current: &str) -> bool {
    match prior {
        None => true,
        Some(state) => state.value != current,
    }
}

pub struct AlertEvaluator<'a, S, R, N> {
    store: &'a S,
    reader: &'a R,
    notifier: &'a N,
    subject_prefix: &'a str,
    isolate_failures: bool,
}

impl<'a, S, R, N> AlertEvaluator<'a, S, R, N>
where
    S: AlertStore,
    R: RemoteReader,
    N: Notifier,
{
    pub fn new(store: &'a S, reader: &'a R, notifier: &'a N, subject_prefix: &'a str) -> Self {
        Self {
            store,
            reader,
            notifier,
            subject_prefix,
            isolate_failures: false,
        }
    }

    /// Record failing alerts and keep going instead of aborting the loop.
    pub fn isolate_failures(mut self, isolate: bool) -> Self {
        self.isolate_failures = isolate;
        self
    }

    /// Checks a single alert.
    pub async fn check(&self, definition: &AlertDefinition) -> Result<CheckOutcome> {
        info!("Checking alert: {}", definition.name);

        let prior = self.store.find_state(&definition.name).await?;
        let current = self.reader.read(definition).await?;

        if !has_changed(prior.as_ref(), &current) {
            debug!("Value unchanged for {}: {}", definition.name, current);
            return Ok(CheckOutcome::Unchanged);
        }

        let previous = prior.map(|state| state.value);
        info!(
            old_value = previous.as_deref().unwrap_or("null"),
            new_value = %current,
            "Updating value {}", definition.name
        );

        // the store must reflect the new value before anyone is told about it
        self.store
            .upsert_state(&AlertState {
                name: definition.name.clone(),
                value: current.clone(),
                timestamp: Utc::now(),
            })
            .await?;

        let alert = Alert::value_changed(
            self.subject_prefix,
            &definition.name,
            previous.as_deref(),
            &current,
        );
        self.notifier.send(&alert).await?;
        info!("Notification sent successfully for: {}", definition.name);

        Ok(CheckOutcome::Changed { previous, current })
    }

    /// Checks every definition in order, accumulating counters into `report`.
    ///
    /// Without failure isolation the first error is returned immediately and the remaining
    /// alerts are skipped; `report` still reflects the alerts checked up to that point.
    pub async fn evaluate(
        &self,
        definitions: &[AlertDefinition],
        report: &mut RunReport,
    ) -> Result<()> {
        for definition in definitions {
            let outcome = self.check(definition).await;
            report.checked += 1;

            match outcome {
                Ok(CheckOutcome::Changed { .. }) => report.changed += 1,
                Ok(CheckOutcome::Unchanged) => report.unchanged += 1,
                Err(e) => {
                    let err = MonitorError::for_alert(&definition.name, e);
                    if !self.isolate_failures {
                        return Err(err);
                    }
                    error!("Alert check failed: {}", err);
                    report.failed.push(FailedCheck {
                        name: definition.name.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
