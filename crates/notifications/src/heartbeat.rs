//! Liveness ping sent once per run to an external health-check service.

use crate::NotifyError;
use reqwest::Client;
use tracing::{debug, info};

#[allow(async_fn_in_trait)]
pub trait Heartbeat {
    async fn ping(&self) -> Result<(), NotifyError>;
}

/// Pings a healthchecks.io style URL (`<base>/<slug>`) with a plain GET.
#[derive(Clone)]
pub struct HealthCheckPing {
    client: Client,
    url: String,
}

impl HealthCheckPing {
    pub fn new(url: String) -> Self {
        Self {
            client: Client::new(),
            url,
        }
    }
}

impl Heartbeat for HealthCheckPing {
    async fn ping(&self) -> Result<(), NotifyError> {
        info!("Sending health check ping");
        let resp = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| NotifyError::Heartbeat {
                url: self.url.clone(),
                reason: e.to_string(),
            })?;
        // the monitor only cares that the request arrived
        debug!(status = %resp.status(), "Health check ping answered");
        Ok(())
    }
}
