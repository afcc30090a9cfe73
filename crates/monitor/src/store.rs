use crate::error::Result;
use crate::primitives::models::{AlertDefinition, AlertState};

/// The persistent store holding alert definitions (read-only) and last-known values.
#[allow(async_fn_in_trait)]
pub trait AlertStore {
    /// Every configured alert, in the order the store returns them.
    async fn load_definitions(&self) -> Result<Vec<AlertDefinition>>;

    /// Last observed value for `name`; `None` if it was never observed.
    async fn find_state(&self, name: &str) -> Result<Option<AlertState>>;

    /// Inserts the state, or overwrites the existing row with the same name.
    async fn upsert_state(&self, state: &AlertState) -> Result<()>;

    /// Releases the underlying connection.
    async fn close(&self);
}
