pub mod error;
pub mod evaluator;
pub mod reader;
pub mod runner;
pub mod store;

pub mod primitives {
    pub mod models;
    pub mod utils;
}

#[cfg(test)]
mod testing;

pub use error::MonitorError;
pub use evaluator::{AlertEvaluator, CheckOutcome};
pub use primitives::models::{AlertDefinition, AlertState, CallDescriptor, FailedCheck, RunReport};
pub use reader::{ContractReader, RemoteReader, RpcReader};
pub use runner::{run_alert_check, RunContext};
pub use store::AlertStore;
