use notifications::NotifyError;
use thiserror::Error;

/// Errors raised while loading, checking, or finalizing an alert run
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("invalid RPC url {url}: {reason}")]
    InvalidRpcUrl { url: String, reason: String },

    #[error("RPC request to {url} failed: {reason}")]
    Rpc { url: String, reason: String },

    #[error("invalid contract address {0}")]
    InvalidAddress(String),

    #[error("invalid function ABI {abi:?}: {reason}")]
    InvalidAbi { abi: String, reason: String },

    #[error("function name mismatch: configured {configured}, ABI declares {declared}")]
    FunctionMismatch { configured: String, declared: String },

    #[error("{function} expects {expected} inputs, got {got}")]
    InputArity {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid input #{index} for {function}: {reason}")]
    InvalidInput {
        function: String,
        index: usize,
        reason: String,
    },

    #[error("failed to encode call to {function}: {reason}")]
    Encode { function: String, reason: String },

    #[error("failed to decode {function} output: {reason}")]
    Decode { function: String, reason: String },

    #[error("store error: {0}")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("alert {name}: {source}")]
    Alert {
        name: String,
        #[source]
        source: Box<MonitorError>,
    },

    #[error("{failed} of {total} alert checks failed")]
    AlertsFailed { failed: usize, total: usize },
}

impl MonitorError {
    pub fn for_alert(name: &str, source: MonitorError) -> Self {
        MonitorError::Alert {
            name: name.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T> = std::result::Result<T, MonitorError>;
