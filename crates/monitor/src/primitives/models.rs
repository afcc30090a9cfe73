use crate::error::{MonitorError, Result};
use crate::primitives::utils::{coerce_inputs, parse_function, render_outputs};
use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::Function;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One configured read call, as stored in the config store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertDefinition {
    pub name: String,
    pub rpc_url: String,
    pub contract_address: String, // kept as String in the store, parsed to Address when the call is made
    pub function_abi_string: String,
    pub function_name: String,
    #[serde(default)]
    pub function_inputs: Option<Vec<serde_json::Value>>,
}

impl AlertDefinition {
    /// Resolves the ABI string, function name and inputs into a call descriptor.
    pub fn call_descriptor(&self) -> Result<CallDescriptor> {
        let function = parse_function(&self.function_abi_string, &self.function_name)?;
        let raw_inputs = self.function_inputs.as_deref().unwrap_or_default();
        let inputs = coerce_inputs(&function, raw_inputs)?;

        Ok(CallDescriptor { function, inputs })
    }
}

/// Last observed value for an alert, keyed by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertState {
    pub name: String,
    pub value: String,
    pub timestamp: DateTime<Utc>,
}

/// A single-function read call: which function and with which arguments.
#[derive(Debug, Clone)]
pub struct CallDescriptor {
    pub function: Function,
    pub inputs: Vec<DynSolValue>,
}

impl CallDescriptor {
    /// Selector followed by the ABI-encoded arguments.
    pub fn calldata(&self) -> Result<Vec<u8>> {
        self.function
            .abi_encode_input(&self.inputs)
            .map_err(|e| MonitorError::Encode {
                function: self.function.name.clone(),
                reason: e.to_string(),
            })
    }

    /// Decodes the raw `eth_call` return data into its canonical string form.
    pub fn decode_output(&self, data: &[u8]) -> Result<String> {
        let values = self
            .function
            .abi_decode_output(data)
            .map_err(|e| MonitorError::Decode {
                function: self.function.name.clone(),
                reason: e.to_string(),
            })?;

        Ok(render_outputs(&values))
    }
}

/// Counters for one run of the evaluation loop.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub checked: usize,
    pub changed: usize,
    pub unchanged: usize,
    pub failed: Vec<FailedCheck>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedCheck {
    pub name: String,
    pub error: String,
}
