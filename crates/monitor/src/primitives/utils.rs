use crate::error::{MonitorError, Result};
use alloy::dyn_abi::{DynSolType, DynSolValue, Specifier};
use alloy::primitives::hex;
use alloy::json_abi::{Function, JsonAbi};

/// Parses a single-function ABI descriptor.
///
/// Accepts the human-readable form (`function totalSupply() view returns (uint256)`),
/// a JSON ABI fragment object, or a JSON ABI array. The resolved function must be named
/// `function_name` and must declare at least one return value.
pub fn parse_function(abi_string: &str, function_name: &str) -> Result<Function> {
    let trimmed = abi_string.trim();
    let invalid = |reason: String| MonitorError::InvalidAbi {
        abi: abi_string.to_string(),
        reason,
    };

    let function = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        let json = if trimmed.starts_with('{') {
            format!("[{}]", trimmed)
        } else {
            trimmed.to_string()
        };
        let abi: JsonAbi = serde_json::from_str(&json).map_err(|e| invalid(e.to_string()))?;

        // first instance wins when the function is overloaded
        match abi.function(function_name).and_then(|f| f.first()) {
            Some(func) => func.clone(),
            None => {
                let declared = abi
                    .functions()
                    .map(|f| f.name.clone())
                    .collect::<Vec<_>>()
                    .join(",");
                return Err(MonitorError::FunctionMismatch {
                    configured: function_name.to_string(),
                    declared,
                });
            }
        }
    } else {
        Function::parse(trimmed).map_err(|e| invalid(e.to_string()))?
    };

    if function.name != function_name {
        return Err(MonitorError::FunctionMismatch {
            configured: function_name.to_string(),
            declared: function.name,
        });
    }
    if function.outputs.is_empty() {
        return Err(invalid("function declares no return values".to_string()));
    }

    Ok(function)
}

/// Converts the configured JSON inputs into typed ABI values, one per declared parameter.
pub fn coerce_inputs(function: &Function, raw: &[serde_json::Value]) -> Result<Vec<DynSolValue>> {
    if raw.len() != function.inputs.len() {
        return Err(MonitorError::InputArity {
            function: function.name.clone(),
            expected: function.inputs.len(),
            got: raw.len(),
        });
    }

    function
        .inputs
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (param, value))| {
            let invalid = |reason: String| MonitorError::InvalidInput {
                function: function.name.clone(),
                index,
                reason,
            };
            let ty = param.resolve().map_err(|e| invalid(e.to_string()))?;
            coerce_value(&ty, value).map_err(invalid)
        })
        .collect()
}

/// Converts one JSON value into `ty`, walking arrays element by element so that nested
/// addresses, bytes and strings are coerced unquoted.
fn coerce_value(
    ty: &DynSolType,
    value: &serde_json::Value,
) -> std::result::Result<DynSolValue, String> {
    use serde_json::Value;

    match (ty, value) {
        (DynSolType::Array(inner), Value::Array(items)) => {
            let types = vec![inner.as_ref(); items.len()];
            Ok(DynSolValue::Array(coerce_all(&types, items)?))
        }
        (DynSolType::FixedArray(inner, len), Value::Array(items)) => {
            if items.len() != *len {
                return Err(format!("expected {} elements, got {}", len, items.len()));
            }
            let types = vec![inner.as_ref(); items.len()];
            Ok(DynSolValue::FixedArray(coerce_all(&types, items)?))
        }
        (DynSolType::Tuple(components), Value::Array(items)) => {
            if items.len() != components.len() {
                return Err(format!(
                    "expected {} tuple components, got {}",
                    components.len(),
                    items.len()
                ));
            }
            let types = components.iter().collect::<Vec<_>>();
            Ok(DynSolValue::Tuple(coerce_all(&types, items)?))
        }
        (ty, Value::String(s)) => ty.coerce_str(s).map_err(|e| e.to_string()),
        (ty, other) => ty.coerce_str(&other.to_string()).map_err(|e| e.to_string()),
    }
}

fn coerce_all(
    types: &[&DynSolType],
    items: &[serde_json::Value],
) -> std::result::Result<Vec<DynSolValue>, String> {
    types
        .iter()
        .zip(items)
        .map(|(ty, item)| coerce_value(ty, item))
        .collect()
}

/// Renders decoded return values the way they are stored and compared.
///
/// A single output renders as itself; several outputs are joined with `,`.
pub fn render_outputs(values: &[DynSolValue]) -> String {
    values.iter().map(render_value).collect::<Vec<_>>().join(",")
}

/// Canonical string form of a decoded value: decimal integers, checksummed addresses,
/// 0x-prefixed hex bytes, and `,`-joined sequences.
pub fn render_value(value: &DynSolValue) -> String {
    match value {
        DynSolValue::Bool(b) => b.to_string(),
        DynSolValue::Int(n, _) => n.to_string(),
        DynSolValue::Uint(n, _) => n.to_string(),
        DynSolValue::FixedBytes(word, size) => hex::encode_prefixed(&word[..*size]),
        DynSolValue::Address(addr) => addr.to_checksum(None),
        DynSolValue::Function(func) => hex::encode_prefixed(func.as_slice()),
        DynSolValue::Bytes(bytes) => hex::encode_prefixed(bytes),
        DynSolValue::String(s) => s.clone(),
        DynSolValue::Array(items) | DynSolValue::FixedArray(items) | DynSolValue::Tuple(items) => {
            render_outputs(items)
        }
        // struct values (eip712) render like tuples, anything else as its ABI encoding
        #[allow(unreachable_patterns)]
        other => match other.as_fixed_seq() {
            Some(items) => render_outputs(items),
            None => hex::encode_prefixed(other.abi_encode()),
        },
    }
}
