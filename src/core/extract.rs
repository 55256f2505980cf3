use crate::domain::model::CustomerId;
use crate::utils::error::{EtlError, Result};
use serde_json::Value;

const CUSTOMER_ID_KEY: &str = "CustomerID";

/// Parses `{"CustomerID": {"<row>": <id>, ...}}` into the ids, in document order.
pub fn extract_ids(bytes: &[u8]) -> Result<Vec<CustomerId>> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| EtlError::MalformedInputError {
            message: format!("not valid JSON: {}", e),
        })?;

    let mapping = document
        .get(CUSTOMER_ID_KEY)
        .ok_or_else(|| EtlError::MalformedInputError {
            message: format!("\"{}\" key is missing", CUSTOMER_ID_KEY),
        })?
        .as_object()
        .ok_or_else(|| EtlError::MalformedInputError {
            message: format!("\"{}\" must map row keys to ids", CUSTOMER_ID_KEY),
        })?;

    let ids = mapping
        .iter()
        .map(|(row, value)| to_customer_id(row, value))
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(count = ids.len(), "extracted customer ids");
    Ok(ids)
}

fn to_customer_id(row: &str, value: &Value) -> Result<CustomerId> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| {
                // pandas writes integer columns with NaNs as floats, e.g. 7.0
                n.as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                    .map(|f| f as i64)
            })
            .map(CustomerId::Int)
            .ok_or_else(|| EtlError::MalformedInputError {
                message: format!("row {}: {} is not an integer id", row, n),
            }),
        Value::String(s) => Ok(CustomerId::Text(s.clone())),
        other => Err(EtlError::MalformedInputError {
            message: format!("row {}: unsupported id value {}", row, other),
        }),
    }
}
