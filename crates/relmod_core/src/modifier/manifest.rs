//! Modifier manifest documents and shape classification.
//!
//! Modifier files are JSON documents. Classification maps a parsed document
//! onto [`RawValue`] with fixed precedence: default-export unwrap at the
//! root, then transform rule tables, then plain tables, then scalars.

use crate::modifier::transform::{TransformRuleError, TransformSpec};
use crate::modifier::value::RawValue;
use crate::options::is_truthy;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const DEFAULT_EXPORT_KEY: &str = "default";
const RULE_KEY: &str = "rule";

/// Classifies a parsed manifest document into a raw module value.
///
/// The `default` wrapper is honored at the document root only, matching
/// compiled default-export interop: a truthy `default` field wraps its
/// payload, a false-like one leaves the surrounding table in place.
///
/// # Errors
/// - Malformed or uncompilable transform rule tables. These count as module
///   evaluation failures and surface through the resolution error class.
pub fn classify_document(document: Value) -> Result<RawValue, TransformRuleError> {
    match document {
        Value::Object(mut map) => match map.remove(DEFAULT_EXPORT_KEY) {
            Some(inner) if is_truthy(&inner) => {
                Ok(RawValue::Wrapped(Box::new(classify_value(inner)?)))
            }
            Some(inner) => {
                map.insert(DEFAULT_EXPORT_KEY.to_string(), inner);
                classify_table(map)
            }
            None => classify_table(map),
        },
        other => classify_value(other),
    }
}

fn classify_value(value: Value) -> Result<RawValue, TransformRuleError> {
    match value {
        Value::Null => Ok(RawValue::Null),
        Value::Bool(flag) => Ok(RawValue::Flag(flag)),
        Value::Number(number) => match number.as_i64() {
            Some(whole) => Ok(RawValue::Integer(whole)),
            None => Ok(RawValue::Float(number.as_f64().unwrap_or(f64::NAN))),
        },
        Value::String(text) => Ok(RawValue::Text(text)),
        Value::Array(items) => Ok(RawValue::List(
            items
                .into_iter()
                .map(classify_value)
                .collect::<Result<Vec<_>, _>>()?,
        )),
        Value::Object(map) => {
            if map.contains_key(RULE_KEY) {
                let spec: TransformSpec = serde_json::from_value(Value::Object(map))
                    .map_err(|err| TransformRuleError::InvalidSpec(err.to_string()))?;
                Ok(RawValue::Transform(spec.compile()?))
            } else {
                classify_table(map)
            }
        }
    }
}

fn classify_table(map: Map<String, Value>) -> Result<RawValue, TransformRuleError> {
    let mut fields = BTreeMap::new();
    for (key, value) in map {
        fields.insert(key, classify_value(value)?);
    }
    Ok(RawValue::Table(fields))
}
