//! Caller-supplied configuration mapping.
//!
//! # Responsibility
//! - Hold loader options with their original JSON typing, so misconfigured
//!   entries can be reported with the actual runtime type.
//! - Provide the shared JSON truthiness and type-name helpers.

use serde_json::{Map, Value};

/// Option key naming the modifier module to load.
pub const MODIFIER_OPTION: &str = "modifier";

/// Configuration mapping consumed by the loader.
///
/// Absent entries and false-like values both mean "feature disabled".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoaderOptions {
    values: Map<String, Value>,
}

impl LoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an already-parsed configuration object.
    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Sets one option, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Builder-style variant of [`LoaderOptions::set`].
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the configured modifier entry, typed as authored.
    pub fn modifier(&self) -> Option<&Value> {
        self.get(MODIFIER_OPTION)
    }
}

/// JS-style truthiness for configuration and manifest values.
///
/// `null`, `false`, `0` and `""` are false-like; arrays and objects are
/// always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Stable runtime type name for configuration values.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
