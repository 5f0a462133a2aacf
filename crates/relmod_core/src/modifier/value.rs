//! Duck-typed value model for loaded modifier modules.
//!
//! # Responsibility
//! - Define the tagged union covering every as-loaded module shape.
//! - Define the normalized descriptor returned to callers.
//!
//! # Invariants
//! - A returned descriptor always carries a non-empty `name` and a callable
//!   `version`.
//! - `Wrapped` appears only at the root of a classified document.

use crate::modifier::transform::VersionTransform;
use std::collections::BTreeMap;

/// As-loaded module value before normalization.
///
/// Shape dispatch works on these tags instead of runtime type probing:
/// wrapper unwrap first, then table, then transform, then rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Flag(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<RawValue>),
    Table(BTreeMap<String, RawValue>),
    /// Callable version transform.
    Transform(VersionTransform),
    /// Payload of a truthy `default` field (default-export interop).
    Wrapped(Box<RawValue>),
}

/// Stable runtime type name carried in error payloads.
pub fn raw_type_name(value: &RawValue) -> &'static str {
    match value {
        RawValue::Null => "null",
        RawValue::Flag(_) => "boolean",
        RawValue::Integer(_) => "integer",
        RawValue::Float(_) => "float",
        RawValue::Text(_) => "string",
        RawValue::List(_) => "array",
        RawValue::Table(_) | RawValue::Wrapped(_) => "table",
        RawValue::Transform(_) => "transform",
    }
}

/// Normalized modifier representation returned to callers.
#[derive(Debug, Clone)]
pub struct ModifierDescriptor {
    /// Display name; guaranteed non-empty text.
    pub name: String,
    /// Version transform; guaranteed callable.
    pub version: VersionTransform,
    /// Last published release, when the module declares one.
    pub last_release: Option<String>,
    /// Pass-through of any remaining module fields.
    pub extra: BTreeMap<String, RawValue>,
}
