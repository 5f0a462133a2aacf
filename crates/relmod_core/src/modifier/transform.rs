//! Version transform values and the declarative rule language.
//!
//! # Responsibility
//! - Define the callable version-transform value carried by descriptors.
//! - Compile declarative rule tables from modifier manifests into callables.
//!
//! # Invariants
//! - Compiled transforms are pure: same env and version in, same string out.
//! - Rule compilation failures never produce a partially working transform.

use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Caller-supplied key/value environment passed to every transform call.
///
/// Release orchestrators typically populate this with branch or channel
/// metadata. An empty env is always valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModifierEnv {
    values: BTreeMap<String, String>,
}

impl ModifierEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one env entry, replacing any previous value for the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

type TransformFn = dyn Fn(&ModifierEnv, &str) -> String + Send + Sync;

/// Callable version transform.
///
/// Wraps either a native closure (builtin modifiers) or a compiled manifest
/// rule. Clones share the underlying callable.
#[derive(Clone)]
pub struct VersionTransform(Arc<TransformFn>);

impl VersionTransform {
    /// Wraps a native closure as a transform value.
    pub fn from_fn<F>(transform: F) -> Self
    where
        F: Fn(&ModifierEnv, &str) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(transform))
    }

    /// Transform returning the input version unchanged.
    pub fn identity() -> Self {
        Self::from_fn(|_env, version| version.to_string())
    }

    /// Applies the transform to one version string.
    pub fn apply(&self, env: &ModifierEnv, version: &str) -> String {
        (self.0)(env, version)
    }
}

impl Debug for VersionTransform {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("VersionTransform(<fn>)")
    }
}

impl PartialEq for VersionTransform {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Declarative transform rule as authored in modifier manifest files.
///
/// Unknown extra keys are ignored so manifests can carry annotations.
#[derive(Debug, Clone, Deserialize)]
pub struct TransformSpec {
    /// One of `append`, `prepend`, `set`, `replace`.
    pub rule: String,
    /// Payload for `append`/`prepend`/`set`.
    #[serde(default)]
    pub value: Option<String>,
    /// Regex matched against the version for `replace`.
    #[serde(default)]
    pub pattern: Option<String>,
    /// Replacement text for `replace`.
    #[serde(default)]
    pub with: Option<String>,
}

impl TransformSpec {
    /// Compiles the rule into a callable transform.
    ///
    /// Produced strings expand `{key}` placeholders from the env argument;
    /// unknown keys are kept literal.
    ///
    /// # Errors
    /// - Unknown rule names.
    /// - Missing `value`, `pattern` or `with` payloads.
    /// - Unparsable `replace` patterns.
    pub fn compile(&self) -> Result<VersionTransform, TransformRuleError> {
        match self.rule.trim() {
            "append" => {
                let value = self.required_value("append")?;
                Ok(VersionTransform::from_fn(move |env, version| {
                    format!("{version}{}", expand_env(env, &value))
                }))
            }
            "prepend" => {
                let value = self.required_value("prepend")?;
                Ok(VersionTransform::from_fn(move |env, version| {
                    format!("{}{version}", expand_env(env, &value))
                }))
            }
            "set" => {
                let value = self.required_value("set")?;
                Ok(VersionTransform::from_fn(move |env, _version| {
                    expand_env(env, &value)
                }))
            }
            "replace" => {
                let pattern = self
                    .pattern
                    .clone()
                    .ok_or(TransformRuleError::MissingPattern)?;
                let with = self
                    .with
                    .clone()
                    .ok_or(TransformRuleError::MissingReplacement)?;
                let matcher = Regex::new(&pattern).map_err(|err| {
                    TransformRuleError::InvalidPattern {
                        pattern: pattern.clone(),
                        source: err,
                    }
                })?;
                Ok(VersionTransform::from_fn(move |env, version| {
                    matcher
                        .replace_all(version, expand_env(env, &with).as_str())
                        .into_owned()
                }))
            }
            other => Err(TransformRuleError::UnknownRule(other.to_string())),
        }
    }

    fn required_value(&self, rule: &'static str) -> Result<String, TransformRuleError> {
        self.value
            .clone()
            .ok_or(TransformRuleError::MissingValue { rule })
    }
}

fn expand_env(env: &ModifierEnv, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let key = &after[..close];
                match env.get(key) {
                    Some(value) => out.push_str(value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Transform rule compilation errors.
#[derive(Debug)]
pub enum TransformRuleError {
    UnknownRule(String),
    MissingValue { rule: &'static str },
    MissingPattern,
    MissingReplacement,
    InvalidPattern { pattern: String, source: regex::Error },
    InvalidSpec(String),
}

impl Display for TransformRuleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownRule(value) => write!(f, "unknown transform rule: {value}"),
            Self::MissingValue { rule } => write!(f, "transform rule `{rule}` requires a value"),
            Self::MissingPattern => write!(f, "transform rule `replace` requires a pattern"),
            Self::MissingReplacement => {
                write!(f, "transform rule `replace` requires a `with` replacement")
            }
            Self::InvalidPattern { pattern, source } => {
                write!(f, "transform rule pattern `{pattern}` is invalid: {source}")
            }
            Self::InvalidSpec(message) => write!(f, "transform rule table is invalid: {message}"),
        }
    }
}

impl Error for TransformRuleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}
