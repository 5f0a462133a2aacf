//! Modifier loading pipeline.
//!
//! # Responsibility
//! - Drive option extraction, module resolution, shape normalization and
//!   contract validation as one linear pipeline with early exits.
//!
//! # Invariants
//! - Absent or false-like `modifier` options return `None`, never an error.
//! - Validation fails on the first violated rule.
//! - The reporter fires exactly once, only on success.

use crate::context::LoadContext;
use crate::modifier::errors::{
    LoadResult, ModifierError, ModifierErrors, ResolveError,
};
use crate::modifier::resolver::{BuiltinModifiers, FileResolver, LoadedModule, ModuleResolver};
use crate::modifier::value::{raw_type_name, ModifierDescriptor, RawValue};
use crate::options::{is_truthy, json_type_name};
use log::info;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Name synthesized for bare-transform modifiers.
pub const DEFAULT_MODIFIER_NAME: &str = "Unknown modifier";

/// Loads modifiers through an ordered resolver chain.
pub struct ModifierLoader {
    resolvers: Vec<Arc<dyn ModuleResolver>>,
}

impl Default for ModifierLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModifierLoader {
    /// Loader with the stock tiers: builtin registry, then the filesystem.
    pub fn new() -> Self {
        Self::with_builtins(BuiltinModifiers::with_defaults())
    }

    /// Loader with a caller-assembled builtin registry ahead of the
    /// filesystem tier.
    pub fn with_builtins(builtins: BuiltinModifiers) -> Self {
        Self {
            resolvers: vec![Arc::new(builtins), Arc::new(FileResolver)],
        }
    }

    /// Loader with an explicit resolver chain, tried in order.
    pub fn with_resolvers(resolvers: Vec<Arc<dyn ModuleResolver>>) -> Self {
        Self { resolvers }
    }

    /// Loads the configured modifier, if any.
    ///
    /// Returns `Ok(None)` when the `modifier` option is absent or
    /// false-like; disabling the feature is not an error.
    ///
    /// # Errors
    /// - [`crate::modifier::errors::LoaderError::Invalid`] for the
    ///   enumerated user-input failures.
    /// - [`crate::modifier::errors::LoaderError::Resolve`] when no tier can
    ///   locate or evaluate the module.
    pub fn load(&self, context: &LoadContext) -> LoadResult<Option<ModifierDescriptor>> {
        let Some(configured) = context.options.modifier() else {
            return Ok(None);
        };
        if !is_truthy(configured) {
            return Ok(None);
        }
        let Value::String(spec) = configured else {
            return Err(ModifierError::InvalidPathType {
                actual: json_type_name(configured),
            }
            .into());
        };

        let module = self.resolve(spec, context)?;
        let descriptor = build_descriptor(normalize(module.value))?;

        info!(
            "event=modifier_loaded module=loader status=ok name={} source={}",
            descriptor.name, module.source
        );
        context.reporter.success(&format!(
            "Loaded modifier \"{}\" from \"{}\"",
            descriptor.name, spec
        ));
        Ok(Some(descriptor))
    }

    fn resolve(&self, spec: &str, context: &LoadContext) -> Result<LoadedModule, ResolveError> {
        for resolver in &self.resolvers {
            if let Some(module) = resolver.try_load(spec, context)? {
                return Ok(module);
            }
        }
        Err(ResolveError::NotFound {
            spec: spec.to_string(),
        })
    }
}

/// Loads the configured modifier with the stock resolver chain.
pub fn load_modifier(context: &LoadContext) -> LoadResult<Option<ModifierDescriptor>> {
    ModifierLoader::new().load(context)
}

fn normalize(raw: RawValue) -> RawValue {
    match raw {
        RawValue::Wrapped(inner) => *inner,
        other => other,
    }
}

fn build_descriptor(candidate: RawValue) -> Result<ModifierDescriptor, ModifierErrors> {
    match candidate {
        RawValue::Table(fields) => descriptor_from_fields(fields),
        RawValue::Transform(version) => Ok(ModifierDescriptor {
            name: DEFAULT_MODIFIER_NAME.to_string(),
            version,
            last_release: None,
            extra: BTreeMap::new(),
        }),
        other => Err(ModifierErrors::of(ModifierError::InvalidShape {
            actual: raw_type_name(&other),
        })),
    }
}

fn descriptor_from_fields(
    mut fields: BTreeMap<String, RawValue>,
) -> Result<ModifierDescriptor, ModifierErrors> {
    let name = match fields.remove("name") {
        Some(RawValue::Text(name)) if !name.is_empty() => name,
        Some(other) => {
            return Err(ModifierErrors::of(ModifierError::MissingName {
                actual: raw_type_name(&other),
            }))
        }
        None => {
            return Err(ModifierErrors::of(ModifierError::MissingName {
                actual: "missing",
            }))
        }
    };

    let version = match fields.remove("version") {
        Some(RawValue::Transform(version)) => version,
        Some(other) => {
            return Err(ModifierErrors::of(ModifierError::MissingRequiredField {
                field: "version",
                actual: raw_type_name(&other),
            }))
        }
        None => {
            return Err(ModifierErrors::of(ModifierError::MissingRequiredField {
                field: "version",
                actual: "missing",
            }))
        }
    };

    let last_release = match fields.remove("last_release") {
        Some(RawValue::Text(text)) => Some(text),
        Some(RawValue::Null) | None => None,
        Some(other) => {
            fields.insert("last_release".to_string(), other);
            None
        }
    };

    Ok(ModifierDescriptor {
        name,
        version,
        last_release,
        extra: fields,
    })
}
