//! Ordered module resolution: builtin registry first, filesystem second.
//!
//! # Responsibility
//! - Provide the resolution seam between the loader pipeline and module
//!   sources.
//! - Keep tier ordering observable: builtin misses are silent, filesystem
//!   failures are terminal.

use crate::context::LoadContext;
use crate::modifier::errors::ResolveError;
use crate::modifier::manifest::classify_document;
use crate::modifier::transform::VersionTransform;
use crate::modifier::value::RawValue;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Successfully resolved module payload.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    pub value: RawValue,
    /// Human-readable origin used for logging.
    pub source: String,
}

/// Resolution capability: one tier of the ordered lookup strategy.
///
/// `Ok(None)` is a silent miss and later tiers keep searching; `Err` aborts
/// the load and propagates unchanged.
pub trait ModuleResolver: Send + Sync {
    fn try_load(
        &self,
        spec: &str,
        context: &LoadContext,
    ) -> Result<Option<LoadedModule>, ResolveError>;
}

/// Factory producing a fresh raw module value per resolution.
pub type ModifierFactory = Arc<dyn Fn() -> RawValue + Send + Sync>;

/// Registry of modifiers bundled with the loader.
///
/// This is the "own location" resolution tier: ids registered here resolve
/// before any filesystem lookup, and a miss is silent by contract.
#[derive(Default, Clone)]
pub struct BuiltinModifiers {
    factories: BTreeMap<String, ModifierFactory>,
}

impl BuiltinModifiers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the stock `identity` modifier.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry
            .factories
            .insert("identity".to_string(), Arc::new(identity_modifier));
        registry
    }

    /// Registers one modifier factory.
    pub fn register(
        &mut self,
        id: &str,
        factory: ModifierFactory,
    ) -> Result<(), BuiltinRegistryError> {
        let id = id.trim();
        if !is_valid_modifier_id(id) {
            return Err(BuiltinRegistryError::InvalidModifierId(id.to_string()));
        }
        if self.factories.contains_key(id) {
            return Err(BuiltinRegistryError::DuplicateModifierId(id.to_string()));
        }
        self.factories.insert(id.to_string(), factory);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Returns sorted registered ids.
    pub fn ids(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<ModifierFactory> {
        self.factories.get(id.trim()).cloned()
    }
}

impl fmt::Debug for BuiltinModifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinModifiers")
            .field("ids", &self.ids())
            .finish()
    }
}

impl ModuleResolver for BuiltinModifiers {
    fn try_load(
        &self,
        spec: &str,
        _context: &LoadContext,
    ) -> Result<Option<LoadedModule>, ResolveError> {
        Ok(self.get(spec).map(|factory| LoadedModule {
            value: factory(),
            source: format!("builtin:{}", spec.trim()),
        }))
    }
}

fn identity_modifier() -> RawValue {
    let mut fields = BTreeMap::new();
    fields.insert(
        "name".to_string(),
        RawValue::Text("identity".to_string()),
    );
    fields.insert(
        "version".to_string(),
        RawValue::Transform(VersionTransform::identity()),
    );
    RawValue::Table(fields)
}

fn is_valid_modifier_id(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    value
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_' || c == '-')
}

/// Registry registration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinRegistryError {
    InvalidModifierId(String),
    DuplicateModifierId(String),
}

impl Display for BuiltinRegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidModifierId(value) => write!(f, "modifier id is invalid: {value}"),
            Self::DuplicateModifierId(value) => {
                write!(f, "modifier id already registered: {value}")
            }
        }
    }
}

impl Error for BuiltinRegistryError {}

/// Filesystem tier resolving specs against the caller's working directory.
///
/// Probes the spec verbatim, then with a `.json` extension when the spec
/// carries none. Absolute specs skip the working directory entirely.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileResolver;

impl FileResolver {
    fn candidate_paths(spec: &str) -> Vec<PathBuf> {
        let raw = PathBuf::from(spec);
        if raw.extension().is_some() {
            vec![raw]
        } else {
            vec![raw, PathBuf::from(format!("{spec}.json"))]
        }
    }

    fn load_file(path: &Path) -> Result<LoadedModule, ResolveError> {
        let content = std::fs::read_to_string(path).map_err(|err| ResolveError::Io {
            path: path.to_path_buf(),
            source: err,
        })?;
        let document: serde_json::Value =
            serde_json::from_str(&content).map_err(|err| ResolveError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?;
        let value = classify_document(document).map_err(|err| ResolveError::Rule {
            path: path.to_path_buf(),
            source: err,
        })?;
        Ok(LoadedModule {
            value,
            source: path.display().to_string(),
        })
    }
}

impl ModuleResolver for FileResolver {
    fn try_load(
        &self,
        spec: &str,
        context: &LoadContext,
    ) -> Result<Option<LoadedModule>, ResolveError> {
        for candidate in Self::candidate_paths(spec) {
            let path = if candidate.is_absolute() {
                candidate
            } else {
                let Some(base) = context.working_directory.as_ref() else {
                    return Err(ResolveError::NoResolutionBase {
                        spec: spec.to_string(),
                    });
                };
                base.join(candidate)
            };
            if path.is_file() {
                return Self::load_file(&path).map(Some);
            }
        }
        Ok(None)
    }
}
