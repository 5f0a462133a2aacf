//! Core modifier-loading logic for relmod.
//! This crate is the single source of truth for modifier contracts.

pub mod context;
pub mod logging;
pub mod modifier;
pub mod options;

pub use context::{LoadContext, LogReporter, ProgressReporter};
pub use logging::{default_log_level, init_logging, logging_status};
pub use modifier::errors::{
    LoadResult, LoaderError, ModifierError, ModifierErrors, ResolveError,
};
pub use modifier::loader::{load_modifier, ModifierLoader, DEFAULT_MODIFIER_NAME};
pub use modifier::resolver::{
    BuiltinModifiers, BuiltinRegistryError, FileResolver, LoadedModule, ModifierFactory,
    ModuleResolver,
};
pub use modifier::transform::{
    ModifierEnv, TransformRuleError, TransformSpec, VersionTransform,
};
pub use modifier::value::{raw_type_name, ModifierDescriptor, RawValue};
pub use options::{is_truthy, json_type_name, LoaderOptions, MODIFIER_OPTION};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
