//! Loader error taxonomy.
//!
//! # Responsibility
//! - Enumerate user-input validation failures with stable machine codes.
//! - Keep module resolution failures as a distinct pass-through class.
//!
//! # Invariants
//! - `ModifierErrors` is never empty.
//! - Validation fails on the first violated rule; defects are not
//!   accumulated across one load.

use crate::modifier::transform::TransformRuleError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub type LoadResult<T> = Result<T, LoaderError>;

/// One user-input validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModifierError {
    /// `modifier` option present and truthy but not a string.
    InvalidPathType { actual: &'static str },
    /// Resolved module is neither a table nor a transform.
    InvalidShape { actual: &'static str },
    /// Descriptor lacks a non-empty textual `name`.
    MissingName { actual: &'static str },
    /// Descriptor lacks a callable required field.
    MissingRequiredField {
        field: &'static str,
        actual: &'static str,
    },
}

impl ModifierError {
    /// Stable machine-readable code surfaced to end users.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPathType { .. } => "EMODIFIERPATH",
            Self::InvalidShape { .. } => "EMODIFIERTYPE",
            Self::MissingName { .. } => "EMODIFIERNONAME",
            Self::MissingRequiredField { .. } => "EMODIFIERNOREQUIRED",
        }
    }
}

impl Display for ModifierError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPathType { actual } => {
                write!(f, "modifier option must be a string, got {actual}")
            }
            Self::InvalidShape { actual } => {
                write!(
                    f,
                    "modifier module must export a table or a transform, got {actual}"
                )
            }
            Self::MissingName { actual } => {
                write!(f, "modifier name must be a non-empty string, got {actual}")
            }
            Self::MissingRequiredField { field, actual } => {
                write!(f, "modifier `{field}` must be a transform, got {actual}")
            }
        }
    }
}

impl Error for ModifierError {}

/// Ordered, non-empty collection of validation failures.
///
/// The pipeline fails on the first violation, so a load currently carries
/// exactly one entry; the list stays in the public contract so callers can
/// keep iterating over every reported failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifierErrors {
    errors: Vec<ModifierError>,
}

impl ModifierErrors {
    pub fn of(error: ModifierError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    pub fn errors(&self) -> &[ModifierError] {
        &self.errors
    }

    /// First reported failure. Always present.
    pub fn first(&self) -> &ModifierError {
        &self.errors[0]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ModifierError> {
        self.errors.iter()
    }
}

impl<'a> IntoIterator for &'a ModifierErrors {
    type Item = &'a ModifierError;
    type IntoIter = std::slice::Iter<'a, ModifierError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

impl Display for ModifierErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut sep = "";
        for error in &self.errors {
            write!(f, "{sep}{error}")?;
            sep = "; ";
        }
        Ok(())
    }
}

impl Error for ModifierErrors {}

/// Module resolution/evaluation failure, passed through verbatim.
#[derive(Debug)]
pub enum ResolveError {
    /// No tier could locate the module.
    NotFound { spec: String },
    /// Relative spec with no working directory to resolve against.
    NoResolutionBase { spec: String },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// Module parsed but its transform rules did not compile.
    Rule {
        path: PathBuf,
        source: TransformRuleError,
    },
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { spec } => write!(f, "modifier module not found: {spec}"),
            Self::NoResolutionBase { spec } => write!(
                f,
                "cannot resolve relative modifier path without a working directory: {spec}"
            ),
            Self::Io { path, source } => {
                write!(f, "failed to read modifier module {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse modifier module {}: {source}", path.display())
            }
            Self::Rule { path, source } => write!(
                f,
                "failed to evaluate modifier module {}: {source}",
                path.display()
            ),
        }
    }
}

impl Error for ResolveError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Rule { source, .. } => Some(source),
            Self::NotFound { .. } | Self::NoResolutionBase { .. } => None,
        }
    }
}

/// Top-level loader failure.
#[derive(Debug)]
pub enum LoaderError {
    /// Enumerated user-input failures, aggregated.
    Invalid(ModifierErrors),
    /// Underlying module-system failure.
    Resolve(ResolveError),
}

impl Display for LoaderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Resolve(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoaderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => errors
                .errors()
                .first()
                .map(|err| err as &(dyn Error + 'static)),
            Self::Resolve(err) => Some(err),
        }
    }
}

impl From<ModifierError> for LoaderError {
    fn from(value: ModifierError) -> Self {
        Self::Invalid(ModifierErrors::of(value))
    }
}

impl From<ModifierErrors> for LoaderError {
    fn from(value: ModifierErrors) -> Self {
        Self::Invalid(value)
    }
}

impl From<ResolveError> for LoaderError {
    fn from(value: ResolveError) -> Self {
        Self::Resolve(value)
    }
}
