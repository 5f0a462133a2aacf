//! Caller-supplied load context and progress reporting seam.
//!
//! # Responsibility
//! - Carry the per-invocation inputs: working directory, options, reporter.
//! - Define the success-reporting capability with a `log`-backed default.

use crate::options::LoaderOptions;
use log::info;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Success-reporting capability owned by the caller.
pub trait ProgressReporter: Send + Sync {
    /// Reports one human-readable success message.
    fn success(&self, message: &str);
}

/// Default reporter emitting structured log events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ProgressReporter for LogReporter {
    fn success(&self, message: &str) {
        info!("event=modifier_success module=loader status=ok message={message}");
    }
}

/// Per-invocation input record for modifier loading.
///
/// The loader never mutates the context; repeated loads with the same
/// context re-resolve and re-validate independently.
#[derive(Clone)]
pub struct LoadContext {
    /// Resolution base for relative modifier paths.
    pub working_directory: Option<PathBuf>,
    pub options: LoaderOptions,
    pub reporter: Arc<dyn ProgressReporter>,
}

impl LoadContext {
    pub fn new(options: LoaderOptions) -> Self {
        Self {
            working_directory: None,
            options,
            reporter: Arc::new(LogReporter),
        }
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }
}

impl fmt::Debug for LoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadContext")
            .field("working_directory", &self.working_directory)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
