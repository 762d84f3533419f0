//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::BuildStep;

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.remove_any(&path)
    ///     .with_path_context("remove", &path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Add plain context to an I/O error that has no path (console, prompts).
    fn with_context(self, action: &str) -> ApplicationResult<T>;

    /// Report an I/O error as the failure of a build step.
    fn in_build_step(self, step: BuildStep, operation: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action.to_string(),
            source: Box::new(e),
        })
    }

    fn in_build_step(self, step: BuildStep, operation: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::BuildStep {
            step,
            operation: operation.to_string(),
            message: e.to_string(),
        })
    }
}
