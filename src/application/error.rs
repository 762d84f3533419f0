//! Application-level errors (wraps domain and infrastructure errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{BuildStep, DomainError, ManifestState};
use crate::infrastructure::InfraError;

/// Application errors carry the pipeline's failure taxonomy.
///
/// Every fatal variant names the failing operation so it can be re-run by hand.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("required tool missing: {tool} (`{operation}`): {message}")]
    MissingTool {
        tool: String,
        operation: String,
        message: String,
    },

    #[error("manifest {} is {state}; add at least one requirement", .path.display())]
    InvalidManifest { path: PathBuf, state: ManifestState },

    #[error("build step {} ({step}) failed: `{operation}`: {message}", .step.position())]
    BuildStep {
        step: BuildStep,
        operation: String,
        message: String,
    },

    #[error("publish failed: `{operation}`: {message}")]
    Publish { operation: String, message: String },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    /// Wrap an adapter error as the failure of a build step.
    ///
    /// `fallback` names the operation when the adapter error carries no command line.
    pub fn build_step(step: BuildStep, fallback: impl Into<String>, err: InfraError) -> Self {
        let operation = err
            .command()
            .map(String::from)
            .unwrap_or_else(|| fallback.into());
        let message = match &err {
            InfraError::Command { message, .. } => message.clone(),
            other => other.to_string(),
        };
        Self::BuildStep {
            step,
            operation,
            message,
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
