//! Infrastructure-level errors (raised by the I/O adapters)

use thiserror::Error;

/// Errors from external tools, archives and raw I/O.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {message}")]
    Command {
        command: String,
        message: String,
        exit_code: Option<i32>,
    },

    #[error("editor command failed: {message}")]
    Editor { message: String },

    #[error("archive error: {context}")]
    Archive {
        context: String,
        #[source]
        source: zip::result::ZipError,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Command line of the failing external call, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            Self::Command { command, .. } => Some(command),
            _ => None,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;
