//! Domain-level errors (no external dependencies)

use std::path::PathBuf;
use thiserror::Error;

/// Domain errors represent business rule violations.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid layer name '{0}': only letters, digits, '-' and '.' are allowed")]
    InvalidLayerName(String),

    #[error("invalid prune pattern '{0}': '*' is only allowed at the start or end")]
    InvalidPattern(String),

    #[error("refusing to touch {}: not a direct child of the work dir", .0.display())]
    OutsideWorkDir(PathBuf),
}
