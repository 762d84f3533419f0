//! Pipeline event port
//!
//! Services report progress and operator-relevant notices through this
//! port instead of printing; the CLI renders them, tests record them.

use std::fmt;
use std::path::PathBuf;

use crate::domain::{BuildStep, ManifestState, PublishedLayer};

/// Top-level pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Preflight,
    Manifest,
    Credentials,
    Build,
    Publish,
    Cleanup,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Preflight => "Checking preconditions",
            Self::Manifest => "Validating manifest",
            Self::Credentials => "Verifying cloud credentials",
            Self::Build => "Building layer",
            Self::Publish => "Publishing layer",
            Self::Cleanup => "Cleaning up",
        };
        f.write_str(text)
    }
}

/// Event emitted while the pipeline runs.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    StageStarted(Stage),

    InterpreterFound { interpreter: String, version: String },

    EditorInstalled { editor: String },

    ManifestCreated { path: PathBuf },

    /// Manifest failed validation; the editor is about to open
    ManifestInvalid { path: PathBuf, state: ManifestState },

    ManifestValid { path: PathBuf, requirements: usize },

    InvalidLayerName { input: String },

    /// Reference call failed; `attempt` is the repair round about to start
    ProbeFailed { attempt: u32 },

    ConfigureFailed { message: String },

    Authenticated,

    StepStarted(BuildStep),

    Pruned { step: BuildStep, removed: Vec<PathBuf> },

    ArchiveWritten { path: PathBuf, files: usize },

    Published(PublishedLayer),

    /// Publish succeeded but its response could not be read
    ResponseUnreadable { message: String },

    CleanedUp { removed: Vec<PathBuf> },

    /// Cleanup failed after an earlier fatal error (that error wins)
    CleanupFailed { message: String },
}

/// Trait for receiving pipeline events
pub trait PipelineEventSink: Send + Sync {
    fn on_event(&self, event: PipelineEvent);
}

/// No-op event sink for silent operation
#[derive(Debug, Default)]
pub struct NoopEventSink;

impl PipelineEventSink for NoopEventSink {
    fn on_event(&self, _event: PipelineEvent) {}
}
