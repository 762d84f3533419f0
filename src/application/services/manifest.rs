//! Requirements manifest validation
//!
//! An invalid manifest gets exactly one correction round: it is opened in
//! the editor and checked again. A second failure is fatal.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::events::{PipelineEvent, PipelineEventSink};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{requirement_lines, ManifestState};
use crate::infrastructure::traits::{Editor, FileSystem};
use crate::infrastructure::InfraError;

/// Outcome of a successful validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestReport {
    /// Number of substantive requirement lines
    pub requirements: usize,
    /// Whether the editor had to be opened
    pub edited: bool,
}

/// Classifies manifests and drives the single re-edit round.
pub struct ManifestService {
    fs: Arc<dyn FileSystem>,
    editor: Arc<dyn Editor>,
}

impl ManifestService {
    pub fn new(fs: Arc<dyn FileSystem>, editor: Arc<dyn Editor>) -> Self {
        Self { fs, editor }
    }

    /// Classify the manifest. An absent manifest is created empty.
    ///
    /// Empty and comment-only manifests are never modified.
    pub fn inspect(&self, path: &Path) -> ApplicationResult<ManifestState> {
        if !self.fs.exists(path) {
            debug!("inspect: creating empty manifest {}", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                self.fs
                    .create_dir_all(parent)
                    .with_path_context("create manifest directory", parent)?;
            }
            self.fs
                .write(path, "")
                .with_path_context("create manifest", path)?;
            return Ok(ManifestState::Absent);
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read manifest", path)?;
        let state = ManifestState::classify(Some(&content));
        debug!("inspect: {} is {}", path.display(), state);
        Ok(state)
    }

    /// Validate, giving the user one chance to fix the manifest in the editor.
    #[instrument(skip(self, events))]
    pub fn ensure_valid(
        &self,
        path: &Path,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<ManifestReport> {
        let mut edited = false;
        let mut state = self.inspect(path)?;

        if state == ManifestState::Absent {
            events.on_event(PipelineEvent::ManifestCreated {
                path: path.to_path_buf(),
            });
        }

        if !state.is_valid() {
            events.on_event(PipelineEvent::ManifestInvalid {
                path: path.to_path_buf(),
                state,
            });
            self.editor
                .open(path)
                .map_err(|e| InfraError::Editor {
                    message: format!("{}: {}", path.display(), e),
                })?;
            edited = true;
            state = self.inspect(path)?;
        }

        if !state.is_valid() {
            return Err(ApplicationError::InvalidManifest {
                path: path.to_path_buf(),
                state,
            });
        }

        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read manifest", path)?;
        let requirements = requirement_lines(&content).len();
        events.on_event(PipelineEvent::ManifestValid {
            path: path.to_path_buf(),
            requirements,
        });

        Ok(ManifestReport {
            requirements,
            edited,
        })
    }
}
