//! Removal of transient build artifacts

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::{ApplicationResult, IoResultExt};
use crate::domain::BuildContext;
use crate::infrastructure::traits::FileSystem;

/// Which transient paths to remove.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupScope {
    /// Environment, staging directory and archive
    All,
    /// Environment and staging directory; the archive stays
    KeepArchive,
}

/// Idempotent cleanup: absent paths are skipped, never an error.
pub struct CleanupService {
    fs: Arc<dyn FileSystem>,
}

impl CleanupService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Remove the transient paths of `ctx`, returning those that existed.
    ///
    /// Nothing is removed unless every path is a direct child of the work dir.
    #[instrument(skip(self), fields(layer = %ctx.layer_name))]
    pub fn run(&self, ctx: &BuildContext, scope: CleanupScope) -> ApplicationResult<Vec<PathBuf>> {
        ctx.ensure_contained()?;

        // pip is invoked from the environment directly, nothing was activated
        debug!("run: deactivate {} (no-op)", ctx.env_dir.display());

        let mut removed = Vec::new();
        for path in ctx.transient_paths() {
            if scope == CleanupScope::KeepArchive && path == ctx.archive.as_path() {
                continue;
            }
            if !self.fs.exists(path) {
                continue;
            }
            self.fs
                .remove_any(path)
                .with_path_context("remove build artifact", path)?;
            removed.push(path.to_path_buf());
        }
        debug!("run: removed {:?}", removed);
        Ok(removed)
    }
}
