//! Layer build: environment, install, stage, prune, compress
//!
//! Every step is a hard gate. The first failure is reported with the
//! failing operation and the remaining steps are skipped.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::events::{PipelineEvent, PipelineEventSink};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{BuildContext, BuildStep, PruneRules};
use crate::infrastructure::traits::{Archiver, FileSystem, PackageManager};

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub archive: PathBuf,
    /// Files written into the archive
    pub files: usize,
    /// Staging entries removed by both prune steps, relative to the staging dir
    pub pruned: Vec<PathBuf>,
}

/// Builds the layer archive for one [`BuildContext`].
pub struct LayerBuilder {
    fs: Arc<dyn FileSystem>,
    pkg: Arc<dyn PackageManager>,
    archiver: Arc<dyn Archiver>,
    settings: Arc<Settings>,
}

impl LayerBuilder {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        pkg: Arc<dyn PackageManager>,
        archiver: Arc<dyn Archiver>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            pkg,
            archiver,
            settings,
        }
    }

    /// Run all build steps in order.
    #[instrument(skip(self, events), fields(layer = %ctx.layer_name))]
    pub fn build(
        &self,
        ctx: &BuildContext,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<BuildReport> {
        let residue = self.settings.prune.residue_rules()?;
        let bytecode = self.settings.prune.bytecode_rules()?;
        ctx.ensure_contained()?;
        self.remove_stale(ctx)?;

        let interpreter = ctx.interpreter();
        let pip = ctx.env_pip();

        events.on_event(PipelineEvent::StepStarted(BuildStep::VerifyInterpreter));
        let version = self
            .pkg
            .interpreter_version(&interpreter)
            .map_err(|e| {
                ApplicationError::build_step(
                    BuildStep::VerifyInterpreter,
                    format!("{interpreter} --version"),
                    e,
                )
            })?;
        debug!("build: using {}", version);

        events.on_event(PipelineEvent::StepStarted(BuildStep::CreateEnvironment));
        self.pkg
            .create_env(&interpreter, &ctx.env_dir)
            .map_err(|e| {
                ApplicationError::build_step(
                    BuildStep::CreateEnvironment,
                    format!("{interpreter} -m venv {}", ctx.env_dir.display()),
                    e,
                )
            })?;

        events.on_event(PipelineEvent::StepStarted(BuildStep::UpgradePip));
        self.pkg.upgrade_pip(&pip).map_err(|e| {
            ApplicationError::build_step(
                BuildStep::UpgradePip,
                format!("{} install --upgrade pip", pip.display()),
                e,
            )
        })?;

        events.on_event(PipelineEvent::StepStarted(BuildStep::InstallRequirements));
        self.pkg.install(&pip, &ctx.manifest).map_err(|e| {
            ApplicationError::build_step(
                BuildStep::InstallRequirements,
                format!("{} install -r {}", pip.display(), ctx.manifest.display()),
                e,
            )
        })?;

        events.on_event(PipelineEvent::StepStarted(BuildStep::CopyPackages));
        self.copy_packages(ctx)?;

        let mut pruned = Vec::new();
        for (step, rules) in [
            (BuildStep::PruneResidue, &residue),
            (BuildStep::PruneBytecode, &bytecode),
        ] {
            events.on_event(PipelineEvent::StepStarted(step));
            let removed = self.prune(&ctx.staging_dir, step, rules)?;
            events.on_event(PipelineEvent::Pruned {
                step,
                removed: removed.clone(),
            });
            pruned.extend(removed);
        }

        events.on_event(PipelineEvent::StepStarted(BuildStep::Compress));
        let files = self
            .archiver
            .create(&ctx.staging_dir, &ctx.archive)
            .map_err(|e| {
                ApplicationError::build_step(
                    BuildStep::Compress,
                    format!(
                        "zip {} -> {}",
                        ctx.staging_dir.display(),
                        ctx.archive.display()
                    ),
                    e,
                )
            })?;
        events.on_event(PipelineEvent::ArchiveWritten {
            path: ctx.archive.clone(),
            files,
        });
        info!("build: {} ({} files)", ctx.archive.display(), files);

        Ok(BuildReport {
            archive: ctx.archive.clone(),
            files,
            pruned,
        })
    }

    /// Leftovers of an earlier run would leak into the new archive.
    fn remove_stale(&self, ctx: &BuildContext) -> ApplicationResult<()> {
        for path in [&ctx.staging_dir, &ctx.archive] {
            if self.fs.exists(path) {
                debug!("remove_stale: {}", path.display());
                self.fs
                    .remove_any(path)
                    .with_path_context("remove stale build output", path)?;
            }
        }
        Ok(())
    }

    fn copy_packages(&self, ctx: &BuildContext) -> ApplicationResult<()> {
        let site_packages = ctx.site_packages();
        let operation = format!(
            "copy {} -> {}",
            site_packages.display(),
            ctx.staging_dir.display()
        );

        if !self.fs.is_dir(&site_packages) {
            return Err(ApplicationError::BuildStep {
                step: BuildStep::CopyPackages,
                operation,
                message: "installed-package directory not found".to_string(),
            });
        }

        self.fs
            .create_dir_all(&ctx.staging_dir)
            .in_build_step(BuildStep::CopyPackages, &operation)?;
        self.fs
            .copy_dir(&site_packages, &ctx.staging_dir)
            .in_build_step(BuildStep::CopyPackages, &operation)
    }

    /// Remove every topmost staging entry matching `rules`.
    fn prune(
        &self,
        staging_dir: &Path,
        step: BuildStep,
        rules: &PruneRules,
    ) -> ApplicationResult<Vec<PathBuf>> {
        let snapshot = self
            .fs
            .list_tree(staging_dir)
            .in_build_step(step, &format!("list {}", staging_dir.display()))?;
        let removals = rules.plan_removals(&snapshot);

        for rel_path in &removals {
            let target = staging_dir.join(rel_path);
            debug!("prune: {}", target.display());
            self.fs
                .remove_any(&target)
                .in_build_step(step, &format!("remove {}", target.display()))?;
        }
        Ok(removals)
    }
}
