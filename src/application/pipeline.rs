//! Stage sequencing with guaranteed cleanup
//!
//! Checker → Validator → Credential Gate → Builder → Publisher → Cleanup.
//! Each stage is a hard gate for the next. Cleanup runs after every
//! outcome; when both a stage and cleanup fail, the stage error wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::events::{PipelineEvent, PipelineEventSink, Stage};
use crate::application::services::{
    CleanupScope, CleanupService, CredentialGate, LayerBuilder, ManifestService,
    PreflightService, PublishService,
};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{BuildContext, GateState, LayerName, PublishedLayer};
use crate::infrastructure::traits::Prompter;

/// Why the run stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclineReason {
    /// User stopped repairing credentials
    Credentials,
    /// User answered the final confirmation negatively
    Confirmation,
}

/// Successful (or gracefully declined) result of a pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    Published(PublishedLayer),
    Built { archive: PathBuf, files: usize },
    Checked,
    Cleaned { removed: Vec<PathBuf> },
    Declined(DeclineReason),
}

/// Options for [`Pipeline::publish`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Skip the final confirmation
    pub assume_yes: bool,
    /// Keep the archive after publishing
    pub keep_archive: bool,
}

/// Question asked before the layer is uploaded.
pub fn confirmation_question(ctx: &BuildContext) -> String {
    format!(
        "Publish {} as layer '{}' for {}?",
        ctx.archive.display(),
        ctx.layer_name,
        ctx.runtime()
    )
}

/// Ask for a layer name until a valid one is given.
pub fn prompt_layer_name(
    prompter: &dyn Prompter,
    events: &dyn PipelineEventSink,
) -> ApplicationResult<LayerName> {
    loop {
        let input = prompter.ask("Layer name:").with_context("read layer name")?;
        match LayerName::parse(&input) {
            Ok(name) => return Ok(name),
            Err(e) => {
                debug!("prompt_layer_name: {}", e);
                events.on_event(PipelineEvent::InvalidLayerName { input });
            }
        }
    }
}

/// The whole build-and-publish pipeline.
pub struct Pipeline {
    preflight: PreflightService,
    manifest: ManifestService,
    gate: CredentialGate,
    builder: LayerBuilder,
    publisher: PublishService,
    cleanup: CleanupService,
    prompter: Arc<dyn Prompter>,
}

impl Pipeline {
    pub fn new(
        preflight: PreflightService,
        manifest: ManifestService,
        gate: CredentialGate,
        builder: LayerBuilder,
        publisher: PublishService,
        cleanup: CleanupService,
        prompter: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            preflight,
            manifest,
            gate,
            builder,
            publisher,
            cleanup,
            prompter,
        }
    }

    /// Full run: check, validate, authenticate, build, confirm, publish, clean up.
    #[instrument(skip(self, events), fields(layer = %ctx.layer_name))]
    pub fn publish(
        &self,
        ctx: &BuildContext,
        options: PublishOptions,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        let result = self.run_publish(ctx, options, events);
        let scope = cleanup_scope(options.keep_archive, &result);
        self.finish(ctx, scope, result, events)
    }

    /// Check, validate and build; the archive is kept.
    #[instrument(skip(self, events), fields(layer = %ctx.layer_name))]
    pub fn build(
        &self,
        ctx: &BuildContext,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        let result = self.run_build(ctx, events);
        let scope = cleanup_scope(true, &result);
        self.finish(ctx, scope, result, events)
    }

    /// Preconditions, manifest and credentials only. Nothing is built or removed.
    #[instrument(skip(self, events))]
    pub fn check(
        &self,
        manifest: &Path,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        events.on_event(PipelineEvent::StageStarted(Stage::Preflight));
        self.preflight.run(events)?;

        events.on_event(PipelineEvent::StageStarted(Stage::Manifest));
        self.manifest.ensure_valid(manifest, events)?;

        events.on_event(PipelineEvent::StageStarted(Stage::Credentials));
        if self.gate.run(events)? == GateState::Aborted {
            return Ok(PipelineOutcome::Declined(DeclineReason::Credentials));
        }
        Ok(PipelineOutcome::Checked)
    }

    /// Cleanup only.
    pub fn clean(
        &self,
        ctx: &BuildContext,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        events.on_event(PipelineEvent::StageStarted(Stage::Cleanup));
        let removed = self.cleanup.run(ctx, CleanupScope::All)?;
        events.on_event(PipelineEvent::CleanedUp {
            removed: removed.clone(),
        });
        Ok(PipelineOutcome::Cleaned { removed })
    }

    fn run_publish(
        &self,
        ctx: &BuildContext,
        options: PublishOptions,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        if let PipelineOutcome::Declined(reason) = self.check(&ctx.manifest, events)? {
            info!("publish: declined at {:?}", reason);
            return Ok(PipelineOutcome::Declined(reason));
        }

        events.on_event(PipelineEvent::StageStarted(Stage::Build));
        self.builder.build(ctx, events)?;

        if !options.assume_yes {
            let question = confirmation_question(ctx);
            let confirmed = self
                .prompter
                .confirm(&question)
                .with_context("read confirmation")?;
            if !confirmed {
                info!("publish: not confirmed");
                return Ok(PipelineOutcome::Declined(DeclineReason::Confirmation));
            }
        }

        events.on_event(PipelineEvent::StageStarted(Stage::Publish));
        let layer = self.publisher.publish(ctx, events)?;
        Ok(PipelineOutcome::Published(layer))
    }

    fn run_build(
        &self,
        ctx: &BuildContext,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        events.on_event(PipelineEvent::StageStarted(Stage::Preflight));
        self.preflight.run(events)?;

        events.on_event(PipelineEvent::StageStarted(Stage::Manifest));
        self.manifest.ensure_valid(&ctx.manifest, events)?;

        events.on_event(PipelineEvent::StageStarted(Stage::Build));
        let report = self.builder.build(ctx, events)?;
        Ok(PipelineOutcome::Built {
            archive: report.archive,
            files: report.files,
        })
    }

    /// Run cleanup after `result`, whatever it is.
    fn finish(
        &self,
        ctx: &BuildContext,
        scope: CleanupScope,
        result: ApplicationResult<PipelineOutcome>,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PipelineOutcome> {
        events.on_event(PipelineEvent::StageStarted(Stage::Cleanup));
        match (result, self.cleanup.run(ctx, scope)) {
            (Ok(outcome), Ok(removed)) => {
                events.on_event(PipelineEvent::CleanedUp { removed });
                Ok(outcome)
            }
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(removed)) => {
                events.on_event(PipelineEvent::CleanedUp { removed });
                Err(e)
            }
            (Err(e), Err(cleanup_err)) => {
                warn!("finish: cleanup failed after error: {}", cleanup_err);
                events.on_event(PipelineEvent::CleanupFailed {
                    message: cleanup_err.to_string(),
                });
                Err(e)
            }
        }
    }
}

/// A failed build may leave a partial archive behind, which is never kept.
fn cleanup_scope(keep_archive: bool, result: &ApplicationResult<PipelineOutcome>) -> CleanupScope {
    let build_failed = matches!(result, Err(ApplicationError::BuildStep { .. }));
    if keep_archive && !build_failed {
        CleanupScope::KeepArchive
    } else {
        CleanupScope::All
    }
}
