//! Publishes the archive as a new layer version

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::application::events::{PipelineEvent, PipelineEventSink};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{BuildContext, PublishedLayer};
use crate::infrastructure::traits::{CloudClient, FileSystem};
use crate::infrastructure::InfraError;

/// Uploads the archive for exactly one runtime. No retry.
pub struct PublishService {
    fs: Arc<dyn FileSystem>,
    cloud: Arc<dyn CloudClient>,
}

impl PublishService {
    pub fn new(fs: Arc<dyn FileSystem>, cloud: Arc<dyn CloudClient>) -> Self {
        Self { fs, cloud }
    }

    /// Publish `ctx.archive` as a new version of `ctx.layer_name`.
    ///
    /// An unreadable response does not fail the run: the call itself succeeded.
    #[instrument(skip(self, events), fields(layer = %ctx.layer_name))]
    pub fn publish(
        &self,
        ctx: &BuildContext,
        events: &dyn PipelineEventSink,
    ) -> ApplicationResult<PublishedLayer> {
        let runtime = ctx.runtime();
        let layer_name = ctx.layer_name.as_str();

        if !self.fs.exists(&ctx.archive) {
            return Err(ApplicationError::Publish {
                operation: format!("publish {}", ctx.archive.display()),
                message: "archive not found".to_string(),
            });
        }

        let response = self
            .cloud
            .publish_layer(layer_name, &ctx.archive, &runtime)
            .map_err(|e| {
                let operation = e.command().map(String::from).unwrap_or_else(|| {
                    format!("publish-layer-version --layer-name {layer_name}")
                });
                let message = match e {
                    InfraError::Command { message, .. } => message,
                    other => other.to_string(),
                };
                ApplicationError::Publish { operation, message }
            })?;

        let layer = match PublishedLayer::from_json(&response) {
            Ok(layer) => layer,
            Err(e) => {
                warn!("publish: unreadable response: {}", e);
                events.on_event(PipelineEvent::ResponseUnreadable {
                    message: e.to_string(),
                });
                PublishedLayer::default()
            }
        };
        info!(
            "publish: {} version {:?} for {}",
            layer_name, layer.version, runtime
        );
        events.on_event(PipelineEvent::Published(layer.clone()));
        Ok(layer)
    }
}
