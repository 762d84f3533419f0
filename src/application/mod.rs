//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod error;
pub mod error_ext;
pub mod events;
pub mod pipeline;
pub mod services;

pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use events::{NoopEventSink, PipelineEvent, PipelineEventSink, Stage};
pub use pipeline::{
    confirmation_question, prompt_layer_name, DeclineReason, Pipeline, PipelineOutcome,
    PublishOptions,
};
