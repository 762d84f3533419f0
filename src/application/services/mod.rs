//! Application services
//!
//! Concrete service implementations, one per pipeline stage.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner, etc.)
//! but are themselves concrete structs, not traits.

mod builder;
mod cleanup;
mod credentials;
mod manifest;
mod preflight;
mod publisher;

pub use builder::{BuildReport, LayerBuilder};
pub use cleanup::{CleanupScope, CleanupService};
pub use credentials::{CredentialGate, CONTINUE_QUESTION};
pub use manifest::{ManifestReport, ManifestService};
pub use preflight::{EditorStatus, PreflightReport, PreflightService};
pub use publisher::PublishService;
