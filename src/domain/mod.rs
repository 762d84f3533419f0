//! Domain layer: entities and business rules
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod build;
pub mod credentials;
pub mod entities;
pub mod error;
pub mod layer_name;
pub mod manifest;
pub mod prune;

pub use build::{interpreter_name, BuildContext, BuildLayout, BuildStep};
pub use credentials::{is_authenticated, GateEvent, GateState};
pub use entities::*;
pub use error::DomainError;
pub use layer_name::{LayerName, LAYER_NAME_PATTERN};
pub use manifest::{requirement_lines, ManifestState};
pub use prune::{NamePattern, PruneRules};
