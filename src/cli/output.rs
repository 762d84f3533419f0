//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::application::{PipelineEvent, PipelineEventSink};
use crate::domain::{BuildStep, LAYER_NAME_PATTERN};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print success status indented (green checkmark with leading spaces)
pub fn success_detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✓".green(), msg);
}

/// Print failure status (red X, indented)
pub fn failure(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {} {}", "✗".red(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Renders pipeline events on the terminal.
#[derive(Debug, Default)]
pub struct ConsoleEventSink;

impl PipelineEventSink for ConsoleEventSink {
    fn on_event(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::StageStarted(stage) => header(&stage),
            PipelineEvent::InterpreterFound {
                interpreter,
                version,
            } => success_detail(&format!("{interpreter}: {version}")),
            PipelineEvent::EditorInstalled { editor } => action("Installed", &editor),
            PipelineEvent::ManifestCreated { path } => {
                warning(&format!("created empty manifest {}", path.display()))
            }
            PipelineEvent::ManifestInvalid { path, state } => failure(&format!(
                "{} is {}; opening editor (one attempt)",
                path.display(),
                state
            )),
            PipelineEvent::ManifestValid { path, requirements } => success_detail(&format!(
                "{}: {} requirement(s)",
                path.display(),
                requirements
            )),
            PipelineEvent::InvalidLayerName { input } => failure(&format!(
                "invalid layer name '{input}', must match {LAYER_NAME_PATTERN}"
            )),
            PipelineEvent::ProbeFailed { attempt } => failure(&format!(
                "credentials invalid, running configuration (attempt {attempt})"
            )),
            PipelineEvent::ConfigureFailed { message } => warning(&message),
            PipelineEvent::Authenticated => success_detail("credentials valid"),
            PipelineEvent::StepStarted(step) => detail(&format!(
                "[{}/{}] {}",
                step.position(),
                BuildStep::ALL.len(),
                step
            )),
            PipelineEvent::Pruned { step, removed } => {
                detail(&format!("{}: {} entries removed", step, removed.len()))
            }
            PipelineEvent::ArchiveWritten { path, files } => {
                success_detail(&format!("{} ({} files)", path.display(), files))
            }
            PipelineEvent::Published(layer) => {
                let arn = layer
                    .layer_version_arn
                    .as_deref()
                    .unwrap_or("(version ARN not reported)");
                success(&format!("published {arn}"));
                if let Some(version) = layer.version {
                    detail(&format!("version {version}"));
                }
            }
            PipelineEvent::ResponseUnreadable { message } => {
                warning(&format!("publish response unreadable: {message}"))
            }
            PipelineEvent::CleanedUp { removed } => {
                for path in &removed {
                    detail(&format!("removed {}", path.display()));
                }
            }
            PipelineEvent::CleanupFailed { message } => {
                warning(&format!("cleanup failed: {message}"))
            }
        }
    }
}
