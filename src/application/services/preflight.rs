//! Precondition checks: interpreter and editor tool
//!
//! A missing interpreter is fatal with no recovery. A missing editor is
//! installed once with the configured install command; only a failed
//! install is fatal.

use std::io;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::events::{PipelineEvent, PipelineEventSink};
use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::infrastructure::traits::{command_line, CommandRunner, PackageManager};

/// What the editor check found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorStatus {
    Present,
    Installed,
}

/// Outcome of a successful precondition check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub interpreter_version: String,
    pub editor: EditorStatus,
}

/// Verifies the interpreter and the editor tool.
pub struct PreflightService {
    pkg: Arc<dyn PackageManager>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
}

impl PreflightService {
    pub fn new(
        pkg: Arc<dyn PackageManager>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
    ) -> Self {
        Self { pkg, cmd, settings }
    }

    /// Run both checks, interpreter first.
    #[instrument(skip_all)]
    pub fn run(&self, events: &dyn PipelineEventSink) -> ApplicationResult<PreflightReport> {
        let interpreter = self.settings.interpreter();
        let interpreter_version = self.check_interpreter()?;
        events.on_event(PipelineEvent::InterpreterFound {
            interpreter,
            version: interpreter_version.clone(),
        });

        let editor = self.ensure_editor()?;
        if editor == EditorStatus::Installed {
            events.on_event(PipelineEvent::EditorInstalled {
                editor: self.editor_program().to_string(),
            });
        }

        Ok(PreflightReport {
            interpreter_version,
            editor,
        })
    }

    /// Verify the configured interpreter is invocable by name.
    pub fn check_interpreter(&self) -> ApplicationResult<String> {
        let interpreter = self.settings.interpreter();
        debug!("check_interpreter: {}", interpreter);
        self.pkg
            .interpreter_version(&interpreter)
            .map_err(|e| ApplicationError::MissingTool {
                operation: e
                    .command()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{interpreter} --version")),
                message: e.to_string(),
                tool: interpreter,
            })
    }

    /// Make sure the editor is installed, installing it if absent.
    pub fn ensure_editor(&self) -> ApplicationResult<EditorStatus> {
        let editor = self.editor_program();
        if self.editor_present(editor)? {
            debug!("ensure_editor: {} present", editor);
            return Ok(EditorStatus::Present);
        }

        let missing = |message: String| ApplicationError::MissingTool {
            tool: editor.to_string(),
            operation: self.install_command_line(),
            message,
        };

        let (program, args) = self
            .settings
            .editor_install
            .split_first()
            .ok_or_else(|| missing("no install command configured".to_string()))?;
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        info!("ensure_editor: installing {}", editor);
        let output = self
            .cmd
            .run_interactive(program, &args)
            .map_err(|e| missing(e.to_string()))?;
        if !output.success {
            return Err(missing(format!(
                "install exited with {}",
                output
                    .exit_code
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "a signal".to_string())
            )));
        }

        if self.editor_present(editor)? {
            Ok(EditorStatus::Installed)
        } else {
            Err(missing("still not found after install".to_string()))
        }
    }

    /// Program part of the editor command (`code --wait` → `code`).
    fn editor_program(&self) -> &str {
        self.settings
            .editor
            .split_whitespace()
            .next()
            .unwrap_or_default()
    }

    /// An editor is present when it can be spawned at all; its exit code is irrelevant.
    fn editor_present(&self, editor: &str) -> ApplicationResult<bool> {
        if editor.is_empty() {
            return Err(ApplicationError::Config {
                message: "editor must not be empty".to_string(),
            });
        }
        match self.cmd.run(editor, &["--version"]) {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ApplicationError::MissingTool {
                tool: editor.to_string(),
                operation: command_line(editor, &["--version"]),
                message: e.to_string(),
            }),
        }
    }

    fn install_command_line(&self) -> String {
        self.settings.editor_install.join(" ")
    }
}
