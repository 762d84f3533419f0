//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use colored::Colorize;
use tracing::debug;

use crate::domain::parse_yes_no;
use crate::infrastructure::{InfraError, InfraResult};

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Check if path is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Create directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Remove a directory and all its contents.
    fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Copy directory contents recursively from source into destination.
    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove file or directory (auto-detect).
    fn remove_any(&self, path: &Path) -> io::Result<()>;

    /// All entries below `root`, relative to it (root itself excluded).
    fn list_tree(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Exit status and captured output of an external command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Successful run with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed run with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code: Some(exit_code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Best diagnostic text: stderr, falling back to stdout.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Render a command line for diagnostics, e.g. `pip install -r requirements.txt`.
pub fn command_line(cmd: &str, args: &[&str]) -> String {
    std::iter::once(cmd)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a command and turn a spawn failure or non-zero exit into [`InfraError::Command`].
pub fn run_checked(
    runner: &dyn CommandRunner,
    cmd: &str,
    args: &[&str],
) -> InfraResult<CommandOutput> {
    let command = command_line(cmd, args);
    debug!("run: {}", command);
    let output = runner.run(cmd, args).map_err(|e| InfraError::Command {
        command: command.clone(),
        message: e.to_string(),
        exit_code: None,
    })?;
    if output.success {
        Ok(output)
    } else {
        Err(InfraError::Command {
            message: output.diagnostic(),
            exit_code: output.exit_code,
            command,
        })
    }
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a command with arguments, capturing stdout and stderr.
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput>;

    /// Run a command attached to the terminal (stdin/stdout/stderr inherited).
    /// Captured output in the result is always empty.
    fn run_interactive(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Editor abstraction for opening files.
pub trait Editor: Send + Sync {
    /// Open a file in the editor.
    /// Blocks until editor exits.
    fn open(&self, path: &Path) -> io::Result<()>;
}

/// Interactive console questions.
pub trait Prompter: Send + Sync {
    /// Ask a free-text question, return the answer without its line ending.
    fn ask(&self, question: &str) -> io::Result<String>;

    /// Ask a yes/no question until a clear answer is given.
    fn confirm(&self, question: &str) -> io::Result<bool> {
        let question = format!("{question} [y/n]");
        loop {
            if let Some(answer) = parse_yes_no(&self.ask(&question)?) {
                return Ok(answer);
            }
        }
    }
}

/// Python environment and package operations.
pub trait PackageManager: Send + Sync {
    /// Version string reported by the interpreter invoked by name.
    fn interpreter_version(&self, interpreter: &str) -> InfraResult<String>;

    /// Create an isolated environment at `env_dir`.
    fn create_env(&self, interpreter: &str, env_dir: &Path) -> InfraResult<()>;

    /// Upgrade pip inside the environment.
    fn upgrade_pip(&self, pip: &Path) -> InfraResult<()>;

    /// Install every entry of `manifest` into the environment.
    fn install(&self, pip: &Path, manifest: &Path) -> InfraResult<()>;
}

/// Cloud CLI operations needed to publish a layer.
pub trait CloudClient: Send + Sync {
    /// Reference read-only call used as credential probe.
    fn probe(&self) -> InfraResult<CommandOutput>;

    /// Interactive credential configuration.
    fn configure(&self) -> InfraResult<()>;

    /// Publish `archive` as a new version of `layer_name`; returns the raw response.
    fn publish_layer(&self, layer_name: &str, archive: &Path, runtime: &str)
        -> InfraResult<String>;
}

/// Packs a directory tree into a single archive file.
pub trait Archiver: Send + Sync {
    /// Archive `source_dir` into `archive`, returning the number of files written.
    fn create(&self, source_dir: &Path, archive: &Path) -> InfraResult<usize>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_dir_all(path)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        use walkdir::WalkDir;

        std::fs::create_dir_all(to)?;
        for entry in WalkDir::new(from).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let rel_path = entry
                .path()
                .strip_prefix(from)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            let target = to.join(rel_path);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                std::fs::copy(entry.path(), &target)?;
            }
        }
        Ok(())
    }

    fn remove_any(&self, path: &Path) -> io::Result<()> {
        if path.is_dir() {
            self.remove_dir_all(path)
        } else {
            self.remove_file(path)
        }
    }

    fn list_tree(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        use walkdir::WalkDir;

        let mut entries = Vec::new();
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            let rel_path = entry
                .path()
                .strip_prefix(root)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            entries.push(rel_path.to_path_buf());
        }
        Ok(entries)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        std::process::Command::new(cmd)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map(CommandOutput::from)
    }

    fn run_interactive(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        let status = std::process::Command::new(cmd).args(args).status()?;
        Ok(CommandOutput {
            success: status.success(),
            exit_code: status.code(),
            ..Default::default()
        })
    }
}

/// Real editor implementation running the configured editor command.
///
/// The command may carry arguments, e.g. `code --wait`.
#[derive(Debug, Clone)]
pub struct ConfiguredEditor {
    command: String,
}

impl ConfiguredEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Editor for ConfiguredEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        use std::process::Command;

        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "editor command is empty")
        })?;

        let status = Command::new(program).args(parts).arg(path).status()?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!(
                "editor exited with status: {}",
                status
            )))
        }
    }
}

/// Real prompter reading answers from stdin.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl Prompter for ConsolePrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        use std::io::{BufRead, Write};

        eprint!("{} ", question.cyan());
        io::stderr().flush()?;

        let mut answer = String::new();
        let read = io::stdin().lock().read_line(&mut answer)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed while waiting for an answer",
            ));
        }
        Ok(answer.trim_end_matches(['\r', '\n']).to_string())
    }
}
