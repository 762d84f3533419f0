//! Hand-written fakes of the infrastructure traits.
//!
//! Every fake records its calls behind a `Mutex` so tests can assert on
//! what the services did, and answers from a script set up by the test.

use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use pylayer::application::{PipelineEvent, PipelineEventSink};
use pylayer::infrastructure::traits::{
    Archiver, CloudClient, CommandOutput, CommandRunner, Editor, FileSystem, PackageManager,
    Prompter, RealFileSystem,
};
use pylayer::infrastructure::{InfraError, InfraResult};

// ============================================================
// Events
// ============================================================

#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingEvents {
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn contains(&self, event: &PipelineEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }
}

impl PipelineEventSink for RecordingEvents {
    fn on_event(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

// ============================================================
// Prompter
// ============================================================

/// Answers questions from a script; an exhausted script behaves like a closed stdin.
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn new(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(|a| a.to_string()).collect()),
            questions: Mutex::default(),
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.answers.lock().unwrap().len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&self, question: &str) -> io::Result<String> {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "script exhausted"))
    }
}

// ============================================================
// Editor
// ============================================================

/// Simulates the user editing the file: writes `content` (if any) on open.
#[derive(Default)]
pub struct FakeEditor {
    content: Option<String>,
    fail: bool,
    opened: Mutex<Vec<PathBuf>>,
}

impl FakeEditor {
    /// User saves `content`.
    pub fn writing(content: &str) -> Self {
        Self {
            content: Some(content.to_string()),
            ..Default::default()
        }
    }

    /// User closes the editor without changes.
    pub fn unchanged() -> Self {
        Self::default()
    }

    /// Editor cannot be started.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn opened(&self) -> Vec<PathBuf> {
        self.opened.lock().unwrap().clone()
    }
}

impl Editor for FakeEditor {
    fn open(&self, path: &Path) -> io::Result<()> {
        self.opened.lock().unwrap().push(path.to_path_buf());
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotFound, "nano: not found"));
        }
        if let Some(content) = &self.content {
            std::fs::write(path, content)?;
        }
        Ok(())
    }
}

// ============================================================
// Package manager
// ============================================================

/// Creates real directories so the builder's copy and prune steps run on disk.
pub struct FakePackageManager {
    /// Files (relative to site-packages) "installed" by `install`
    installed: Vec<&'static str>,
    site_packages: &'static str,
    interpreter_missing: bool,
    fail_create_env: bool,
    fail_upgrade: bool,
    fail_install: bool,
    creates_site_packages: bool,
    calls: Mutex<Vec<String>>,
}

impl FakePackageManager {
    pub fn installing(installed: &[&'static str]) -> Self {
        Self {
            installed: installed.to_vec(),
            site_packages: "lib/python3.12/site-packages",
            interpreter_missing: false,
            fail_create_env: false,
            fail_upgrade: false,
            fail_install: false,
            creates_site_packages: true,
            calls: Mutex::default(),
        }
    }

    pub fn without_interpreter() -> Self {
        Self {
            interpreter_missing: true,
            ..Self::installing(&[])
        }
    }

    pub fn failing_create_env() -> Self {
        Self {
            fail_create_env: true,
            ..Self::installing(&[])
        }
    }

    pub fn failing_upgrade() -> Self {
        Self {
            fail_upgrade: true,
            ..Self::installing(&[])
        }
    }

    pub fn failing_install() -> Self {
        Self {
            fail_install: true,
            ..Self::installing(&[])
        }
    }

    /// Install "succeeds" but leaves no site-packages directory behind.
    pub fn installing_nowhere() -> Self {
        Self {
            creates_site_packages: false,
            ..Self::installing(&[])
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl PackageManager for FakePackageManager {
    fn interpreter_version(&self, interpreter: &str) -> InfraResult<String> {
        self.record(format!("version {interpreter}"));
        if self.interpreter_missing {
            return Err(InfraError::Command {
                command: format!("{interpreter} --version"),
                message: "No such file or directory (os error 2)".into(),
                exit_code: None,
            });
        }
        Ok("Python 3.12.4".into())
    }

    fn create_env(&self, interpreter: &str, env_dir: &Path) -> InfraResult<()> {
        self.record(format!("venv {interpreter} {}", env_dir.display()));
        if self.fail_create_env {
            return Err(InfraError::Command {
                command: format!("{interpreter} -m venv {}", env_dir.display()),
                message: "Error: ensurepip is not available".into(),
                exit_code: Some(1),
            });
        }
        std::fs::create_dir_all(env_dir.join("bin"))
            .map_err(|e| InfraError::io("create env", e))
    }

    fn upgrade_pip(&self, pip: &Path) -> InfraResult<()> {
        self.record(format!("upgrade {}", pip.display()));
        if self.fail_upgrade {
            return Err(InfraError::Command {
                command: format!("{} install --upgrade --quiet pip", pip.display()),
                message: "Could not fetch URL https://pypi.org/simple/pip/".into(),
                exit_code: Some(1),
            });
        }
        Ok(())
    }

    fn install(&self, pip: &Path, manifest: &Path) -> InfraResult<()> {
        self.record(format!("install {} {}", pip.display(), manifest.display()));
        if self.fail_install {
            return Err(InfraError::Command {
                command: format!("{} install -r {}", pip.display(), manifest.display()),
                message: "ERROR: No matching distribution found for requestz==9.9".into(),
                exit_code: Some(1),
            });
        }
        if !self.creates_site_packages {
            return Ok(());
        }

        let env_dir = pip
            .parent()
            .and_then(Path::parent)
            .expect("pip lives in <env>/bin");
        let site_packages = env_dir.join(self.site_packages);
        std::fs::create_dir_all(&site_packages).map_err(|e| InfraError::io("install", e))?;
        for rel in &self.installed {
            let file = site_packages.join(rel);
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).map_err(|e| InfraError::io("install", e))?;
            }
            std::fs::write(&file, format!("# {rel}\n")).map_err(|e| InfraError::io("install", e))?;
        }
        Ok(())
    }
}

// ============================================================
// Filesystem and archiver
// ============================================================

/// Real filesystem whose tree listing fails, so pruning cannot snapshot staging.
#[derive(Default)]
pub struct UnlistableFileSystem {
    inner: RealFileSystem,
}

impl FileSystem for UnlistableFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        self.inner.write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner.exists(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner.is_dir(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.create_dir_all(path)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_file(path)
    }

    fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_dir_all(path)
    }

    fn copy_dir(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.inner.copy_dir(from, to)
    }

    fn remove_any(&self, path: &Path) -> io::Result<()> {
        self.inner.remove_any(path)
    }

    fn list_tree(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("{}: permission denied", root.display()),
        ))
    }
}

/// Archiver that records its calls and always fails.
#[derive(Default)]
pub struct FailingArchiver {
    calls: Mutex<Vec<(PathBuf, PathBuf)>>,
}

impl FailingArchiver {
    pub fn calls(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Archiver for FailingArchiver {
    fn create(&self, source_dir: &Path, archive: &Path) -> InfraResult<usize> {
        self.calls
            .lock()
            .unwrap()
            .push((source_dir.to_path_buf(), archive.to_path_buf()));
        Err(InfraError::io(
            format!("create {}", archive.display()),
            io::Error::other("No space left on device"),
        ))
    }
}

// ============================================================
// Cloud client
// ============================================================

/// Probe results are consumed in order; the last one repeats.
pub struct FakeCloud {
    probes: Mutex<VecDeque<CommandOutput>>,
    configure_fails: bool,
    publish_response: Result<String, String>,
    probe_calls: Mutex<usize>,
    configure_calls: Mutex<usize>,
    published: Mutex<Vec<(String, PathBuf, String)>>,
}

pub const PUBLISH_RESPONSE: &str = r#"{
    "LayerArn": "arn:aws:lambda:eu-central-1:123456789012:layer:my-layer_v2",
    "LayerVersionArn": "arn:aws:lambda:eu-central-1:123456789012:layer:my-layer_v2:7",
    "Version": 7,
    "CompatibleRuntimes": ["python3.12"]
}"#;

impl FakeCloud {
    pub fn authenticated() -> Self {
        Self::with_probes(vec![CommandOutput::ok("{\"Layers\": []}")])
    }

    /// Every probe fails.
    pub fn unauthenticated() -> Self {
        Self::with_probes(vec![CommandOutput::failed(255, "Unable to locate credentials")])
    }

    pub fn with_probes(probes: Vec<CommandOutput>) -> Self {
        Self {
            probes: Mutex::new(probes.into()),
            configure_fails: false,
            publish_response: Ok(PUBLISH_RESPONSE.to_string()),
            probe_calls: Mutex::default(),
            configure_calls: Mutex::default(),
            published: Mutex::default(),
        }
    }

    pub fn with_configure_failing(mut self) -> Self {
        self.configure_fails = true;
        self
    }

    pub fn with_publish_response(mut self, response: Result<&str, &str>) -> Self {
        self.publish_response = response.map(String::from).map_err(String::from);
        self
    }

    pub fn probe_calls(&self) -> usize {
        *self.probe_calls.lock().unwrap()
    }

    pub fn configure_calls(&self) -> usize {
        *self.configure_calls.lock().unwrap()
    }

    pub fn published(&self) -> Vec<(String, PathBuf, String)> {
        self.published.lock().unwrap().clone()
    }
}

impl CloudClient for FakeCloud {
    fn probe(&self) -> InfraResult<CommandOutput> {
        *self.probe_calls.lock().unwrap() += 1;
        let mut probes = self.probes.lock().unwrap();
        let result = if probes.len() > 1 {
            probes.pop_front()
        } else {
            probes.front().cloned()
        };
        Ok(result.unwrap_or_default())
    }

    fn configure(&self) -> InfraResult<()> {
        *self.configure_calls.lock().unwrap() += 1;
        if self.configure_fails {
            return Err(InfraError::Command {
                command: "aws configure".into(),
                message: "interactive configuration did not complete".into(),
                exit_code: Some(130),
            });
        }
        Ok(())
    }

    fn publish_layer(&self, layer_name: &str, archive: &Path, runtime: &str) -> InfraResult<String> {
        self.published.lock().unwrap().push((
            layer_name.to_string(),
            archive.to_path_buf(),
            runtime.to_string(),
        ));
        self.publish_response
            .clone()
            .map_err(|message| InfraError::Command {
                command: format!("aws lambda publish-layer-version --layer-name {layer_name}"),
                message,
                exit_code: Some(254),
            })
    }
}

// ============================================================
// Command runner
// ============================================================

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub cmd: String,
    pub args: Vec<String>,
    pub interactive: bool,
}

impl Invocation {
    pub fn line(&self) -> String {
        std::iter::once(self.cmd.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Records invocations. Programs in `missing` fail to spawn with `NotFound`
/// until an interactive command "installs" them.
#[derive(Default)]
pub struct RecordingRunner {
    missing: Mutex<Vec<String>>,
    install_fixes: bool,
    output: CommandOutput,
    interactive_success: bool,
    invocations: Mutex<Vec<Invocation>>,
}

impl RecordingRunner {
    /// Every command succeeds with `stdout`.
    pub fn answering(stdout: &str) -> Self {
        Self {
            output: CommandOutput::ok(stdout),
            interactive_success: true,
            ..Default::default()
        }
    }

    /// Every command exits non-zero with `stderr`.
    pub fn failing(exit_code: i32, stderr: &str) -> Self {
        Self {
            output: CommandOutput::failed(exit_code, stderr),
            interactive_success: false,
            ..Default::default()
        }
    }

    /// `program` is absent; `install_fixes` decides whether an interactive run installs it.
    pub fn missing(program: &str, install_fixes: bool, install_succeeds: bool) -> Self {
        Self {
            missing: Mutex::new(vec![program.to_string()]),
            install_fixes,
            output: CommandOutput::ok(""),
            interactive_success: install_succeeds,
            ..Default::default()
        }
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    fn record(&self, cmd: &str, args: &[&str], interactive: bool) {
        self.invocations.lock().unwrap().push(Invocation {
            cmd: cmd.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            interactive,
        });
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        self.record(cmd, args, false);
        if self.missing.lock().unwrap().iter().any(|m| m == cmd) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("{cmd}: not found")));
        }
        Ok(self.output.clone())
    }

    fn run_interactive(&self, cmd: &str, args: &[&str]) -> io::Result<CommandOutput> {
        self.record(cmd, args, true);
        if self.interactive_success && self.install_fixes {
            self.missing.lock().unwrap().clear();
        }
        Ok(CommandOutput {
            success: self.interactive_success,
            exit_code: Some(if self.interactive_success { 0 } else { 100 }),
            ..Default::default()
        })
    }
}
