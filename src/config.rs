//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/pylayer/pylayer.toml`
//! 3. Local config: `<work_dir>/pylayer.toml`
//! 4. Environment variables: `PYLAYER_*` prefix (`__` separates sections)

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, interpreter_name, BuildLayout, DomainError, PruneRules};

/// Accepted `python_version` values: major.minor only.
const PYTHON_VERSION_PATTERN: &str = r"^\d+\.\d+$";

/// File name of the local config, looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "pylayer.toml";

/// Name patterns removed from the staging tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PruneConfig {
    /// Package manager and build tooling residue, metadata directories
    pub residue: Vec<String>,
    /// Bytecode caches
    pub bytecode: Vec<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            residue: vec![
                "pip".into(),
                "setuptools".into(),
                "wheel".into(),
                "_distutils_hack".into(),
                "pkg_resources".into(),
                "distutils-precedence.pth".into(),
                "*dist-info".into(),
            ],
            bytecode: vec!["__pycache__".into()],
        }
    }
}

/// Raw prune config (arrays are Option to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawPruneConfig {
    pub residue: Option<Vec<String>>,
    pub bytecode: Option<Vec<String>>,
}

impl PruneConfig {
    /// Merge arrays with union semantics and negation support.
    ///
    /// - Items from overlay are added to base
    /// - Items prefixed with `!` remove the corresponding item from the result
    /// - Duplicates are de-duplicated
    ///
    /// # Examples
    /// ```ignore
    /// merge_array(&["a", "b"], &["c"])       // → ["a", "b", "c"]
    /// merge_array(&["a", "b"], &["!a", "c"]) // → ["b", "c"]
    /// ```
    pub fn merge_array(base: &[String], overlay: &[String]) -> Vec<String> {
        let mut result: HashSet<String> = base.iter().cloned().collect();

        for pattern in overlay {
            if let Some(negated) = pattern.strip_prefix('!') {
                result.remove(negated);
            } else {
                result.insert(pattern.clone());
            }
        }

        let mut vec: Vec<String> = result.into_iter().collect();
        vec.sort();
        vec
    }

    /// Merge overlay onto self with union semantics.
    pub fn merge(&self, overlay: &RawPruneConfig) -> Self {
        Self {
            residue: overlay
                .residue
                .as_ref()
                .map(|o| Self::merge_array(&self.residue, o))
                .unwrap_or_else(|| self.residue.clone()),
            bytecode: overlay
                .bytecode
                .as_ref()
                .map(|o| Self::merge_array(&self.bytecode, o))
                .unwrap_or_else(|| self.bytecode.clone()),
        }
    }

    /// Apply global config onto defaults: arrays REPLACE.
    pub fn apply_global(&self, global: &RawPruneConfig) -> Self {
        Self {
            residue: global
                .residue
                .clone()
                .unwrap_or_else(|| self.residue.clone()),
            bytecode: global
                .bytecode
                .clone()
                .unwrap_or_else(|| self.bytecode.clone()),
        }
    }

    pub fn residue_rules(&self) -> Result<PruneRules, DomainError> {
        PruneRules::parse(&self.residue)
    }

    pub fn bytecode_rules(&self) -> Result<PruneRules, DomainError> {
        PruneRules::parse(&self.bytecode)
    }
}

/// AWS CLI invocation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AwsConfig {
    /// CLI binary
    pub cli: String,
    /// Named profile, forwarded as `--profile`
    pub profile: Option<String>,
    /// Region, forwarded as `--region`
    pub region: Option<String>,
    /// Reference read-only call used to probe credentials
    pub probe: Vec<String>,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            cli: "aws".into(),
            profile: None,
            region: None,
            probe: vec![
                "lambda".into(),
                "list-layers".into(),
                "--max-items".into(),
                "1".into(),
            ],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawAwsConfig {
    pub cli: Option<String>,
    pub profile: Option<String>,
    pub region: Option<String>,
    pub probe: Option<Vec<String>>,
}

impl AwsConfig {
    fn merge_with(&self, overlay: &RawAwsConfig) -> Self {
        Self {
            cli: overlay.cli.clone().unwrap_or_else(|| self.cli.clone()),
            profile: overlay.profile.clone().or_else(|| self.profile.clone()),
            region: overlay.region.clone().or_else(|| self.region.clone()),
            probe: overlay.probe.clone().unwrap_or_else(|| self.probe.clone()),
        }
    }
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub python_version: Option<String>,
    pub manifest: Option<PathBuf>,
    pub staging_dir: Option<PathBuf>,
    pub env_prefix: Option<String>,
    pub editor: Option<String>,
    pub editor_install: Option<Vec<String>>,
    pub prune: RawPruneConfig,
    pub aws: RawAwsConfig,
}

/// Unified configuration for pylayer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Interpreter version; also selects the runtime (`python<version>`)
    pub python_version: String,
    /// Requirements manifest
    pub manifest: PathBuf,
    /// Staging directory; its name is the archive root
    pub staging_dir: PathBuf,
    /// Prefix of the build environment directory (suffixed by the layer name)
    pub env_prefix: String,
    /// Editor used to fix the manifest
    pub editor: String,
    /// Command installing the editor when it is missing
    pub editor_install: Vec<String>,
    pub prune: PruneConfig,
    pub aws: AwsConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            python_version: "3.12".into(),
            manifest: PathBuf::from("requirements.txt"),
            staging_dir: PathBuf::from("python"),
            env_prefix: ".venv-".into(),
            editor: "nano".into(),
            editor_install: vec![
                "sudo".into(),
                "apt-get".into(),
                "install".into(),
                "-y".into(),
                "nano".into(),
            ],
            prune: PruneConfig::default(),
            aws: AwsConfig::default(),
        }
    }
}

/// Get the XDG config directory for pylayer.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "pylayer").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("pylayer.toml"))
}

/// Get the path to the local config file in a working directory.
pub fn local_config_path(work_dir: &Path) -> PathBuf {
    work_dir.join(LOCAL_CONFIG_FILE)
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

impl Settings {
    /// Interpreter invoked by name, e.g. `python3.12`.
    pub fn interpreter(&self) -> String {
        interpreter_name(&self.python_version)
    }

    /// Path layout for a build.
    pub fn layout(&self) -> BuildLayout {
        BuildLayout {
            manifest: self.manifest.clone(),
            staging_dir: self.staging_dir.clone(),
            env_prefix: self.env_prefix.clone(),
            python_version: self.python_version.clone(),
        }
    }

    /// Expand shell variables and tilde in path-like fields.
    fn expand_paths(&mut self) {
        self.manifest = PathBuf::from(expand_env_vars(&self.manifest.to_string_lossy()));
        self.staging_dir = PathBuf::from(expand_env_vars(&self.staging_dir.to_string_lossy()));
        self.editor = expand_env_vars(&self.editor);
    }

    /// Merge local config onto self: scalars replace, prune arrays union.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            python_version: overlay
                .python_version
                .clone()
                .unwrap_or_else(|| self.python_version.clone()),
            manifest: overlay
                .manifest
                .clone()
                .unwrap_or_else(|| self.manifest.clone()),
            staging_dir: overlay
                .staging_dir
                .clone()
                .unwrap_or_else(|| self.staging_dir.clone()),
            env_prefix: overlay
                .env_prefix
                .clone()
                .unwrap_or_else(|| self.env_prefix.clone()),
            editor: overlay
                .editor
                .clone()
                .unwrap_or_else(|| self.editor.clone()),
            editor_install: overlay
                .editor_install
                .clone()
                .unwrap_or_else(|| self.editor_install.clone()),
            prune: self.prune.merge(&overlay.prune),
            aws: self.aws.merge_with(&overlay.aws),
        }
    }

    /// Apply global config onto defaults: every specified value REPLACES.
    fn apply_global(&self, global: &RawSettings) -> Self {
        let mut merged = self.merge_with(global);
        merged.prune = self.prune.apply_global(&global.prune);
        merged
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `work_dir` - Optional working directory holding a local `pylayer.toml`
    ///
    /// # Array Merge Semantics (prune patterns)
    /// - Defaults → Global: REPLACE
    /// - Global → Local: UNION with `!pattern` negation
    /// - Any → Env vars: REPLACE (comma separated)
    pub fn load(work_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.apply_global(&raw);
            }
        }

        if let Some(dir) = work_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply PYLAYER_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("PYLAYER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("python_version") {
            settings.python_version = val;
        }
        if let Ok(val) = config.get_string("manifest") {
            settings.manifest = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("staging_dir") {
            settings.staging_dir = PathBuf::from(val);
        }
        if let Ok(val) = config.get_string("env_prefix") {
            settings.env_prefix = val;
        }
        if let Ok(val) = config.get_string("editor") {
            settings.editor = val;
        }
        if let Ok(val) = config.get_string("editor_install") {
            settings.editor_install = split_list(&val);
        }
        if let Ok(val) = config.get_string("prune.residue") {
            settings.prune.residue = split_list(&val);
        }
        if let Ok(val) = config.get_string("prune.bytecode") {
            settings.prune.bytecode = split_list(&val);
        }
        if let Ok(val) = config.get_string("aws.cli") {
            settings.aws.cli = val;
        }
        if let Ok(val) = config.get_string("aws.profile") {
            settings.aws.profile = Some(val);
        }
        if let Ok(val) = config.get_string("aws.region") {
            settings.aws.region = Some(val);
        }
        if let Ok(val) = config.get_string("aws.probe") {
            settings.aws.probe = split_list(&val);
        }

        Ok(settings)
    }

    /// Reject settings no build could run with.
    pub fn validate(&self) -> Result<(), ApplicationError> {
        let invalid = |message: String| Err(ApplicationError::Config { message });

        let version_re = Regex::new(PYTHON_VERSION_PATTERN).map_err(|e| ApplicationError::Config {
            message: format!("python_version pattern: {e}"),
        })?;
        if !version_re.is_match(&self.python_version) {
            return invalid(format!(
                "python_version must be <major>.<minor>, e.g. 3.12: '{}'",
                self.python_version
            ));
        }
        if self.env_prefix.is_empty() || self.env_prefix.contains(['/', '\\']) {
            return invalid(format!(
                "env_prefix must be non-empty and free of path separators: '{}'",
                self.env_prefix
            ));
        }
        if self.staging_dir.file_name().is_none() {
            return invalid(format!(
                "staging_dir needs a final path component: {}",
                self.staging_dir.display()
            ));
        }
        if self.aws.probe.is_empty() {
            return invalid("aws.probe must name a CLI call".into());
        }
        self.prune.residue_rules()?;
        self.prune.bytecode_rules()?;
        Ok(())
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# pylayer configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/pylayer/pylayer.toml   (defines your baseline)
#   Local:  ./pylayer.toml                   (project-specific additions)
#   Env:    PYLAYER_* environment variables  (explicit overrides, e.g. PYLAYER_AWS__PROFILE)
#
# Prune pattern merge:
#   Global config REPLACES compiled defaults.
#   Local config UNIONS with global; "!pattern" removes an inherited pattern:
#     residue = ["*.egg-info", "!wheel"]

# Interpreter version; the layer is published for runtime python<version>
# python_version = "3.12"

# Requirements manifest
# manifest = "requirements.txt"

# Staging directory (its name is the archive root, "python" for Lambda)
# staging_dir = "python"

# Build environment directory is <env_prefix><layer name>
# env_prefix = ".venv-"

# Editor used to fix an invalid manifest, and how to install it if missing
# editor = "nano"
# editor_install = ["sudo", "apt-get", "install", "-y", "nano"]

[prune]
# Build residue and metadata removed before archiving
# residue = ["pip", "setuptools", "wheel", "_distutils_hack", "pkg_resources", "distutils-precedence.pth", "*dist-info"]
# bytecode = ["__pycache__"]

[aws]
# cli = "aws"
# profile = "default"
# region = "eu-central-1"
# Reference read-only call used to verify credentials
# probe = ["lambda", "list-layers", "--max-items", "1"]
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
