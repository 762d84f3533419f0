//! Build context and build steps

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::{DomainError, LayerName};

/// Layout knobs that, together with a layer name, determine every path of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Requirements manifest (relative paths resolve against the work dir)
    pub manifest: PathBuf,
    /// Staging directory; its file name becomes the archive root
    pub staging_dir: PathBuf,
    /// Build environment directory is `<env_prefix><layer name>`
    pub env_prefix: String,
    /// Interpreter version, e.g. `3.12`
    pub python_version: String,
}

/// Immutable per-run context threaded through every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub layer_name: LayerName,
    pub work_dir: PathBuf,
    pub manifest: PathBuf,
    pub env_dir: PathBuf,
    pub staging_dir: PathBuf,
    pub archive: PathBuf,
    pub python_version: String,
}

impl BuildContext {
    pub fn new(layer_name: LayerName, work_dir: &Path, layout: &BuildLayout) -> Self {
        let env_dir = work_dir.join(format!("{}{}", layout.env_prefix, layer_name));
        let archive = work_dir.join(layer_name.archive_file_name());
        Self {
            manifest: work_dir.join(&layout.manifest),
            staging_dir: work_dir.join(&layout.staging_dir),
            env_dir,
            archive,
            work_dir: work_dir.to_path_buf(),
            python_version: layout.python_version.clone(),
            layer_name,
        }
    }

    /// Interpreter invoked by name, e.g. `python3.12`.
    pub fn interpreter(&self) -> String {
        interpreter_name(&self.python_version)
    }

    /// Lambda runtime identifier the layer is published for.
    pub fn runtime(&self) -> String {
        interpreter_name(&self.python_version)
    }

    /// pip inside the build environment.
    pub fn env_pip(&self) -> PathBuf {
        self.env_dir.join("bin").join("pip")
    }

    /// Installed-package directory of the build environment.
    pub fn site_packages(&self) -> PathBuf {
        self.env_dir
            .join("lib")
            .join(self.interpreter())
            .join("site-packages")
    }

    /// Every transient path the run may create.
    pub fn transient_paths(&self) -> [&Path; 3] {
        [&self.env_dir, &self.staging_dir, &self.archive]
    }

    /// Fail unless every transient path is a plain child of the work dir.
    ///
    /// Cleanup deletes these paths recursively; `..`, `.` or a nested
    /// prefix would point it at the work dir itself or beyond.
    pub fn ensure_contained(&self) -> Result<(), DomainError> {
        for path in self.transient_paths() {
            let plain_name = path
                .file_name()
                .is_some_and(|name| name != "." && name != "..");
            let direct_child = path.parent() == Some(self.work_dir.as_path());
            if !(plain_name && direct_child) {
                return Err(DomainError::OutsideWorkDir(path.to_path_buf()));
            }
        }
        Ok(())
    }
}

pub fn interpreter_name(python_version: &str) -> String {
    format!("python{python_version}")
}

/// Ordered sub-steps of a layer build. Each is a hard gate for the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStep {
    VerifyInterpreter,
    CreateEnvironment,
    UpgradePip,
    InstallRequirements,
    CopyPackages,
    PruneResidue,
    PruneBytecode,
    Compress,
}

impl BuildStep {
    pub const ALL: [BuildStep; 8] = [
        BuildStep::VerifyInterpreter,
        BuildStep::CreateEnvironment,
        BuildStep::UpgradePip,
        BuildStep::InstallRequirements,
        BuildStep::CopyPackages,
        BuildStep::PruneResidue,
        BuildStep::PruneBytecode,
        BuildStep::Compress,
    ];

    /// 1-based position, for progress output.
    pub fn position(&self) -> usize {
        Self::ALL.iter().position(|s| s == self).unwrap_or(0) + 1
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::VerifyInterpreter => "verify interpreter",
            Self::CreateEnvironment => "create build environment",
            Self::UpgradePip => "upgrade pip",
            Self::InstallRequirements => "install requirements",
            Self::CopyPackages => "copy packages to staging",
            Self::PruneResidue => "prune build residue",
            Self::PruneBytecode => "prune bytecode caches",
            Self::Compress => "compress archive",
        }
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
