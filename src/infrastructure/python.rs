//! Python toolchain adapter: `python -m venv` and the environment's own pip

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::infrastructure::traits::{run_checked, CommandRunner, PackageManager};
use crate::infrastructure::InfraResult;

/// Package manager backed by the stdlib `venv` module and pip.
///
/// The environment is never activated; its `bin/pip` is called directly.
pub struct VenvPackageManager {
    cmd: Arc<dyn CommandRunner>,
}

impl VenvPackageManager {
    pub fn new(cmd: Arc<dyn CommandRunner>) -> Self {
        Self { cmd }
    }
}

impl PackageManager for VenvPackageManager {
    fn interpreter_version(&self, interpreter: &str) -> InfraResult<String> {
        let output = run_checked(self.cmd.as_ref(), interpreter, &["--version"])?;
        // python < 3.4 printed the version on stderr
        let version = if output.stdout.trim().is_empty() {
            output.stderr.trim().to_string()
        } else {
            output.stdout.trim().to_string()
        };
        debug!("interpreter_version: {} -> {}", interpreter, version);
        Ok(version)
    }

    fn create_env(&self, interpreter: &str, env_dir: &Path) -> InfraResult<()> {
        let env_dir = env_dir.to_string_lossy();
        run_checked(self.cmd.as_ref(), interpreter, &["-m", "venv", &env_dir])?;
        Ok(())
    }

    fn upgrade_pip(&self, pip: &Path) -> InfraResult<()> {
        let pip = pip.to_string_lossy();
        run_checked(
            self.cmd.as_ref(),
            &pip,
            &["install", "--upgrade", "--quiet", "pip"],
        )?;
        Ok(())
    }

    fn install(&self, pip: &Path, manifest: &Path) -> InfraResult<()> {
        let pip = pip.to_string_lossy();
        let manifest = manifest.to_string_lossy();
        run_checked(self.cmd.as_ref(), &pip, &["install", "-r", &manifest])?;
        Ok(())
    }
}
