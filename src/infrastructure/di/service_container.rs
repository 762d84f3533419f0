//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{
    CleanupService, CredentialGate, LayerBuilder, ManifestService, PreflightService,
    PublishService,
};
use crate::application::Pipeline;
use crate::config::Settings;
use crate::infrastructure::archive::ZipArchiver;
use crate::infrastructure::aws::AwsCli;
use crate::infrastructure::python::VenvPackageManager;
use crate::infrastructure::traits::{
    Archiver, CloudClient, CommandRunner, ConfiguredEditor, ConsolePrompter, Editor, FileSystem,
    PackageManager, Prompter, RealCommandRunner, RealFileSystem,
};

/// Container holding the I/O adapters every service is built from.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    pub editor: Arc<dyn Editor>,
    pub prompter: Arc<dyn Prompter>,
    pub pkg: Arc<dyn PackageManager>,
    pub cloud: Arc<dyn CloudClient>,
    pub archiver: Arc<dyn Archiver>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        Self::with_deps(
            Arc::new(RealFileSystem),
            cmd.clone(),
            Arc::new(ConfiguredEditor::new(settings.editor.clone())),
            Arc::new(ConsolePrompter),
            Arc::new(VenvPackageManager::new(cmd.clone())),
            Arc::new(AwsCli::new(cmd, settings.aws.clone())),
            Arc::new(ZipArchiver),
            settings,
        )
    }

    /// Create a service container with custom dependencies (for testing).
    #[allow(clippy::too_many_arguments)]
    pub fn with_deps(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        editor: Arc<dyn Editor>,
        prompter: Arc<dyn Prompter>,
        pkg: Arc<dyn PackageManager>,
        cloud: Arc<dyn CloudClient>,
        archiver: Arc<dyn Archiver>,
        settings: Settings,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            cmd,
            editor,
            prompter,
            pkg,
            cloud,
            archiver,
        }
    }

    /// Assemble the pipeline from the container's adapters.
    pub fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            PreflightService::new(self.pkg.clone(), self.cmd.clone(), self.settings.clone()),
            ManifestService::new(self.fs.clone(), self.editor.clone()),
            CredentialGate::new(self.cloud.clone(), self.prompter.clone()),
            LayerBuilder::new(
                self.fs.clone(),
                self.pkg.clone(),
                self.archiver.clone(),
                self.settings.clone(),
            ),
            PublishService::new(self.fs.clone(), self.cloud.clone()),
            CleanupService::new(self.fs.clone()),
            self.prompter.clone(),
        )
    }
}
