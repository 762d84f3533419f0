//! Common test utilities for pipeline and service tests.
//!
//! This module provides:
//! - Fakes of every infrastructure trait (`fakes`)
//! - Fixtures: settings, build contexts and an installed package tree
#![allow(dead_code)]

pub mod fakes;

use std::path::Path;
use std::sync::Arc;

use pylayer::config::Settings;
use pylayer::domain::{BuildContext, LayerName};
use pylayer::infrastructure::di::ServiceContainer;
use pylayer::infrastructure::archive::ZipArchiver;
use pylayer::infrastructure::traits::{
    CloudClient, CommandRunner, Editor, PackageManager, Prompter, RealFileSystem,
};

pub use fakes::*;

/// A site-packages tree as pip leaves it: runtime packages plus residue.
pub const INSTALLED_TREE: &[&str] = &[
    "requests/__init__.py",
    "requests/api.py",
    "requests/__pycache__/api.cpython-312.pyc",
    "requests-2.31.0.dist-info/METADATA",
    "requests-2.31.0.dist-info/RECORD",
    "urllib3/__init__.py",
    "urllib3/util/retry.py",
    "urllib3/util/__pycache__/retry.cpython-312.pyc",
    "pip/__init__.py",
    "pip-24.0.dist-info/METADATA",
    "setuptools/__init__.py",
    "_distutils_hack/__init__.py",
    "pkg_resources/__init__.py",
    "distutils-precedence.pth",
    "wheel/__init__.py",
];

/// Defaults, independent of any config on the machine running the tests.
pub fn test_settings() -> Settings {
    Settings::default()
}

pub fn context(name: &str, work_dir: &Path) -> BuildContext {
    BuildContext::new(
        LayerName::parse(name).unwrap(),
        work_dir,
        &test_settings().layout(),
    )
}

pub fn write_manifest(work_dir: &Path, content: &str) {
    std::fs::write(work_dir.join("requirements.txt"), content).unwrap();
}

/// Container over the real filesystem with every other adapter faked.
pub fn container(
    runner: Arc<dyn CommandRunner>,
    editor: Arc<dyn Editor>,
    prompter: Arc<dyn Prompter>,
    pkg: Arc<dyn PackageManager>,
    cloud: Arc<dyn CloudClient>,
) -> ServiceContainer {
    ServiceContainer::with_deps(
        Arc::new(RealFileSystem),
        runner,
        editor,
        prompter,
        pkg,
        cloud,
        Arc::new(ZipArchiver),
        test_settings(),
    )
}
