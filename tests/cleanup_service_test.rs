//! Tests for CleanupService
//!
//! Cleanup must be safe whatever subset of the transient paths exists.

mod common;

use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use common::{context, test_settings};
use pylayer::application::services::{CleanupScope, CleanupService};
use pylayer::application::ApplicationError;
use pylayer::domain::{BuildContext, DomainError, LayerName};
use pylayer::infrastructure::traits::RealFileSystem;

fn service() -> CleanupService {
    CleanupService::new(Arc::new(RealFileSystem))
}

#[rstest]
#[case(true, true, true)]
#[case(true, false, false)]
#[case(false, true, false)]
#[case(false, false, true)]
#[case(false, false, false)]
fn given_some_paths_present_when_cleanup_twice_then_all_gone_without_error(
    #[case] env: bool,
    #[case] staging: bool,
    #[case] archive: bool,
) {
    let temp = TempDir::new().unwrap();
    let ctx = context("layer", temp.path());
    if env {
        std::fs::create_dir_all(ctx.env_dir.join("lib/python3.12/site-packages")).unwrap();
    }
    if staging {
        std::fs::create_dir_all(ctx.staging_dir.join("requests")).unwrap();
        std::fs::write(ctx.staging_dir.join("requests/__init__.py"), "").unwrap();
    }
    if archive {
        std::fs::write(&ctx.archive, "PK").unwrap();
    }

    let removed = service().run(&ctx, CleanupScope::All).unwrap();
    let again = service().run(&ctx, CleanupScope::All).unwrap();

    let expected = [env, staging, archive].iter().filter(|b| **b).count();
    assert_eq!(removed.len(), expected);
    assert!(again.is_empty());
    for path in ctx.transient_paths() {
        assert!(!path.exists(), "left behind: {}", path.display());
    }
}

#[test]
fn given_keep_archive_when_cleanup_then_archive_survives() {
    let temp = TempDir::new().unwrap();
    let ctx = context("layer", temp.path());
    std::fs::create_dir_all(&ctx.env_dir).unwrap();
    std::fs::create_dir_all(&ctx.staging_dir).unwrap();
    std::fs::write(&ctx.archive, "PK").unwrap();

    let removed = service().run(&ctx, CleanupScope::KeepArchive).unwrap();

    assert_eq!(removed, vec![ctx.env_dir.clone(), ctx.staging_dir.clone()]);
    assert!(ctx.archive.exists());
}

#[test]
fn given_other_files_in_work_dir_when_cleanup_then_untouched() {
    let temp = TempDir::new().unwrap();
    let ctx = context("layer", temp.path());
    let manifest = temp.path().join("requirements.txt");
    let other_archive = temp.path().join("other-layer.zip");
    std::fs::write(&manifest, "requests\n").unwrap();
    std::fs::write(&other_archive, "PK").unwrap();

    service().run(&ctx, CleanupScope::All).unwrap();

    assert!(manifest.exists());
    assert!(other_archive.exists());
}

#[rstest]
#[case("..")]
#[case(".")]
fn given_empty_env_prefix_and_dot_name_when_cleanup_then_refused_and_nothing_removed(
    #[case] name: &str,
) {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("project/work");
    std::fs::create_dir_all(&work_dir).unwrap();
    let precious = temp.path().join("project/precious.txt");
    std::fs::write(&precious, "keep me").unwrap();
    let mut layout = test_settings().layout();
    layout.env_prefix = String::new();
    let ctx = BuildContext::new(LayerName::parse(name).unwrap(), &work_dir, &layout);
    std::fs::create_dir_all(&ctx.staging_dir).unwrap();

    let result = service().run(&ctx, CleanupScope::All);

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::OutsideWorkDir(_)))
    ));
    assert!(precious.exists());
    assert!(work_dir.exists());
    assert!(ctx.staging_dir.exists(), "refusal removes nothing at all");
}

#[test]
fn given_nested_env_prefix_when_cleanup_then_refused() {
    let temp = TempDir::new().unwrap();
    let work_dir = temp.path().join("work");
    let sibling = temp.path().join("layer");
    std::fs::create_dir_all(&work_dir).unwrap();
    std::fs::create_dir_all(&sibling).unwrap();
    let mut layout = test_settings().layout();
    layout.env_prefix = "../".to_string();
    let ctx = BuildContext::new(LayerName::parse("layer").unwrap(), &work_dir, &layout);

    assert!(service().run(&ctx, CleanupScope::All).is_err());
    assert!(sibling.exists());
}
