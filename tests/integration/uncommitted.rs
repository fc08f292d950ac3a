use crate::common::TestProject;
use gvend_cli::constants::UNCOMMITTED_CHECKSUM;
use gvend_cli::context::{ModifyKind, ModifyOptions};
use gvend_cli::core::VendorError;
use gvend_cli::manifest::Manifest;
use gvend_cli::pkgspec::PkgSpec;
use gvend_cli::test_utils::TestGit;
use gvend_cli::vcs::VcsChain;
use std::fs;

/// co2/pk1 committed to git, then edited without committing.
fn dirty_project() -> (TestProject, String) {
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    project.library("co2/pk1", &[]).unwrap();
    let git = TestGit::new(project.ws.dir("co2/pk1"));
    git.init().unwrap();
    let head = git.commit_all("initial").unwrap();
    project
        .ws
        .write_go("co2/pk1", "pk1.go", "package pk1\n\n// local edit\n")
        .unwrap();
    (project, head)
}

#[test]
fn test_dirty_working_tree_blocks_copy() {
    if !TestGit::available() {
        return;
    }
    let (project, _) = dirty_project();
    let mut ctx = project.context().unwrap();
    ctx.vcs = VcsChain::default();

    let err = ctx
        .modify(&PkgSpec::parse("co2/pk1", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::DirtyWorkingTree { path }) if path == "co2/pk1"
    ));
    assert!(ctx.operations.is_empty());
    assert!(!project.vendor().join("co2").exists());
}

#[test]
fn test_uncommitted_copy_records_sentinel_checksum() {
    if !TestGit::available() {
        return;
    }
    let (project, head) = dirty_project();
    let mut ctx = project.context().unwrap();
    ctx.vcs = VcsChain::default();

    let opts = ModifyOptions {
        tree: false,
        uncommitted: true,
    };
    ctx.modify(&PkgSpec::parse("co2/pk1", None).unwrap(), ModifyKind::Add, opts)
        .unwrap();
    ctx.alter().unwrap();

    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("// local edit"));

    let saved = Manifest::load(&project.vendor().join("vendor.json")).unwrap();
    let record = saved.find("co2/pk1").unwrap();
    assert_eq!(record.checksum, UNCOMMITTED_CHECKSUM);
    assert_eq!(record.revision, head);
    assert_eq!(ctx.verify().unwrap(), vec!["co2/pk1".to_string()]);
}
