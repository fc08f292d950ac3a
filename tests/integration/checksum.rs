use crate::common::TestProject;
use gvend_cli::constants::UNCOMMITTED_CHECKSUM;
use gvend_cli::context::copy::hash_tree;
use gvend_cli::context::{ModifyKind, ModifyOptions};
use gvend_cli::core::VendorError;
use gvend_cli::pkgspec::PkgSpec;
use std::fs;

fn vendored() -> (TestProject, gvend_cli::context::Context) {
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    project.library("co2/pk1", &[]).unwrap();
    project.ws.write_go("co2/pk1", "README.md", "docs\n").unwrap();
    let mut ctx = project.context().unwrap();
    ctx.modify(&PkgSpec::parse("co2/pk1", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();
    (project, ctx)
}

#[test]
fn test_checksum_matches_vendored_tree() {
    let (project, mut ctx) = vendored();
    let record = ctx.manifest.find("co2/pk1").unwrap();
    assert_eq!(record.checksum, hash_tree(&project.vendor().join("co2/pk1"), false).unwrap());
    assert!(ctx.verify().unwrap().is_empty());
    ctx.status().unwrap();
}

#[test]
fn test_checksum_independent_of_location() {
    let (project, ctx) = vendored();
    let vendored = hash_tree(&project.vendor().join("co2/pk1"), false).unwrap();
    let original = hash_tree(&project.ws.dir("co2/pk1"), false).unwrap();
    assert_eq!(vendored, original);
    assert_eq!(ctx.manifest.find("co2/pk1").unwrap().checksum, original);
}

#[test]
fn test_modified_vendor_file_is_reported() {
    let (project, mut ctx) = vendored();
    fs::write(project.vendor().join("co2/pk1/pk1.go"), "package pk1\n\n// patched\n").unwrap();

    assert_eq!(ctx.verify().unwrap(), vec!["co2/pk1".to_string()]);
    let err = ctx.status().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::ChecksumMismatch { paths }) if paths == &vec!["co2/pk1".to_string()]
    ));
}

#[test]
fn test_deleted_vendor_folder_is_reported() {
    let (project, ctx) = vendored();
    fs::remove_dir_all(project.vendor().join("co2")).unwrap();
    assert_eq!(ctx.verify().unwrap(), vec!["co2/pk1".to_string()]);
}

#[test]
fn test_uncommitted_marker_is_never_up_to_date() {
    let (_project, mut ctx) = vendored();
    ctx.manifest.find_mut("co2/pk1").unwrap().checksum = UNCOMMITTED_CHECKSUM.to_string();
    assert_eq!(ctx.verify().unwrap(), vec!["co2/pk1".to_string()]);
}

#[test]
fn test_missing_import_fails_status() {
    let project = TestProject::new(&["co9/missing"]).unwrap();
    let mut ctx = project.context().unwrap();
    let err = ctx.status().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::ChecksumMismatch { paths }) if paths == &vec!["co9/missing".to_string()]
    ));
}
