use crate::common::TestProject;
use gvend_cli::context::{Location, ModifyKind, ModifyOptions, Presence};
use gvend_cli::core::VendorError;
use gvend_cli::manifest::Manifest;
use gvend_cli::pkgspec::PkgSpec;
use std::fs;

fn spec(text: &str) -> PkgSpec {
    PkgSpec::parse(text, None).unwrap()
}

fn project() -> TestProject {
    let project = TestProject::new(&["fmt", "co2/pk1", "co2/pk2"]).unwrap();
    project.library("co2/pk1", &["strings"]).unwrap();
    project.library("co2/pk2", &["co3/pk1"]).unwrap();
    project.library("co3/pk1", &[]).unwrap();
    project
}

#[test]
fn test_add_vendors_packages_and_saves_manifest() {
    let project = project();
    let mut ctx = project.context().unwrap();
    ctx.load_packages().unwrap();
    assert_eq!(ctx.packages["co2/pk1"].status.location, Location::External);

    ctx.modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.modify(&spec("co2/pk2"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    assert!(project.vendor().join("co2/pk1/pk1.go").is_file());
    assert!(project.vendor().join("co2/pk2/pk2.go").is_file());
    assert!(!project.vendor().join("co3").exists());

    let saved = Manifest::load(&project.vendor().join("vendor.json")).unwrap();
    let paths: Vec<&str> = saved.package.iter().map(|r| r.path.as_str()).collect();
    assert_eq!(paths, vec!["co2/pk1", "co2/pk2"]);
    assert!(saved.package.iter().all(|r| r.checksum.len() == 43));

    let vendored = &ctx.packages["co1/pk1/vendor/co2/pk1"];
    assert_eq!(vendored.status.location, Location::Vendor);
    assert_eq!(vendored.status.presence, Presence::Normal);
    assert!(vendored.references.contains("co1/pk1"));
    assert_eq!(ctx.packages["fmt"].status.location, Location::Standard);
    assert_eq!(ctx.packages["co3/pk1"].status.location, Location::External);
}

#[test]
fn test_add_existing_package_fails() {
    let project = project();
    let mut ctx = project.context().unwrap();
    ctx.modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    let err = ctx
        .modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::PackageAlreadyExists { path }) if path == "co2/pk1"
    ));
}

#[test]
fn test_update_requires_vendored_package() {
    let project = project();
    let mut ctx = project.context().unwrap();
    let err = ctx
        .modify(&spec("co2/pk1"), ModifyKind::Update, ModifyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::PackageNotVendored { .. })
    ));
}

#[test]
fn test_update_copies_new_content() {
    let project = project();
    let mut ctx = project.context().unwrap();
    ctx.modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();
    let before = ctx.manifest.find("co2/pk1").unwrap().checksum.clone();

    project
        .ws
        .write_go("co2/pk1", "pk1.go", "package pk1\n\nfunc Hello() string { return \"hi\" }\n")
        .unwrap();
    ctx.modify(&spec("co2/pk1"), ModifyKind::Update, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("func Hello()"));
    assert_ne!(ctx.manifest.find("co2/pk1").unwrap().checksum, before);
}

#[test]
fn test_add_from_origin_records_origin() {
    let project = project();
    project.ws.write_go("co4/fork", "pk1.go", "package pk1\n\n// forked\n").unwrap();
    let mut ctx = project.context().unwrap();

    ctx.modify(&spec("co2/pk1::co4/fork"), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("// forked"));
    let record = ctx.manifest.find("co2/pk1").unwrap();
    assert_eq!(record.origin, "co4/fork");
    assert_eq!(record.source_path(), "co4/fork");
    assert_eq!(ctx.packages["co1/pk1/vendor/co2/pk1"].origin, "co4/fork");
}

#[test]
fn test_tree_vendoring_and_nesting() {
    let project = TestProject::new(&["co2/pk1", "co2/pk1/sub"]).unwrap();
    project.library("co2/pk1", &[]).unwrap();
    project.library("co2/pk1/sub", &[]).unwrap();
    let mut ctx = project.context().unwrap();

    ctx.modify(&spec("co2/pk1/^"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    assert!(project.vendor().join("co2/pk1/sub/sub.go").is_file());
    assert!(ctx.manifest.find("co2/pk1").unwrap().tree);
    assert!(ctx.manifest.find("co2/pk1/sub").is_none());
    let sub = &ctx.packages["co1/pk1/vendor/co2/pk1/sub"];
    assert_eq!(sub.status.location, Location::Vendor);
    assert!(sub.in_tree);

    let err = ctx
        .modify(&spec("co2/pk1/sub"), ModifyKind::AddUpdate, ModifyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::TreeParents { parents, .. }) if parents == &vec!["co2/pk1".to_string()]
    ));

    ctx.modify(&spec("co2/pk1"), ModifyKind::Remove, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();
    assert!(!project.vendor().join("co2").exists());
    assert!(ctx.manifest.package.is_empty());
}

#[test]
fn test_match_tree_expands_from_gopath() {
    let project = project();
    project.library("co2/pk3", &[]).unwrap();
    let mut ctx = project.context().unwrap();

    ctx.modify(&spec("co2/..."), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    for path in ["co2/pk1", "co2/pk2", "co2/pk3"] {
        assert!(ctx.manifest.find(path).is_some(), "{path} not recorded");
    }
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/pk3"].status.presence,
        Presence::Unused
    );
}

#[test]
fn test_add_unknown_package_fails() {
    let project = project();
    let mut ctx = project.context().unwrap();
    let err = ctx
        .modify(&spec("co7/nothing"), ModifyKind::Add, ModifyOptions::default())
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::NotFoundInSearchPath { path }) if path == "co7/nothing"
    ));
}

#[test]
fn test_tree_copy_strips_subpackage_import_comments() {
    let project = TestProject::new(&["co2/pk1", "co2/pk1/sub"]).unwrap();
    project
        .ws
        .write_go("co2/pk1", "pk1.go", "package pk1 // import \"co2/pk1\"\n")
        .unwrap();
    project
        .ws
        .write_go("co2/pk1/sub", "sub.go", "package sub // import \"co2/pk1/sub\"\n")
        .unwrap();
    let mut ctx = project.context().unwrap();

    ctx.modify(&spec("co2/pk1/^"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    for file in ["co2/pk1/pk1.go", "co2/pk1/sub/sub.go"] {
        let copied = fs::read_to_string(project.vendor().join(file)).unwrap();
        assert!(!copied.contains("// import"), "{file}: {copied:?}");
    }
    assert!(ctx.verify().unwrap().is_empty());
}

#[test]
fn test_add_again_after_vendor_folder_deleted() {
    let project = project();
    let mut ctx = project.context().unwrap();
    ctx.modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    fs::remove_dir_all(project.vendor().join("co2")).unwrap();
    let mut ctx = project.ws.open_project("co1/pk1").unwrap();
    ctx.vcs = gvend_cli::vcs::VcsChain::empty();
    ctx.load_packages().unwrap();
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/pk1"].status.presence,
        Presence::Missing
    );

    ctx.modify(&spec("co2/pk1"), ModifyKind::Add, ModifyOptions::default()).unwrap();
    ctx.alter().unwrap();

    assert!(project.vendor().join("co2/pk1/pk1.go").is_file());
    assert!(ctx.verify().unwrap().is_empty());
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/pk1"].status.presence,
        Presence::Normal
    );
}
