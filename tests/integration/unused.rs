use crate::common::TestProject;
use gvend_cli::context::{Location, ModifyKind, ModifyOptions, Presence, StatusFilter};
use gvend_cli::pkgspec::PkgSpec;

/// Project importing co2/a, which imports co2/b, which imports co2/c.
fn chain() -> TestProject {
    let project = TestProject::new(&["co2/a"]).unwrap();
    project.library("co2/a", &["co2/b"]).unwrap();
    project.library("co2/b", &["co2/c"]).unwrap();
    project.library("co2/c", &[]).unwrap();
    project
}

fn filter(args: &[&str]) -> StatusFilter {
    let mut filter = StatusFilter::default();
    for arg in args {
        assert!(filter.add_arg(arg).unwrap());
    }
    filter
}

#[test]
fn test_unused_cascades_through_vendored_chain() {
    let project = chain();
    let mut ctx = project.context().unwrap();
    ctx.modify_status(&filter(&["+external"]), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    for name in ["a", "b", "c"] {
        let pkg = &ctx.packages[&format!("co1/pk1/vendor/co2/{name}")];
        assert_eq!(pkg.status.location, Location::Vendor);
        assert_eq!(pkg.status.presence, Presence::Normal, "co2/{name}");
    }

    project.set_imports(&["fmt"]).unwrap();
    let mut ctx = project.ws.open_project("co1/pk1").unwrap();
    ctx.load_packages().unwrap();
    for name in ["a", "b", "c"] {
        let pkg = &ctx.packages[&format!("co1/pk1/vendor/co2/{name}")];
        assert_eq!(pkg.status.presence, Presence::Unused, "co2/{name}");
        assert!(pkg.references.is_empty());
    }
    assert_eq!(ctx.list(&filter(&["+unused"])).len(), 3);
}

#[test]
fn test_remove_unused_cleans_vendor_folder() {
    let project = chain();
    project.library("co2/d", &[]).unwrap();
    let mut ctx = project.context().unwrap();
    ctx.modify_status(&filter(&["+external"]), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.modify(&PkgSpec::parse("co2/d", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/d"].status.presence,
        Presence::Unused
    );

    ctx.modify_status(&filter(&["+unused"]), ModifyKind::Remove, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    assert!(!project.vendor().join("co2/d").exists());
    assert!(project.vendor().join("co2/a").is_dir());
    assert!(ctx.manifest.find("co2/d").is_none());
    assert_eq!(ctx.manifest.package.len(), 3);
    assert!(ctx.list(&filter(&["+unused"])).is_empty());
}

#[test]
fn test_program_packages_are_never_unused() {
    let project = TestProject::new(&[]).unwrap();
    project.ws.write_go("co2/tool", "main.go", "package main\n\nfunc main() {}\n").unwrap();
    let mut ctx = project.context().unwrap();
    ctx.modify(&PkgSpec::parse("co2/tool", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    let tool = &ctx.packages["co1/pk1/vendor/co2/tool"];
    assert_eq!(tool.status.letters(), "v p");
}

#[test]
fn test_tree_importing_its_own_subpackage_becomes_unused() {
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    project.library("co2/pk1", &["co2/pk1/sub"]).unwrap();
    project.library("co2/pk1/sub", &[]).unwrap();
    let mut ctx = project.context().unwrap();
    ctx.modify(&PkgSpec::parse("co2/pk1/^", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/pk1"].status.presence,
        Presence::Normal
    );

    project.set_imports(&["fmt"]).unwrap();
    let mut ctx = project.ws.open_project("co1/pk1").unwrap();
    ctx.load_packages().unwrap();

    let tree = &ctx.packages["co1/pk1/vendor/co2/pk1"];
    assert!(tree.references.is_empty());
    assert_eq!(tree.status.presence, Presence::Unused);
    assert!(ctx.packages["co1/pk1/vendor/co2/pk1/sub"]
        .references
        .iter()
        .all(|importer| importer.starts_with("co1/pk1/vendor/co2/pk1")));
}

#[test]
fn test_tree_imported_only_by_its_subpackage_becomes_unused() {
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    project.library("co2/pk1", &[]).unwrap();
    project.library("co2/pk1/sub", &["co2/pk1"]).unwrap();
    let mut ctx = project.context().unwrap();
    ctx.modify(&PkgSpec::parse("co2/pk1/^", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    project.set_imports(&["fmt"]).unwrap();
    let mut ctx = project.ws.open_project("co1/pk1").unwrap();
    ctx.load_packages().unwrap();

    let tree = &ctx.packages["co1/pk1/vendor/co2/pk1"];
    assert!(tree.references.contains("co1/pk1/vendor/co2/pk1/sub"));
    assert_eq!(tree.status.presence, Presence::Unused);
}
