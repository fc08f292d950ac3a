use crate::common::TestProject;
use gvend_cli::context::{Context, ModifyKind, ModifyOptions, OpState, ResolveStrategy, StatusFilter};
use gvend_cli::core::VendorError;

/// co2/a and co2/bb both carry their own vendored copy of co3/x.
fn nested_vendors() -> TestProject {
    let project = TestProject::new(&["co2/a", "co2/bb"]).unwrap();
    project.library("co2/a", &["co3/x"]).unwrap();
    project.library("co2/bb", &["co3/x"]).unwrap();
    project.ws.write_go("co2/a/vendor/co3/x", "x.go", "package x\n\n// from a\n").unwrap();
    project.ws.write_go("co2/bb/vendor/co3/x", "x.go", "package x\n\n// from bb\n").unwrap();
    project
}

fn add_external(ctx: &mut Context) {
    let mut filter = StatusFilter::default();
    filter.add_arg("+external").unwrap();
    ctx.modify_status(&filter, ModifyKind::Add, ModifyOptions::default()).unwrap();
}

#[test]
fn test_unresolved_conflict_blocks_alter() {
    let project = nested_vendors();
    let mut ctx = project.context().unwrap();
    add_external(&mut ctx);

    let conflicts = ctx.check();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].canonical, "co3/x");
    assert_eq!(conflicts[0].ops.len(), 2);

    let err = ctx.alter().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::UnresolvedConflict { .. })
    ));
    assert!(!project.vendor().join("co2").exists());
}

#[test]
fn test_longest_path_wins() {
    let project = nested_vendors();
    let mut ctx = project.context().unwrap();
    add_external(&mut ctx);

    let mut conflicts = ctx.check();
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ManifestOrigin);
    assert!(!conflicts[0].resolved);
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::LongestPath);
    assert!(conflicts[0].resolved);
    ctx.apply_resolutions(&conflicts);
    ctx.alter().unwrap();

    let copied = std::fs::read_to_string(project.vendor().join("co3/x/x.go")).unwrap();
    assert!(copied.contains("// from bb"));
    assert_eq!(ctx.manifest.find("co3/x").unwrap().origin, "co2/bb/vendor/co3/x");
    assert!(ctx.operations.iter().any(|op| op.state == OpState::Ignore));
}

#[test]
fn test_shortest_path_wins() {
    let project = nested_vendors();
    let mut ctx = project.context().unwrap();
    add_external(&mut ctx);

    let mut conflicts = ctx.check();
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ShortestPath);
    ctx.apply_resolutions(&conflicts);
    ctx.alter().unwrap();

    let copied = std::fs::read_to_string(project.vendor().join("co3/x/x.go")).unwrap();
    assert!(copied.contains("// from a"));
}

#[test]
fn test_manifest_origin_keeps_recorded_source() {
    let project = nested_vendors();
    let mut ctx = project.context().unwrap();
    add_external(&mut ctx);
    let mut conflicts = ctx.check();
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ShortestPath);
    ctx.apply_resolutions(&conflicts);
    ctx.alter().unwrap();

    // A later session sees the recorded origin and sticks with it.
    let mut ctx = project.ws.open_project("co1/pk1").unwrap();
    ctx.vcs = gvend_cli::vcs::VcsChain::empty();
    ctx.load_packages().unwrap();
    let record = ctx.manifest.find("co3/x").unwrap().clone();
    assert_eq!(record.origin, "co2/a/vendor/co3/x");

    let spec = gvend_cli::pkgspec::PkgSpec::parse("co3/x::co2/a/vendor/co3/x", None).unwrap();
    ctx.modify(&spec, ModifyKind::Update, ModifyOptions::default()).unwrap();
    let spec = gvend_cli::pkgspec::PkgSpec::parse("co3/x::co2/bb/vendor/co3/x", None).unwrap();
    ctx.modify(&spec, ModifyKind::Update, ModifyOptions::default()).unwrap();

    let mut conflicts = ctx.check();
    assert_eq!(conflicts.len(), 1);
    ctx.resolve_conflicts(&mut conflicts, ResolveStrategy::ManifestOrigin);
    let selected = conflicts[0].selected.unwrap();
    assert_eq!(ctx.operations[selected].source, "co2/a/vendor/co3/x");
}
