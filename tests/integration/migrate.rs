use crate::common::{PROJECT, TestProject};
use gvend_cli::context::{Location, Presence};
use gvend_cli::core::VendorError;
use gvend_cli::manifest::Manifest;
use gvend_cli::migrate::{MigrateFrom, migrate};

const GODEPS_JSON: &str = r#"{
    "ImportPath": "co1/pk1",
    "GoVersion": "go1.6",
    "Deps": [
        {"ImportPath": "co2/pk1", "Comment": "v1.0.0", "Rev": "abc123"}
    ]
}"#;

#[test]
fn test_migrate_from_godep() {
    let project = TestProject::new(&["co1/pk1/Godeps/_workspace/src/co2/pk1"]).unwrap();
    let godeps = project.root().join("Godeps");
    project.ws.write_file(&project.root(), "Godeps", "Godeps.json", GODEPS_JSON).unwrap();
    project
        .ws
        .write_file(&godeps.join("_workspace/src"), "co2/pk1", "pk1.go", "package pk1\n")
        .unwrap();

    let ctx = migrate(project.ws.env(), &project.root(), MigrateFrom::Godep).unwrap();

    assert!(!godeps.exists());
    assert!(project.vendor().join("co2/pk1/pk1.go").is_file());
    let main = project.ws.read(PROJECT, "main.go").unwrap();
    assert!(main.contains("\"co2/pk1\""));
    assert!(!main.contains("Godeps"));

    let saved = Manifest::load(&project.vendor().join("vendor.json")).unwrap();
    let record = saved.find("co2/pk1").unwrap();
    assert_eq!(record.revision, "abc123");
    assert_eq!(record.comment, "v1.0.0");
    assert!(!record.checksum.is_empty());

    let pkg = &ctx.packages["co1/pk1/vendor/co2/pk1"];
    assert_eq!(pkg.status.location, Location::Vendor);
    assert_eq!(pkg.status.presence, Presence::Normal);
}

#[test]
fn test_migrate_from_internal() {
    let project = TestProject::new(&["co1/pk1/internal/co2/pk1"]).unwrap();
    project.library("co1/pk1/internal/co2/pk1", &[]).unwrap();

    let mut ctx = migrate(project.ws.env(), &project.root(), MigrateFrom::Internal).unwrap();

    assert!(!project.root().join("internal").exists());
    assert!(project.vendor().join("co2/pk1/pk1.go").is_file());
    let main = project.ws.read(PROJECT, "main.go").unwrap();
    assert!(main.contains("\"co2/pk1\""));
    assert!(ctx.manifest.find("co2/pk1").is_some());
    assert_eq!(
        ctx.packages["co1/pk1/vendor/co2/pk1"].status.location,
        Location::Vendor
    );
    ctx.status().unwrap();
}

#[test]
fn test_migrate_without_godeps_fails() {
    let project = TestProject::new(&[]).unwrap();
    let err = migrate(project.ws.env(), &project.root(), MigrateFrom::Godep).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VendorError>(),
        Some(VendorError::MissingManifest { .. })
    ));
}
