use crate::common::TestProject;
use gvend_cli::manifest::Manifest;
use predicates::prelude::*;

fn project() -> TestProject {
    let project = TestProject::new(&["fmt", "co2/pk1"]).unwrap();
    project.library("co2/pk1", &["co3/pk1"]).unwrap();
    project.library("co3/pk1", &[]).unwrap();
    project
}

#[test]
fn test_init_creates_manifest() {
    let project = project();
    project
        .gvend()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created").and(predicate::str::contains("co1/pk1")));

    let manifest = Manifest::load(&project.vendor().join("vendor.json")).unwrap();
    assert_eq!(manifest.ignore, "test");
    assert!(manifest.package.is_empty());

    project
        .gvend()
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn test_commands_require_manifest() {
    let project = project();
    project
        .gvend()
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Vendor manifest not found"))
        .stderr(predicate::str::contains("gvend init"));
}

#[test]
fn test_list_shows_status_letters() {
    let project = project();
    project.gvend().arg("init").assert().success();

    project
        .gvend()
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("l p co1/pk1"))
        .stdout(predicate::str::contains("e   co2/pk1"))
        .stdout(predicate::str::contains("s   fmt"));

    project
        .gvend()
        .args(["list", "+std"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fmt").and(predicate::str::contains("co2/pk1").not()));
}

#[test]
fn test_add_list_and_remove() {
    let project = project();
    project.gvend().arg("init").assert().success();

    project
        .gvend()
        .args(["add", "co2/pk1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 operation(s) applied"));
    assert!(project.vendor().join("co2/pk1/pk1.go").is_file());

    project
        .gvend()
        .args(["list", "+vendor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("v   co1/pk1/vendor/co2/pk1"));

    project.gvend().arg("status").assert().success();

    project
        .gvend()
        .args(["remove", "+vendor"])
        .assert()
        .success();
    assert!(!project.vendor().join("co2").exists());
    let manifest = Manifest::load(&project.vendor().join("vendor.json")).unwrap();
    assert!(manifest.package.is_empty());
}

#[test]
fn test_dry_run_changes_nothing() {
    let project = project();
    project.gvend().arg("init").assert().success();

    project
        .gvend()
        .args(["add", "-n", "+external"])
        .assert()
        .success()
        .stdout(predicate::str::contains("copy").and(predicate::str::contains("co3")));
    assert!(!project.vendor().join("co2").exists());
}

#[test]
fn test_status_reports_modified_vendor() {
    let project = project();
    project.gvend().arg("init").assert().success();
    project.gvend().args(["add", "+external"]).assert().success();

    std::fs::write(project.vendor().join("co3/pk1/pk1.go"), "package pk1\n\n// edited\n").unwrap();
    project
        .gvend()
        .arg("status")
        .assert()
        .failure()
        .stderr(predicate::str::contains("co3/pk1"))
        .stderr(predicate::str::contains("gvend sync"));
}

#[test]
fn test_unknown_package_suggests_alternatives() {
    let project = project();
    project.gvend().arg("init").assert().success();

    project
        .gvend()
        .args(["add", "co2/pk2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in any search path"))
        .stderr(predicate::str::contains("did you mean: co2/pk1"));
}

#[test]
fn test_invalid_selector_is_rejected() {
    let project = project();
    project.gvend().arg("init").assert().success();
    project
        .gvend()
        .args(["list", "+bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown status selector"));
}

#[test]
fn test_license_lists_copied_notices() {
    let project = project();
    project.ws.write_go("co2", "LICENSE", "MIT License\n").unwrap();
    project.gvend().arg("init").assert().success();
    project.gvend().args(["add", "co2/pk1"]).assert().success();

    assert!(project.vendor().join("co2/LICENSE").is_file());
    project
        .gvend()
        .arg("license")
        .assert()
        .success()
        .stdout(predicate::str::contains("MIT License"));
}
