use crate::common::{PROJECT, TestProject};
use gvend_cli::context::{Context, ModifyKind, ModifyOptions, Presence};
use gvend_cli::pkgspec::PkgSpec;

fn tagged_project() -> TestProject {
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    let ws = &project.ws;
    ws.write_go(PROJECT, "main_test.go", "package main\n\nimport \"co5/testonly\"\n").unwrap();
    ws.write_go(
        PROJECT,
        "gae.go",
        "// +build appengine\n\npackage main\n\nimport \"co6/gae\"\n",
    )
    .unwrap();
    ws.write_go(
        PROJECT,
        "modern.go",
        "//go:build !appengine\n// +build appengine\n\npackage main\n\nimport \"co6/ok\"\n",
    )
    .unwrap();
    for lib in ["co5/testonly", "co6/gae", "co6/ok"] {
        project.library(lib, &[]).unwrap();
    }
    project.library("co2/pk1", &[]).unwrap();
    ws.write_go("co2/pk1", "pk1_test.go", "package pk1\n\nimport \"co5/testonly\"\n").unwrap();
    ws.write_go("co2/pk1", "pk1_windows.go", "package pk1\n").unwrap();
    project
}

fn open(project: &TestProject, ignore: &str) -> Context {
    let mut ctx = Context::init(project.ws.env(), &project.root(), ignore).unwrap();
    ctx.vcs = gvend_cli::vcs::VcsChain::empty();
    ctx.load_packages().unwrap();
    ctx
}

#[test]
fn test_ignored_tags_hide_imports() {
    let project = tagged_project();
    let ctx = open(&project, "test appengine");

    assert!(!ctx.packages.contains_key("co5/testonly"));
    assert!(!ctx.packages.contains_key("co6/gae"));
    assert!(ctx.packages.contains_key("co6/ok"));
}

#[test]
fn test_without_ignore_every_file_counts() {
    let project = tagged_project();
    let ctx = open(&project, "");

    assert!(ctx.packages.contains_key("co5/testonly"));
    assert!(ctx.packages.contains_key("co6/gae"));
    assert!(ctx.packages.contains_key("co6/ok"));
}

#[test]
fn test_ignored_files_are_not_copied() {
    let project = tagged_project();
    let mut ctx = open(&project, "test");
    ctx.modify(&PkgSpec::parse("co2/pk1", None).unwrap(), ModifyKind::Add, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    let dest = project.vendor().join("co2/pk1");
    assert!(dest.join("pk1.go").is_file());
    assert!(dest.join("pk1_windows.go").is_file());
    assert!(!dest.join("pk1_test.go").exists());
}

#[test]
fn test_excluded_prefix_is_not_followed() {
    let project = TestProject::new(&["co7/skip"]).unwrap();
    project.library("co7/skip", &["co8/deep"]).unwrap();
    project.library("co8/deep", &[]).unwrap();
    let ctx = open(&project, "test co7/");

    assert_eq!(ctx.packages["co7/skip"].status.presence, Presence::Excluded);
    assert_eq!(ctx.packages["co7/skip"].status.letters(), "ex ");
    assert!(!ctx.packages.contains_key("co8/deep"));
}
