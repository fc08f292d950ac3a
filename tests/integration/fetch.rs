use crate::common::{TestProject, package_source};
use gvend_cli::context::{Context, ModifyKind, ModifyOptions};
use gvend_cli::pkgspec::PkgSpec;
use gvend_cli::test_utils::TestGit;
use gvend_cli::vcs::VcsChain;
use std::fs;

/// A git repository for co2/pk1 with tags v1.0.0 and v2.0.0, plus a plain
/// co3/dep repository imported by v2.0.0. Returns the v1.0.0 revision.
fn setup_repos(project: &TestProject) -> String {
    let repos = project.ws.path().join("repos");
    let pk1 = repos.join("pk1");
    let dep = repos.join("dep");
    fs::create_dir_all(&pk1).unwrap();
    fs::create_dir_all(&dep).unwrap();

    let git = TestGit::new(&dep);
    git.init().unwrap();
    fs::write(dep.join("dep.go"), package_source("dep", &[])).unwrap();
    git.commit_all("dep").unwrap();

    let git = TestGit::new(&pk1);
    git.init().unwrap();
    fs::write(pk1.join("pk1.go"), "package pk1\n\nconst Version = 1\n").unwrap();
    let v1 = git.commit_all("v1").unwrap();
    git.tag("v1.0.0").unwrap();
    fs::write(
        pk1.join("pk1.go"),
        "package pk1\n\nimport \"co3/dep\"\n\nconst Version = 2\n\nvar _ = dep.X\n",
    )
    .unwrap();
    git.commit_all("v2").unwrap();
    git.tag("v2.0.0").unwrap();
    v1
}

fn context(project: &TestProject) -> Context {
    let repos = project.ws.path().join("repos");
    let mut ctx = project.context().unwrap();
    ctx.vcs = VcsChain::default();
    ctx.remote
        .hosts
        .insert("co2/pk1".to_string(), repos.join("pk1").display().to_string());
    ctx.remote
        .hosts
        .insert("co3/dep".to_string(), repos.join("dep").display().to_string());
    ctx
}

#[test]
fn test_fetch_tagged_version() {
    if !TestGit::available() {
        return;
    }
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    let v1 = setup_repos(&project);
    let mut ctx = context(&project);

    ctx.modify(&PkgSpec::parse("co2/pk1@v1", None).unwrap(), ModifyKind::Fetch, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("const Version = 1"));
    let record = ctx.manifest.find("co2/pk1").unwrap();
    assert_eq!(record.revision, v1);
    assert!(!record.revision_time.is_empty());
    assert!(!project.vendor().join("co3").exists());
}

#[test]
fn test_fetch_queues_missing_dependencies() {
    if !TestGit::available() {
        return;
    }
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    setup_repos(&project);
    let mut ctx = context(&project);

    ctx.modify(&PkgSpec::parse("co2/pk1@v2", None).unwrap(), ModifyKind::AddUpdate, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("const Version = 2"));
    assert!(project.vendor().join("co3/dep/dep.go").is_file());
    assert!(ctx.manifest.find("co3/dep").is_some());
    assert!(ctx.verify().unwrap().is_empty());
}

#[test]
fn test_sync_restores_recorded_revision() {
    if !TestGit::available() {
        return;
    }
    let project = TestProject::new(&["co2/pk1"]).unwrap();
    let v1 = setup_repos(&project);
    let mut ctx = context(&project);
    ctx.modify(&PkgSpec::parse("co2/pk1@=v1.0.0", None).unwrap(), ModifyKind::Fetch, ModifyOptions::default())
        .unwrap();
    ctx.alter().unwrap();

    fs::remove_dir_all(project.vendor().join("co2")).unwrap();
    let restored = ctx.sync().unwrap();

    assert_eq!(restored, vec!["co2/pk1".to_string()]);
    let copied = fs::read_to_string(project.vendor().join("co2/pk1/pk1.go")).unwrap();
    assert!(copied.contains("const Version = 1"));
    assert_eq!(ctx.manifest.find("co2/pk1").unwrap().revision, v1);
    assert!(ctx.verify().unwrap().is_empty());
}
