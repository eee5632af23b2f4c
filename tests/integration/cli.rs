//! Tests for the `viewdigest` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use viewdigest::digestor::hexdigest;
use viewdigest::test_utils::{ViewFixture, ViewSet};

fn viewdigest(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("viewdigest").unwrap();
    cmd.current_dir(dir).env_remove("VIEWDIGEST_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn view_path(fixture: &ViewFixture) -> String {
    fixture.root().display().to_string()
}

fn stdout_of(output: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&output.get_output().stdout).trim().to_string()
}

#[test]
fn test_digest_prints_hex_digest() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    let views = view_path(&fixture);
    let output = viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "digest", "articles/show"])
        .assert()
        .success();

    let digest = stdout_of(&output);
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_digest_of_leaf_matches_sha256() {
    let fixture = ViewFixture::with_templates([("pages/_card.html.erb", "card")]).unwrap();
    let views = view_path(&fixture);
    viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "digest", "pages/_card"])
        .assert()
        .success()
        .stdout(predicate::str::contains(hexdigest("card-")));
}

#[test]
fn test_dependency_tokens_change_output() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    let views = view_path(&fixture);
    let plain = viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "digest", "articles/index"])
        .assert()
        .success();
    let busted = viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "digest", "articles/index"])
        .args(["--dependency", "v2"])
        .assert()
        .success();
    assert_ne!(stdout_of(&plain), stdout_of(&busted));
}

#[test]
fn test_missing_template_prints_empty_digest() {
    let fixture = ViewFixture::new().unwrap();
    let views = view_path(&fixture);
    let output = viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "digest", "nothing/here"])
        .assert()
        .success();
    assert_eq!(stdout_of(&output), "");
}

#[test]
fn test_no_view_paths_is_an_error() {
    let temp = TempDir::new().unwrap();
    viewdigest(temp.path())
        .args(["digest", "articles/show"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("No view paths configured"))
        .stderr(predicate::str::contains("--view-path"));
}

#[test]
fn test_config_file_supplies_view_paths() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    fs::write(
        fixture.root().join("viewdigest.toml"),
        format!("view_paths = [{:?}]\n", view_path(&fixture)),
    )
    .unwrap();

    viewdigest(fixture.root())
        .args(["dependencies", "articles/show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("comments/comment"));
}

#[test]
fn test_explicit_config_flag() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    let config_dir = TempDir::new().unwrap();
    let config = config_dir.path().join("custom.toml");
    fs::write(&config, format!("view_paths = [{:?}]\n", view_path(&fixture))).unwrap();

    viewdigest(config_dir.path())
        .args(["--config", config.to_str().unwrap(), "dependencies", "articles/index"])
        .assert()
        .success()
        .stdout(predicate::str::contains("articles/article"));
}

#[test]
fn test_invalid_config_reports_suggestion() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("viewdigest.toml"), "lock_stripes = 3\n").unwrap();

    viewdigest(temp.path())
        .args(["digest", "x/y"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("power of two"));
}

#[test]
fn test_nested_dependencies_json_output() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    let views = view_path(&fixture);
    let output = viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "nested-dependencies", "articles/show"])
        .assert()
        .success();

    let value: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(
        value,
        serde_json::json!({ "articles/show": [{ "comments/comment": ["authors/author"] }] })
    );
}

#[test]
fn test_nested_dependencies_tree_output() {
    let fixture = ViewFixture::with_templates(ViewSet::cycle()).unwrap();
    let views = view_path(&fixture);
    viewdigest(fixture.root())
        .args(["--view-path", views.as_str(), "nested-dependencies", "loops/_a"])
        .args(["--output", "tree"])
        .assert()
        .success()
        .stdout(predicate::str::contains("└── "))
        .stdout(predicate::str::contains("loops/b"))
        .stdout(predicate::str::contains("(*)"));
}

#[test]
fn test_verbose_logs_missing_templates() {
    let fixture = ViewFixture::with_templates(ViewSet::articles()).unwrap();
    let views = view_path(&fixture);
    viewdigest(fixture.root())
        .args(["--verbose", "--view-path", views.as_str(), "digest", "articles/show"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Couldn't find template for digesting: authors/author"));
}
