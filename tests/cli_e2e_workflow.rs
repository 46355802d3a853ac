//! End-to-end tests for the `build-farm workflow` command.

#[allow(dead_code)]
mod common;
#[allow(unused_imports)]
use common::prelude::*;

const WORKFLOW: &str = r#"name: build
jobs:
  build:
    strategy:
      matrix:
        config_targets: [old]
    steps:
      - run: build-farm compile --allow ${{ matrix.config_targets }}
"#;

#[test]
fn test_workflow_rewrites_targets() {
    let fixture = TestFixture::new()
        .with_config(configs::ONE_FAILING)
        .with_file(".github/workflows/main.yml", WORKFLOW);

    fixture.command().arg("workflow").assert().success();

    fixture
        .child(".github/workflows/main.yml")
        .assert(WORKFLOW.replace("[old]", "[zlib, curl]").as_str());
}

#[test]
fn test_workflow_custom_target_and_filter() {
    let fixture = TestFixture::new()
        .with_config(configs::ONE_FAILING)
        .with_file("ci.yml", WORKFLOW);

    fixture
        .command()
        .args(["workflow", "--target", "ci.yml", "--allow", "curl"])
        .assert()
        .success();

    fixture
        .child("ci.yml")
        .assert(predicate::str::contains("        config_targets: [curl]\n"));
}

#[test]
fn test_workflow_without_targets_line_fails() {
    let fixture = TestFixture::new()
        .with_config(configs::SINGLE)
        .with_file("ci.yml", "name: build\n");

    fixture
        .command()
        .args(["workflow", "--target", "ci.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not find config_targets"));

    fixture.child("ci.yml").assert("name: build\n");
}
