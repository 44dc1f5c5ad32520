//! Integration tests for `planviz render`
//!
//! Every test runs in its own temporary directory with its own user config
//! directory, so no configuration leaks in from the machine running them.

use assert_cmd::Command;
use planviz::{compile, CompileOptions, PlanFile};
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plan.json")
}

/// Command running in `temp` with an empty user config directory
fn planviz(temp: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("planviz"));
    cmd.current_dir(temp.path())
        .env("XDG_CONFIG_HOME", temp.path().join("xdg"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_plan(temp: &TempDir, plan: &Value) -> PathBuf {
    let path = temp.path().join("plan.json");
    fs::write(&path, serde_json::to_string_pretty(plan).unwrap()).unwrap();
    path
}

#[test]
fn test_render_fixture_matches_library() {
    let temp = TempDir::new().unwrap();
    let plan = PlanFile::load(&fixture_path()).unwrap();
    let expected = compile(
        &plan.issues,
        &plan.directory(),
        &CompileOptions::new("http://fake-youtrack/"),
    )
    .unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::eq(expected));
}

#[test]
fn test_render_emits_nested_clusters_and_redirected_edges() {
    let temp = TempDir::new().unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph ProjectPlan {\n"))
        .stdout(predicate::str::contains("  subgraph cluster_XYZ_1 {\n"))
        .stdout(predicate::str::contains("    subgraph cluster_XYZ_3 {\n"))
        .stdout(predicate::str::contains(
            "  XYZ_2 -> XYZ_4 [\n    lhead = cluster_XYZ_3;\n  ]\n",
        ))
        .stdout(predicate::str::contains(
            "  XYZ_6 -> XYZ_8 [\n    ltail = cluster_XYZ_5;\n  ]\n",
        ))
        .stdout(predicate::str::contains("<s>XYZ-6: Issue 6</s>"))
        .stdout(predicate::str::ends_with("}\n"));
}

#[test]
fn test_render_to_output_file() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("plan.dot");

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout("")
        .stderr(predicate::str::contains("Rendered 8 issues to:"));

    let dot = fs::read_to_string(&output).unwrap();
    assert!(dot.starts_with("digraph ProjectPlan {"));
    assert!(dot.contains("href = \"http://fake-youtrack/issue/XYZ-8\";"));
}

#[test]
fn test_quiet_suppresses_info() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("plan.dot");

    planviz(&temp)
        .args(["--quiet", "render"])
        .arg(fixture_path())
        .arg("-o")
        .arg(&output)
        .assert()
        .success()
        .stderr("");
    assert!(output.exists());
}

#[test]
fn test_base_url_flag_overrides_plan() {
    let temp = TempDir::new().unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .args(["--base-url", "https://tracker.example"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "href = \"https://tracker.example/issue/XYZ-1\";",
        ))
        .stdout(predicate::str::contains("fake-youtrack").not());
}

#[test]
fn test_repo_config_base_url_overrides_plan() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("planviz.toml"),
        "[render]\nbase_url = \"https://from-config.example/\"\n",
    )
    .unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "href = \"https://from-config.example/issue/XYZ-1\";",
        ));
}

#[test]
fn test_explicit_config_file() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("custom.toml");
    fs::write(&config, "[render]\nbase_url = \"https://custom.example\"\n").unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "href = \"https://custom.example/issue/XYZ-1\";",
        ));
}

#[test]
fn test_missing_explicit_config_is_not_found() {
    let temp = TempDir::new().unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .args(["--config", "does-not-exist.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_malformed_config_is_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("planviz.toml"), "[render\n").unwrap();

    planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse config file"));
}

#[test]
fn test_render_json_envelope() {
    let temp = TempDir::new().unwrap();

    let output = planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .arg("--json")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["issues"], 8);
    assert_eq!(json["data"]["edges"], 2);
    assert!(json["data"]["dot"]
        .as_str()
        .unwrap()
        .starts_with("digraph ProjectPlan {"));
    assert_eq!(json["metadata"]["command"], "render");
    assert!(json["metadata"]["timestamp"].is_string());
}

#[test]
fn test_render_json_with_output_file_omits_document() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("out.dot");

    let output = planviz(&temp)
        .arg("render")
        .arg(fixture_path())
        .arg("--json")
        .arg("-o")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json["data"].get("dot").is_none());
    assert_eq!(json["data"]["output"], path.display().to_string());
    assert!(path.exists());
}

#[test]
fn test_invalid_color_fails_validation() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "categories": [{ "id": "bug", "name": "Bug", "color": { "background": "#12" } }],
            "issues": [{ "id": "A-1", "summary": "Broken", "category": "bug" }]
        }),
    );

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .assert()
        .code(4)
        .stdout("")
        .stderr(predicate::str::contains(
            "Category 'bug' has an invalid background color '#12'",
        ))
        .stderr(predicate::str::contains("To fix:"));
}

#[test]
fn test_parent_cycle_json_error() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "issues": [
                { "id": "A-1", "parent": "A-2" },
                { "id": "A-2", "parent": "A-1" }
            ]
        }),
    );

    let output = planviz(&temp)
        .arg("render")
        .arg(&plan)
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "PARENT_CYCLE");
    assert_eq!(json["error"]["details"]["cycle"], json!(["A-1", "A-2", "A-1"]));
    assert!(!json["error"]["suggestions"].as_array().unwrap().is_empty());
}

#[test]
fn test_keyword_issue_id_is_rejected() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "issues": [
                { "id": "node", "summary": "Keyword" },
                { "id": "other", "dependencies": ["node"] }
            ]
        }),
    );

    let output = planviz(&temp)
        .arg("render")
        .arg(&plan)
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(4));

    let json: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "RESERVED_IDENTIFIER");
    assert_eq!(
        json["error"]["details"],
        json!({ "id": "node", "identifier": "node" })
    );
}

#[test]
fn test_href_with_trailing_backslash_stays_quoted() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "base_url": "https://tracker.example/",
            "issues": [
                { "id": "A\\", "summary": "Backslash" },
                { "id": "B-1", "summary": "After" }
            ]
        }),
    );

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "  A_ [\n    label = <A\\: Backslash>;\n    href = \"https://tracker.example/issue/A\\\\\";\n",
        ))
        .stdout(predicate::str::contains("  B_1 [\n"));
}

#[test]
fn test_missing_dependency_policy() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "base_url": "https://tracker.example/",
            "issues": [{ "id": "A-1", "summary": "Task", "dependencies": ["OTHER-9"] }]
        }),
    );

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .assert()
        .code(4)
        .stderr(predicate::str::contains(
            "Issue A-1 depends on unknown issue OTHER-9",
        ))
        .stderr(predicate::str::contains("--missing-dependencies drop"));

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .args(["--missing-dependencies", "drop"])
        .assert()
        .success()
        .stdout(predicate::str::contains("  A_1 [\n"))
        .stdout(predicate::str::contains("->").not());
}

#[test]
fn test_missing_dependency_policy_from_config() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "base_url": "https://tracker.example/",
            "issues": [{ "id": "A-1", "dependencies": ["OTHER-9"] }]
        }),
    );
    fs::write(
        temp.path().join("planviz.toml"),
        "[render]\nmissing_dependencies = \"drop\"\n",
    )
    .unwrap();

    planviz(&temp).arg("render").arg(&plan).assert().success();

    // The command line still wins over the config file
    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .args(["--missing-dependencies", "reject"])
        .assert()
        .code(4);
}

#[test]
fn test_category_field_from_flag() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(
        &temp,
        &json!({
            "base_url": "https://tracker.example/",
            "categories": [{ "id": "bug", "name": "Bug",
                             "color": { "foreground": "#f00", "background": "#fee" } }],
            "issues": [{ "id": "A-1", "custom_fields": { "Type": "bug" } }]
        }),
    );

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::contains("fillcolor = \"#ffffff\";"));

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .args(["--category-field", "Type"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fillcolor = \"#ffeeee\";"))
        .stdout(predicate::str::contains("fontcolor = \"#ff0000\";"));
}

#[test]
fn test_plan_not_found() {
    let temp = TempDir::new().unwrap();

    planviz(&temp)
        .args(["render", "missing.json"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Plan file not found: missing.json"));
}

#[test]
fn test_malformed_plan_is_invalid_argument() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plan.json");
    fs::write(&path, "{ \"issues\": [ }").unwrap();

    planviz(&temp)
        .arg("render")
        .arg(&path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Failed to parse plan file"));
}

#[test]
fn test_empty_plan_renders_preamble_only() {
    let temp = TempDir::new().unwrap();
    let plan = write_plan(&temp, &json!({}));

    planviz(&temp)
        .arg("render")
        .arg(&plan)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("digraph ProjectPlan {\n"))
        .stdout(predicate::str::ends_with("ranksep = 1;\n\n}\n"))
        .stderr(predicate::str::contains("No base URL configured"));
}
