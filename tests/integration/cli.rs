//! Commands, flags, output formats and exit codes of the binary.

use crate::common::{ConfigBuilder, TestProject};
use assert_cmd::Command;
use predicates::prelude::*;

fn bundle_cache(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("bundle-cache").unwrap();
    cmd.current_dir(project.project_path())
        .env_remove("BUNDLE_CACHE_CONFIG")
        .env("NO_COLOR", "1");
    cmd
}

fn api_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.install_bundle("com.acme:api:1.0", "com.acme.api").unwrap();
    project.install_bundle("com.acme:impl:1.0", "com.acme.impl").unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("embed-scopes", "[\"compile\"]")
        .add_dependency("com.acme:api:1.0", "compile")
        .add_dependency("com.acme:impl:1.0", "runtime")
        .build();
    project.write_config(&config).unwrap();
    project
}

#[test]
fn test_resolve_reports_cached_artifacts() {
    let project = api_project();

    bundle_cache(&project)
        .arg("resolve")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tracked"))
        .stdout(predicate::str::contains("2 artifact(s)"))
        .stdout(predicate::str::contains("2 copied"));

    assert!(project.cache_path().join("api-1.0.jar").is_file());
    assert!(project.cache_path().join("impl-1.0.jar").is_file());
}

#[test]
fn test_list_json_output() {
    let project = api_project();

    let output = bundle_cache(&project).args(["list", "--format", "json"]).output().unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let api = entries.iter().find(|e| e["artifact_id"] == "api").unwrap();
    assert_eq!(api["type"], "jar");
    assert_eq!(api["to_be_embedded"], true);
    assert_eq!(api["cached"], false);

    let runtime = entries.iter().find(|e| e["artifact_id"] == "impl").unwrap();
    assert_eq!(runtime["scope"], "runtime");
    assert_eq!(runtime["to_be_embedded"], false);
    assert_eq!(runtime["to_be_cached"], true);
}

#[test]
fn test_list_embeddable_table() {
    let project = api_project();

    bundle_cache(&project)
        .args(["list", "--embeddable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme:api"))
        .stdout(predicate::str::contains("com.acme:impl").not())
        .stdout(predicate::str::contains("1 artifact(s)"));
}

#[test]
fn test_list_does_not_copy() {
    let project = api_project();
    bundle_cache(&project).arg("list").assert().success();
    assert!(!project.cache_path().exists());
}

#[test]
fn test_clean_removes_cache() {
    let project = api_project();
    bundle_cache(&project).arg("resolve").assert().success();
    assert!(project.cache_path().exists());

    bundle_cache(&project)
        .arg("clean")
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed"));
    assert!(!project.cache_path().exists());
}

#[test]
fn test_missing_config_exits_with_error() {
    let project = TestProject::new().unwrap();

    bundle_cache(&project)
        .arg("resolve")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error"))
        .stderr(predicate::str::contains("bundle-cache.toml"));
}

#[test]
fn test_config_from_environment() {
    let project = api_project();
    let elsewhere = TestProject::new().unwrap();

    bundle_cache(&elsewhere)
        .env("BUNDLE_CACHE_CONFIG", project.config_path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("com.acme:api"));
}

#[test]
fn test_config_discovered_from_subdirectory() {
    let project = api_project();
    project.write_file("module/src/.keep", "").unwrap();

    bundle_cache(&project)
        .current_dir(project.project_path().join("module"))
        .arg("resolve")
        .assert()
        .success();
    assert!(project.cache_path().join("api-1.0.jar").is_file());
}

#[test]
fn test_invalid_naming_pattern_is_fatal() {
    let project = TestProject::new().unwrap();
    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("naming-pattern", "'%q.%e'")
        .build();
    project.write_config(&config).unwrap();

    bundle_cache(&project)
        .arg("resolve")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid naming pattern"));
}

#[test]
fn test_offline_skips_remote_downloads() {
    let project = TestProject::new().unwrap();
    std::fs::create_dir_all(project.cache_path()).unwrap();
    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_remote_index_set(
            "http://127.0.0.1:9/p2",
            &["{ artifact-id = 'org.eclipse.osgi', version = '3.18.0' }"],
        )
        .build();
    project.write_config(&config).unwrap();

    project
        .run_bundle_cache(&["--offline", "resolve"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("1 skipped");
    assert!(!project.cache_path().join("org.eclipse.osgi_3.18.0.jar").exists());

    project
        .run_bundle_cache(&["resolve"])
        .unwrap()
        .assert_failure()
        .assert_stderr_contains("Cannot reach remote repository");
}

#[test]
fn test_verbose_and_quiet_are_exclusive() {
    let project = api_project();
    bundle_cache(&project).args(["--verbose", "--quiet", "list"]).assert().failure();
}
