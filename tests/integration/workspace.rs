//! Modules built alongside the assembly are packed into the cache.

use crate::common::{ConfigBuilder, TestProject};
use bundle_cache::config::Config;
use bundle_cache::constants::JAR_MANIFEST_PATH;
use bundle_cache::manifest::ManifestHeaders;
use bundle_cache::test_utils::fixtures;
use std::fs::{File, OpenOptions};
use std::time::{Duration, SystemTime};

fn workspace_project() -> TestProject {
    let project = TestProject::new().unwrap();
    project.create_workspace_bundle("foo", "com.acme.foo;singleton:=true", "1.0.0").unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("embed-scopes", "[\"compile\"]")
        .add_dependency("com.acme:foo:bundle:1.0", "compile")
        .add_workspace("com.acme:foo:bundle:1.0", "foo")
        .build();
    project.write_config(&config).unwrap();
    project
}

#[test]
fn test_workspace_bundle_is_packed_once() {
    let project = workspace_project();

    project
        .run_bundle_cache(&["resolve"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("1 packed");

    let cached = project.cache_path().join("foo-1.0.0.jar");
    let headers = ManifestHeaders::read_from_archive(&cached, JAR_MANIFEST_PATH).unwrap().unwrap();
    assert_eq!(headers.main_value("Bundle-SymbolicName"), Some("com.acme.foo"));

    let archive = zip::ZipArchive::new(File::open(&cached).unwrap()).unwrap();
    assert!(archive.file_names().any(|n| n == "com/acme/Activator.class"));

    project
        .run_bundle_cache(&["resolve"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("0 packed")
        .assert_stdout_contains("1 up to date");
}

#[test]
fn test_changed_workspace_output_is_repacked() {
    let project = workspace_project();
    project.run_bundle_cache(&["resolve"]).unwrap().assert_success();

    let class = project.project_path().join("foo/target/classes/com/acme/Activator.class");
    let later = SystemTime::now() + Duration::from_secs(60);
    OpenOptions::new().write(true).open(&class).unwrap().set_modified(later).unwrap();

    project
        .run_bundle_cache(&["resolve"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("1 packed");
}

#[test]
fn test_resolve_clean_repacks_everything() {
    let project = workspace_project();
    project.run_bundle_cache(&["resolve"]).unwrap().assert_success();

    project
        .run_bundle_cache(&["resolve", "--clean"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("1 packed");
    assert!(project.cache_path().join("foo-1.0.0.jar").is_file());
}

#[test]
fn test_workspace_subsystem_through_config() {
    let project = TestProject::new().unwrap();
    fixtures::create_workspace_subsystem(
        &project.project_path().join("app"),
        "com.acme.app",
        "2.0.0",
        "osgi.subsystem.feature",
    )
    .unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("group-by-type", "true")
        .add_dependency("com.acme:app:esa:2.0", "compile")
        .add_workspace("com.acme:app:esa:2.0", "app")
        .build();
    project.write_config(&config).unwrap();

    let config = Config::load(&project.config_path()).unwrap();
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();

    let app = manager.tracker("app", "2.0").unwrap();
    assert!(app.is_workspace_project());
    assert_eq!(app.cached_file(), project.cache_path().join("esa/app-2.0.0.esa"));

    let report = manager.cache_all().unwrap();
    assert_eq!(report.packed, 1);
    let archive = zip::ZipArchive::new(File::open(app.cached_file()).unwrap()).unwrap();
    assert!(archive.file_names().any(|n| n == "mimetype"));
}
