//! Configuration-driven resolution through the library API.

use crate::common::{ConfigBuilder, TestProject};
use bundle_cache::config::Config;
use bundle_cache::core::BundleCacheError;
use bundle_cache::test_utils::fixtures;
use bundle_cache::tracker::TrackerKind;
use bundle_cache::utils::http::path_to_file_url;

fn load(project: &TestProject) -> Config {
    Config::load(&project.config_path()).unwrap()
}

#[test]
fn test_dependencies_and_artifact_sets_are_cached() {
    let project = TestProject::new().unwrap();
    project.install_bundle("com.acme:api:1.0", "com.acme.api").unwrap();
    project.install_bundle("com.acme:impl:2.0", "com.acme.impl").unwrap();
    project
        .install_bundle("org.apache.felix:org.apache.felix.scr:2.2.6", "org.apache.felix.scr")
        .unwrap();
    project.install_bundle("com.acme:extra:3.0", "com.acme.extra").unwrap();
    project
        .write_file(
            "bundles.properties",
            "# bundles started early\nextra = com.acme:extra:jar:3.0@5\n",
        )
        .unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("embed-scopes", "[\"compile\"]")
        .add_dependency("com.acme:api:1.0", "compile")
        .add_dependency("com.acme:impl:2.0", "runtime")
        .add_repository_set("target/felix", &["org.apache.felix:org.apache.felix.scr:jar:2.2.6@1"])
        .add_properties_set("bundles.properties", "target/extra")
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let session = config.build_session().unwrap();
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&session).unwrap();
    assert_eq!(manager.len(), 4);

    let api = manager.tracker("api", "1.0").unwrap();
    assert!(api.is_to_be_embedded());
    assert_eq!(api.symbolic_name(), Some("com.acme.api"));

    let runtime = manager.tracker("impl", "2.0").unwrap();
    assert!(runtime.is_to_be_cached());
    assert!(!runtime.is_to_be_embedded());

    let scr = manager.tracker("org.apache.felix.scr", "2.2.6").unwrap();
    assert_eq!(scr.start_level(), 1);
    assert!(scr.cached_file().starts_with(project.project_path().join("target/felix")));

    let extra = manager.tracker("extra", "3.0").unwrap();
    assert_eq!(extra.kind(), TrackerKind::Properties);
    assert_eq!(extra.start_level(), 5);

    let report = manager.cache_all().unwrap();
    assert!(report.is_success(), "{report}");
    assert_eq!(report.copied, 4);
    assert!(project.cache_path().join("api-1.0.jar").is_file());
    assert!(project.cache_path().join("impl-2.0.jar").is_file());
    assert!(scr.cached_file().is_file());
    assert!(extra.cached_file().is_file());

    // A second pass over an unchanged repository copies nothing
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&session).unwrap();
    let again = manager.cache_all().unwrap();
    assert_eq!(again.copied, 0);
    assert_eq!(again.up_to_date, 4);
}

#[test]
fn test_exclusions_and_scope_filters() {
    let project = TestProject::new().unwrap();
    project.install_bundle("com.acme:api:1.0", "com.acme.api").unwrap();
    project.install_bundle("org.osgi:osgi.core:8.0", "osgi.core").unwrap();
    project.install_bundle("com.acme:fixture:1.0", "com.acme.fixture").unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("exclusions", "[\"org.osgi:*\"]")
        .add_dependency("com.acme:api:1.0", "compile")
        .add_dependency("org.osgi:osgi.core:8.0", "provided")
        .add_dependency("com.acme:fixture:1.0", "test")
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();

    assert!(manager.tracker("api", "1.0").is_some());
    assert!(manager.tracker("osgi.core", "8.0").is_none());
    assert!(manager.tracker("fixture", "1.0").is_none());
}

#[test]
fn test_unknown_type_uses_project_packaging() {
    let project = TestProject::new().unwrap();
    project.install_bundle("com.acme:lib:zip:1.0", "com.acme.lib").unwrap();
    project.install_pom("com.acme:lib:zip:1.0", "jar").unwrap();
    project.install_bundle("com.acme:parent:zip:1.0", "com.acme.parent").unwrap();
    project.install_pom("com.acme:parent:zip:1.0", "pom").unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_dependency("com.acme:lib:zip:1.0", "compile")
        .add_dependency("com.acme:parent:zip:1.0", "compile")
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();

    let lib = manager.tracker("lib", "1.0").unwrap();
    assert_eq!(lib.symbolic_name(), Some("com.acme.lib"));
    assert_eq!(lib.cached_file(), project.cache_path().join("lib-1.0.jar"));
    assert!(manager.tracker("parent", "1.0").is_none());
}

#[test]
fn test_missing_required_dependency_fails_the_pass() {
    let project = TestProject::new().unwrap();
    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_dependency("com.acme:ghost:1.0", "compile")
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    let error = manager.resolve_all(&config.build_session().unwrap()).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<BundleCacheError>(),
        Some(BundleCacheError::ResolutionError { .. })
    ));
}

#[test]
fn test_optional_dependency_is_ignored_unless_requested() {
    let project = TestProject::new().unwrap();
    project.install_bundle("com.acme:opt:1.0", "com.acme.opt").unwrap();
    let table = "group-id = 'com.acme'\nartifact-id = 'opt'\nversion = '1.0'\noptional = true";

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_dependency_table(table)
        .build();
    project.write_config(&config).unwrap();
    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();
    assert!(manager.is_empty());

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .resolution("include-optional", "true")
        .add_dependency_table(table)
        .build();
    project.write_config(&config).unwrap();
    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();
    assert!(manager.tracker("opt", "1.0").is_some());
}

#[test]
fn test_remote_index_download_from_file_repository() {
    let project = TestProject::new().unwrap();
    let p2 = project.project_path().join("p2");
    fixtures::write_bundle_jar(
        &p2.join("plugins/org.eclipse.osgi_3.18.0.jar"),
        "org.eclipse.osgi",
        "3.18.0",
    )
    .unwrap();

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_remote_index_set(
            &path_to_file_url(&p2),
            &["{ artifact-id = 'org.eclipse.osgi', version = '3.18.0', start-level = 1 }"],
        )
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    manager.resolve_all(&config.build_session().unwrap()).unwrap();

    let osgi = manager.tracker("org.eclipse.osgi", "3.18.0").unwrap();
    assert_eq!(osgi.kind(), TrackerKind::RemoteIndex);
    assert_eq!(osgi.group_id(), "p2");

    let report = manager.cache_all().unwrap();
    assert_eq!(report.downloaded, 1);
    assert!(project.cache_path().join("org.eclipse.osgi_3.18.0.jar").is_file());
}

#[test]
fn test_unreachable_remote_index_is_reported() {
    let project = TestProject::new().unwrap();
    let missing = project.project_path().join("nowhere");

    let config = ConfigBuilder::new("com.acme:dist:pom:1.0")
        .local_repository(project.repository_path())
        .add_remote_index_set(&path_to_file_url(&missing), &["'p2:org.eclipse.osgi:jar:3.18.0'"])
        .build();
    project.write_config(&config).unwrap();

    let config = load(&project);
    let mut manager = config.tracker_manager().unwrap();
    let error = manager.resolve_all(&config.build_session().unwrap()).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<BundleCacheError>(),
        Some(BundleCacheError::RepositoryUnreachable { .. })
    ));
}
