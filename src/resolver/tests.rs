//! Tests for the resolver module.

use super::*;
use crate::artifact::{ArtifactCoordinates, ArtifactReference, ArtifactSet};
use crate::session::{ResolvedArtifact, WorkspaceProject};
use crate::test_utils::{InMemoryRepository, fixtures, init_test_logging};
use crate::tracker::{CacheStatus, TrackerKind};
use crate::utils::http::path_to_file_url;
use std::path::Path;
use tempfile::TempDir;

fn coordinates(artifact: &str, version: &str) -> ArtifactCoordinates {
    ArtifactCoordinates::new("com.acme", artifact, version)
}

fn dependency(artifact: &str, version: &str, scope: &str, file: &Path) -> ResolvedArtifact {
    ResolvedArtifact::new(coordinates(artifact, version), scope).with_file(file)
}

fn manager(repository: InMemoryRepository, cache: &Path) -> TrackerManager {
    TrackerManager::builder()
        .with_repository_system(Box::new(repository))
        .with_cache_directory(cache)
        .filtering()
        .with_embed_scopes(vec!["compile".to_string()])
        .remote_index()
        .operational()
        .build()
        .unwrap()
}

fn session(temp: &TempDir) -> BuildSession {
    BuildSession::new(coordinates("dist", "1.0"), temp.path())
}

fn resolution_error_coordinates(error: &anyhow::Error) -> String {
    match error.downcast_ref::<BundleCacheError>() {
        Some(BundleCacheError::ResolutionError {
            coordinates,
            ..
        }) => coordinates.clone(),
        other => panic!("expected a resolution error, got {other:?}"),
    }
}

#[test]
fn test_builder_rejects_invalid_naming_pattern() {
    let error = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .filtering()
        .remote_index()
        .operational()
        .with_naming_pattern("%n-%x.%e")
        .build()
        .unwrap_err();
    assert!(matches!(
        error.downcast_ref::<BundleCacheError>(),
        Some(BundleCacheError::InvalidNamingPattern { .. })
    ));
}

#[test]
fn test_builder_requires_repository_system() {
    let error =
        TrackerManager::builder().filtering().remote_index().operational().build().unwrap_err();
    assert!(matches!(
        error.downcast_ref::<BundleCacheError>(),
        Some(BundleCacheError::ConfigurationError { .. })
    ));
}

#[test]
fn test_resolves_direct_bundle_from_session() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let jar =
        fixtures::write_bundle_jar(&temp.path().join("m2/bar-2.0.jar"), "com.acme.bar", "2.0.0")
            .unwrap();
    let session = session(&temp)
        .with_dependency(dependency("bar", "2.0", "compile", &jar))
        .with_dependency(
            ResolvedArtifact::new(coordinates("baz", "1.0"), "runtime")
                .with_file(fixtures::write_bundle_jar(
                    &temp.path().join("m2/baz-1.0.jar"),
                    "com.acme.baz",
                    "1.0.0",
                ).unwrap()),
        );

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();

    let bar = manager.tracker("bar", "2.0").unwrap();
    assert_eq!(bar.kind(), TrackerKind::Repository);
    assert_eq!(bar.symbolic_name(), Some("com.acme.bar"));
    assert_eq!(bar.cached_file(), temp.path().join("cache/bar-2.0.jar"));
    assert_eq!(bar.handler().name(), "jar");
    assert!(bar.is_to_be_cached());
    assert!(bar.is_to_be_embedded());
    assert!(!bar.is_cached());

    let baz = manager.tracker("baz", "1.0").unwrap();
    assert!(baz.is_to_be_cached());
    assert!(!baz.is_to_be_embedded());
}

#[test]
fn test_unmatched_entry_without_version_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut set = RepositorySet::new(None);
    set.add(ArtifactReference::parse("artifact1:1.0.0")).unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path())
        .with_repository_set(set)
        .filtering()
        .remote_index()
        .operational()
        .build()
        .unwrap();

    let error = manager.resolve_all(&session(&temp)).unwrap_err();
    assert!(resolution_error_coordinates(&error).contains("artifact1"));
    assert!(manager.is_empty());
}

#[test]
fn test_repository_set_claims_matching_dependency() {
    let temp = TempDir::new().unwrap();
    let jar = fixtures::write_bundle_jar(&temp.path().join("foo.jar"), "com.acme.foo", "1.0.0")
        .unwrap();
    let mut set = RepositorySet::new(Some(temp.path().join("bundles")));
    let mut reference = ArtifactReference::parse("com.acme:foo");
    reference.start_level = 3;
    reference.copy_name = Some("foo.jar".to_string());
    set.add(reference).unwrap();

    let session = session(&temp).with_dependency(
        ResolvedArtifact::new(coordinates("foo", "1.0"), "provided").with_file(&jar),
    );
    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .with_repository_set(set)
        .filtering()
        .remote_index()
        .operational()
        .build()
        .unwrap();
    manager.resolve_all(&session).unwrap();

    assert_eq!(manager.len(), 1);
    let foo = manager.tracker("foo", "1.0").unwrap();
    assert_eq!(foo.start_level(), 3);
    assert_eq!(foo.scope(), "provided");
    assert_eq!(foo.cached_file(), temp.path().join("bundles/foo.jar"));
}

#[test]
fn test_unmatched_entry_resolved_through_repository() {
    let temp = TempDir::new().unwrap();
    let jar = fixtures::write_bundle_jar(&temp.path().join("m2/ext.jar"), "com.acme.ext", "4.1.0")
        .unwrap();
    let repository = InMemoryRepository::new().with_artifact(coordinates("ext", "4.1"), jar);
    let mut set = RepositorySet::new(None);
    set.add(ArtifactReference::parse("com.acme:ext:jar:4.1")).unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(repository))
        .with_cache_directory(temp.path().join("cache"))
        .with_repository_set(set)
        .filtering()
        .remote_index()
        .operational()
        .build()
        .unwrap();
    manager.resolve_all(&session(&temp)).unwrap();

    let ext = manager.tracker("ext", "4.1").unwrap();
    assert_eq!(ext.scope(), "compile");
    assert!(ext.file().is_some_and(|f| f.ends_with("m2/ext.jar")));
}

#[test]
fn test_missing_manifest_skips_artifact() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let plain = fixtures::write_plain_jar(&temp.path().join("plain-1.0.jar")).unwrap();
    let session = session(&temp)
        .with_dependency(dependency("plain", "1.0", "compile", &plain));

    let mut manager = manager(InMemoryRepository::new(), temp.path());
    manager.resolve_all(&session).unwrap();
    assert!(manager.is_empty());
}

#[test]
fn test_unresolvable_dependencies() {
    let temp = TempDir::new().unwrap();
    let optional = session(&temp)
        .with_dependency(ResolvedArtifact::new(coordinates("gone", "1.0"), "compile").optional());
    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path())
        .filtering()
        .with_optional(true)
        .remote_index()
        .operational()
        .build()
        .unwrap();
    manager.resolve_all(&optional).unwrap();
    assert!(manager.is_empty());

    let required = session(&temp)
        .with_dependency(ResolvedArtifact::new(coordinates("gone", "1.0"), "compile"));
    let error = manager.resolve_all(&required).unwrap_err();
    assert!(resolution_error_coordinates(&error).contains("gone"));
}

#[test]
fn test_filters_transitive_excluded_and_caller() {
    let temp = TempDir::new().unwrap();
    let mut session = session(&temp);
    for (name, transitive) in [("keep", false), ("deep", true), ("tools", false)] {
        let jar = fixtures::write_bundle_jar(
            &temp.path().join(format!("{name}.jar")),
            &format!("com.acme.{name}"),
            "1.0.0",
        )
        .unwrap();
        let mut artifact = dependency(name, "1.0", "compile", &jar);
        if transitive {
            artifact = artifact.transitive();
        }
        session.add_dependency(artifact);
    }
    let osgi =
        fixtures::write_bundle_jar(&temp.path().join("osgi.jar"), "osgi.core", "8.0.0").unwrap();
    session.add_dependency(
        ResolvedArtifact::new(ArtifactCoordinates::new("org.osgi", "osgi.core", "8.0"), "compile")
            .with_file(osgi),
    );
    let test_jar = fixtures::write_bundle_jar(&temp.path().join("t.jar"), "t", "1.0.0").unwrap();
    session.add_dependency(dependency("junit", "4.13", "test", &test_jar));

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .with_transitive(false)
        .with_exclusions(vec!["org.osgi:*".to_string()])
        .remote_index()
        .operational()
        .build()
        .unwrap();

    let no_tools: &dyn ArtifactFilter =
        &|a: &ResolvedArtifact| a.coordinates.artifact_id != "tools";
    let added = manager.resolve_maven_artifacts(&session, Some(no_tools)).unwrap();

    assert_eq!(added, 1);
    let ids: Vec<_> = manager.trackers().iter().map(|t| t.artifact_id().to_string()).collect();
    assert_eq!(ids, ["keep"]);
}

#[test]
fn test_snapshot_version_is_timestamped() {
    let temp = TempDir::new().unwrap();
    let jar = fixtures::write_bundle_jar(
        &temp.path().join("snap.jar"),
        "com.acme.snap",
        "1.2.3.qualifier",
    )
    .unwrap();
    let session = session(&temp).with_dependency(
        ResolvedArtifact::new(coordinates("snap", "1.2.3-SNAPSHOT"), "compile").with_file(jar),
    );

    let mut manager = manager(InMemoryRepository::new(), temp.path());
    manager.resolve_all(&session).unwrap();

    let snap = manager.tracker("snap", "1.2.3-SNAPSHOT").unwrap();
    let name = snap.cached_file().file_name().unwrap().to_string_lossy().into_owned();
    let timestamp = name.strip_prefix("snap-1.2.3.").unwrap().strip_suffix(".jar").unwrap();
    assert!(!timestamp.is_empty());
    assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn test_workspace_bundle_is_packed() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("foo");
    fixtures::create_workspace_bundle(&project_dir, "com.acme.foo;singleton:=true", "1.0.0")
        .unwrap();

    let foo = coordinates("foo", "1.0").with_type("bundle");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(foo.clone(), "compile"))
        .with_workspace_project(WorkspaceProject::new(foo, &project_dir));

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();

    let tracker = manager.tracker("foo", "1.0").unwrap();
    assert!(tracker.is_workspace_project());
    assert!(tracker.is_to_be_cached());
    assert_eq!(tracker.symbolic_name(), Some("com.acme.foo"));
    assert_eq!(tracker.cached_file(), temp.path().join("cache/foo-1.0.0.jar"));
    assert_eq!(tracker.file(), Some(project_dir.join("target/foo-1.0.0.jar").as_path()));
    assert_eq!(tracker.workspace_directory(), Some(project_dir.join("target/classes").as_path()));

    let report = manager.copy_maven_artifacts_to_cache().unwrap();
    assert_eq!(report.packed, 1);
    let tracker = manager.tracker("foo", "1.0").unwrap();
    assert!(tracker.is_cached());

    let headers = crate::manifest::ManifestHeaders::read_from_archive(
        tracker.cached_file(),
        crate::constants::JAR_MANIFEST_PATH,
    )
    .unwrap()
    .unwrap();
    assert_eq!(headers.main_value("Bundle-SymbolicName"), Some("com.acme.foo"));

    let again = manager.copy_maven_artifacts_to_cache().unwrap();
    assert_eq!(again.packed, 0);
    assert_eq!(again.up_to_date, 1);
}

#[test]
fn test_workspace_project_without_manifest_is_skipped() {
    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("empty");
    std::fs::create_dir_all(project_dir.join("target/classes")).unwrap();

    let empty = coordinates("empty", "1.0").with_type("bundle");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(empty.clone(), "compile"))
        .with_workspace_project(WorkspaceProject::new(empty, &project_dir));

    let mut manager = manager(InMemoryRepository::new(), temp.path());
    manager.resolve_all(&session).unwrap();
    assert!(manager.is_empty());
}

#[test]
fn test_workspace_subsystem_is_packed_with_mimetype() {
    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("app");
    fixtures::create_workspace_subsystem(
        &project_dir,
        "com.acme.app",
        "2.0.0",
        "osgi.subsystem.application",
    )
    .unwrap();

    let app = coordinates("app", "2.0").with_type("esa");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(app.clone(), "compile"))
        .with_workspace_project(WorkspaceProject::new(app, &project_dir));

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();
    manager.cache_all().unwrap();

    let tracker = manager.tracker("app", "2.0").unwrap();
    assert_eq!(tracker.cached_file(), temp.path().join("cache/app-2.0.0.esa"));
    let file = std::fs::File::open(tracker.cached_file()).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.file_names().filter(|n| *n == "mimetype").count(), 1);
}

#[test]
fn test_unknown_type_falls_back_on_packaging() {
    let temp = TempDir::new().unwrap();
    let lib = fixtures::write_bundle_jar(&temp.path().join("lib.jar"), "com.acme.lib", "1.0.0")
        .unwrap();
    let pom = fixtures::write_bundle_jar(&temp.path().join("pom.jar"), "com.acme.pom", "1.0.0")
        .unwrap();

    let lib_coordinates = coordinates("lib", "1.0").with_type("zip");
    let pom_coordinates = coordinates("parent", "1.0").with_type("zip");
    let repository = InMemoryRepository::new()
        .with_packaging(&lib_coordinates, "jar")
        .with_packaging(&pom_coordinates, "pom");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(lib_coordinates, "compile").with_file(lib))
        .with_dependency(ResolvedArtifact::new(pom_coordinates, "compile").with_file(pom));

    let mut manager = manager(repository, &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();

    assert_eq!(manager.tracker("lib", "1.0").unwrap().symbolic_name(), Some("com.acme.lib"));
    assert!(manager.tracker("parent", "1.0").is_none());
}

#[test]
fn test_first_tracker_wins() {
    let temp = TempDir::new().unwrap();
    let first = fixtures::write_bundle_jar(&temp.path().join("a.jar"), "first", "1.0.0").unwrap();
    let second = fixtures::write_bundle_jar(&temp.path().join("b.jar"), "second", "1.0.0").unwrap();
    let session = session(&temp)
        .with_dependency(dependency("dup", "1.0", "compile", &first))
        .with_dependency(
            ResolvedArtifact::new(ArtifactCoordinates::new("org.other", "dup", "1.0"), "compile")
                .with_file(second),
        );

    let mut manager = manager(InMemoryRepository::new(), temp.path());
    assert_eq!(manager.resolve_maven_artifacts(&session, None).unwrap(), 1);
    assert_eq!(manager.tracker("dup", "1.0").unwrap().symbolic_name(), Some("first"));
}

#[test]
fn test_remote_index_from_file_repository() {
    let temp = TempDir::new().unwrap();
    let p2 = temp.path().join("p2");
    fixtures::write_bundle_jar(
        &p2.join("plugins/org.eclipse.osgi_3.18.0.jar"),
        "org.eclipse.osgi",
        "3.18.0",
    )
    .unwrap();

    let mut set = RemoteIndexSet::new(Some(path_to_file_url(&p2)), None);
    set.add(ArtifactReference {
        artifact_id: "org.eclipse.osgi".to_string(),
        version: Some("3.18.0".to_string()),
        start_level: 1,
        ..ArtifactReference::default()
    })
    .unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .remote_index()
        .with_remote_index_set(set)
        .operational()
        .build()
        .unwrap();

    assert_eq!(manager.resolve_remote_index_artifacts().unwrap(), 1);
    let tracker = manager.tracker("org.eclipse.osgi", "3.18.0").unwrap();
    assert_eq!(tracker.kind(), TrackerKind::RemoteIndex);
    assert_eq!(tracker.group_id(), "p2");
    assert_eq!(tracker.start_level(), 1);
    assert_eq!(tracker.cache_status(), CacheStatus::Missing);

    let report = manager.copy_remote_index_artifacts_to_cache().unwrap();
    assert_eq!(report.downloaded, 1);
    assert!(temp.path().join("cache/org.eclipse.osgi_3.18.0.jar").is_file());
    assert!(manager.tracker("org.eclipse.osgi", "3.18.0").unwrap().is_cached());
}

#[test]
fn test_unreachable_remote_index_is_fatal() {
    let temp = TempDir::new().unwrap();
    let missing = path_to_file_url(&temp.path().join("nowhere"));
    let mut set = RemoteIndexSet::new(Some(missing.clone()), None);
    set.add(ArtifactReference {
        artifact_id: "x".to_string(),
        version: Some("1".to_string()),
        ..ArtifactReference::default()
    })
    .unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path())
        .filtering()
        .remote_index()
        .with_remote_index_set(set)
        .operational()
        .build()
        .unwrap();

    let error = manager.resolve_remote_index_artifacts().unwrap_err();
    match error.downcast_ref::<BundleCacheError>() {
        Some(BundleCacheError::RepositoryUnreachable {
            url,
        }) => assert_eq!(url, &missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_remote_index_override_rebases_derived_urls() {
    let temp = TempDir::new().unwrap();
    let mirror = temp.path().join("mirror");
    fixtures::write_bundle_jar(&mirror.join("plugins/a_1.0.jar"), "a", "1.0").unwrap();

    let mut set = RemoteIndexSet::new(Some("https://p2.example.com/releases".to_string()), None);
    for (artifact, url) in [("a", None), ("b", Some("https://elsewhere.example.com/b.jar"))] {
        set.add(ArtifactReference {
            artifact_id: artifact.to_string(),
            version: Some("1.0".to_string()),
            url: url.map(str::to_string),
            ..ArtifactReference::default()
        })
        .unwrap();
    }

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .remote_index()
        .with_remote_index_set(set)
        .with_remote_index_override(Some(path_to_file_url(&mirror)))
        .operational()
        .build()
        .unwrap();
    manager.resolve_remote_index_artifacts().unwrap();

    assert_eq!(
        manager.tracker("a", "1.0").unwrap().download_url(),
        Some(format!("{}/plugins/a_1.0.jar", path_to_file_url(&mirror)).as_str())
    );
    assert_eq!(
        manager.tracker("b", "1.0").unwrap().download_url(),
        Some("https://elsewhere.example.com/b.jar")
    );
}

#[test]
fn test_properties_set_resolution_and_copy() {
    let temp = TempDir::new().unwrap();
    let jar = fixtures::write_bundle_jar(&temp.path().join("m2/cfg.jar"), "com.acme.cfg", "1.0.0")
        .unwrap();
    let repository = InMemoryRepository::new().with_artifact(coordinates("cfg", "1.0"), jar);
    let mut set = PropertiesSet::new(Some(temp.path().join("props")));
    set.load_properties("# runtime extras\ncfg = com.acme:cfg:jar:1.0@5\n").unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(repository))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .remote_index()
        .operational()
        .with_properties_set(set)
        .build()
        .unwrap();
    manager.resolve_all(&session(&temp)).unwrap();

    let cfg = manager.tracker("cfg", "1.0").unwrap();
    assert_eq!(cfg.kind(), TrackerKind::Properties);
    assert_eq!(cfg.start_level(), 5);
    assert_eq!(cfg.cached_file(), temp.path().join("props/cfg.jar"));

    let report = manager.cache_all().unwrap();
    assert_eq!(report.copied, 1);
    assert!(report.is_success());
    assert!(temp.path().join("props/cfg.jar").is_file());

    manager.clean_cache().unwrap();
    assert!(!temp.path().join("props").exists());
    assert!(!manager.tracker("cfg", "1.0").unwrap().is_cached());
}

#[test]
fn test_unresolvable_properties_entry_is_fatal() {
    let temp = TempDir::new().unwrap();
    let mut set = PropertiesSet::new(None);
    set.load_properties("missing = com.acme:missing:jar:9.9\n").unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path())
        .filtering()
        .remote_index()
        .operational()
        .with_properties_set(set)
        .build()
        .unwrap();
    let error = manager.resolve_properties_artifacts().unwrap_err();
    assert!(resolution_error_coordinates(&error).contains("missing"));
}

#[test]
fn test_queries() {
    let temp = TempDir::new().unwrap();
    let m2 = temp.path().join("m2");
    let bundle =
        fixtures::write_bundle_jar(&m2.join("core-1.0.jar"), "com.acme.core", "1.0.0").unwrap();
    let esa = fixtures::write_subsystem_archive(
        &m2.join("feature-1.0.esa"),
        "com.acme.feature",
        "1.0.0",
        "osgi.subsystem.application",
    )
    .unwrap();
    let session = session(&temp)
        .with_dependency(dependency("core", "1.0", "compile", &bundle))
        .with_dependency(
            ResolvedArtifact::new(coordinates("feature", "1.0").with_type("esa"), "runtime")
                .with_file(esa),
        );

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();

    assert_eq!(manager.find_by_artifact_id("core").len(), 1);
    assert_eq!(manager.find_by_type("esa").len(), 1);
    assert_eq!(manager.find_by_path_prefix(&m2).len(), 2);
    assert_eq!(manager.find_by_path_prefix(&temp.path().join("cache")).len(), 2);
    assert!(manager.find_by_path_prefix(Path::new("/elsewhere")).is_empty());

    let embeddable: Vec<_> =
        manager.embeddable(&[]).iter().map(|t| t.artifact_id().to_string()).collect();
    assert_eq!(embeddable, ["core"]);
    assert!(manager.embeddable(&["jar"]).is_empty());
    assert_eq!(manager.non_embeddable(&[])[0].artifact_id(), "feature");
    assert!(manager.non_embeddable(&["esa"]).is_empty());

    let classpath: Vec<_> =
        manager.build_classpath().iter().map(|t| t.artifact_id().to_string()).collect();
    assert_eq!(classpath, ["core"]);

    // snapshots do not see later changes
    let snapshot = manager.trackers();
    manager.cache_all().unwrap();
    assert!(snapshot.iter().all(|t| !t.is_cached()));
    assert!(manager.trackers().iter().all(|t| t.is_cached()));
}

#[test]
fn test_group_by_type_layout() {
    let temp = TempDir::new().unwrap();
    let esa = fixtures::write_subsystem_archive(
        &temp.path().join("f.esa"),
        "com.acme.f",
        "1.0.0",
        "osgi.subsystem.feature",
    )
    .unwrap();
    let session = session(&temp).with_dependency(
        ResolvedArtifact::new(coordinates("f", "1.0").with_type("subsystem-feature"), "compile")
            .with_file(esa),
    );

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .remote_index()
        .operational()
        .with_group_by_type(true)
        .with_naming_pattern("%s_%v.%e")
        .build()
        .unwrap();
    manager.resolve_all(&session).unwrap();

    let tracker = manager.tracker("f", "1.0").unwrap();
    assert_eq!(
        tracker.cached_file(),
        temp.path().join("cache/subsystem-feature/com.acme.f_1.0.esa")
    );
}

#[test]
fn test_jar_dependency_with_bundle_packaging_keeps_jar_handler() {
    let temp = TempDir::new().unwrap();
    let scr_coordinates =
        ArtifactCoordinates::new("org.apache.felix", "org.apache.felix.scr", "2.2.6");
    let config_coordinates =
        ArtifactCoordinates::new("org.apache.felix", "org.apache.felix.configadmin", "1.9.26");
    let scr =
        fixtures::write_bundle_jar(&temp.path().join("m2/scr.jar"), "org.apache.felix.scr", "2.2.6")
            .unwrap();
    let configadmin = fixtures::write_bundle_jar(
        &temp.path().join("m2/configadmin.jar"),
        "org.apache.felix.configadmin",
        "1.9.26",
    )
    .unwrap();
    let repository = InMemoryRepository::new()
        .with_packaging(&scr_coordinates, "bundle")
        .with_packaging(&config_coordinates, "bundle")
        .with_artifact(config_coordinates.clone(), configadmin);

    let mut set = PropertiesSet::new(Some(temp.path().join("props")));
    set.load_properties("configadmin = org.apache.felix:org.apache.felix.configadmin:jar:1.9.26\n")
        .unwrap();
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(scr_coordinates, "compile").with_file(scr));

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(repository))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .with_embed_scopes(vec!["compile".to_string()])
        .remote_index()
        .operational()
        .with_properties_set(set)
        .build()
        .unwrap();
    manager.resolve_all(&session).unwrap();

    let scr = manager.tracker("org.apache.felix.scr", "2.2.6").unwrap();
    assert_eq!(scr.handler().name(), "jar");
    assert_eq!(scr.symbolic_name(), Some("org.apache.felix.scr"));
    assert!(scr.is_to_be_embedded());

    let configadmin = manager.tracker("org.apache.felix.configadmin", "1.9.26").unwrap();
    assert_eq!(configadmin.kind(), TrackerKind::Properties);
    assert_eq!(configadmin.handler().name(), "jar");
}

#[test]
fn test_repository_jar_without_bundle_version_is_skipped() {
    init_test_logging(None);
    let temp = TempDir::new().unwrap();
    let manifest = "Manifest-Version: 1.0\r\nBundle-SymbolicName: com.acme.half\r\n\r\n";
    let half = fixtures::write_archive(
        &temp.path().join("m2/half-1.0.jar"),
        &[
            ("META-INF/MANIFEST.MF", manifest.as_bytes()),
            ("com/acme/Half.class", b"\xca\xfe\xba\xbe".as_slice()),
        ],
    )
    .unwrap();
    let whole = fixtures::write_bundle_jar(
        &temp.path().join("m2/whole-1.0.jar"),
        "com.acme.whole",
        "1.0.0",
    )
    .unwrap();
    let session = session(&temp)
        .with_dependency(dependency("half", "1.0", "compile", &half))
        .with_dependency(dependency("whole", "1.0", "compile", &whole));

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();

    assert!(manager.tracker("half", "1.0").is_none());
    assert!(manager.tracker("whole", "1.0").is_some());
    assert_eq!(manager.len(), 1);
}

#[test]
fn test_entry_without_version_is_fatal_only_when_unmatched() {
    let temp = TempDir::new().unwrap();
    let jar = fixtures::write_bundle_jar(&temp.path().join("m2/present-1.0.jar"), "present", "1.0")
        .unwrap();
    let session = session(&temp).with_dependency(dependency("present", "1.0", "compile", &jar));

    let build = |entry: &str| {
        let mut set = RepositorySet::new(None);
        set.add(ArtifactReference::parse(entry)).unwrap();
        TrackerManager::builder()
            .with_repository_system(Box::new(InMemoryRepository::new()))
            .with_cache_directory(temp.path().join("cache"))
            .with_repository_set(set)
            .filtering()
            .remote_index()
            .operational()
            .build()
            .unwrap()
    };

    let mut matched = build("com.acme:present");
    matched.resolve_all(&session).unwrap();
    assert_eq!(matched.tracker("present", "1.0").unwrap().version(), "1.0");

    let mut unmatched = build("com.acme:absent");
    let error = unmatched.resolve_all(&session).unwrap_err();
    assert!(resolution_error_coordinates(&error).contains("absent"));
}

#[test]
fn test_workspace_manifest_without_bundle_version_is_skipped() {
    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("half");
    let classes = project_dir.join("target/classes");
    std::fs::create_dir_all(classes.join("META-INF")).unwrap();
    std::fs::write(
        classes.join("META-INF/MANIFEST.MF"),
        "Manifest-Version: 1.0\r\nBundle-SymbolicName: com.acme.half\r\n\r\n",
    )
    .unwrap();

    let half = coordinates("half", "1.0").with_type("bundle");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(half.clone(), "compile"))
        .with_workspace_project(WorkspaceProject::new(half, &project_dir));

    let mut manager = manager(InMemoryRepository::new(), temp.path());
    manager.resolve_all(&session).unwrap();
    assert!(manager.is_empty());
}

#[test]
fn test_workspace_bundle_keeps_manifest_sections() {
    use std::io::Read;

    let temp = TempDir::new().unwrap();
    let project_dir = temp.path().join("foo");
    let classes = fixtures::create_workspace_bundle(&project_dir, "com.acme.foo", "1.0.0").unwrap();
    let manifest = "Manifest-Version: 1.0\r\n\
                    Bundle-ManifestVersion: 2\r\n\
                    Bundle-SymbolicName: com.acme.foo\r\n\
                    Bundle-Version: 1.0.0\r\n\
                    \r\n\
                    Name: com/acme/Activator.class\r\n\
                    SHA-256-Digest: q1w2e3r4t5y6u7i8o9p0\r\n\
                    \r\n";
    std::fs::write(classes.join("META-INF/MANIFEST.MF"), manifest).unwrap();

    let foo = coordinates("foo", "1.0").with_type("bundle");
    let session = session(&temp)
        .with_dependency(ResolvedArtifact::new(foo.clone(), "compile"))
        .with_workspace_project(WorkspaceProject::new(foo, &project_dir));

    let mut manager = manager(InMemoryRepository::new(), &temp.path().join("cache"));
    manager.resolve_all(&session).unwrap();
    let report = manager.cache_all().unwrap();
    assert!(report.is_success());

    let tracker = manager.tracker("foo", "1.0").unwrap();
    let file = std::fs::File::open(tracker.cached_file()).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    assert_eq!(archive.by_index(0).unwrap().name(), "META-INF/MANIFEST.MF");
    let mut packed = String::new();
    archive.by_name("META-INF/MANIFEST.MF").unwrap().read_to_string(&mut packed).unwrap();
    assert_eq!(packed, manifest);
}

#[test]
fn test_remote_index_unpacked_plugin_is_copied() {
    let temp = TempDir::new().unwrap();
    let p2 = temp.path().join("p2");
    let plugin = p2.join("plugins/org.acme.help_1.0");
    std::fs::create_dir_all(plugin.join("META-INF")).unwrap();
    std::fs::write(
        plugin.join("META-INF/MANIFEST.MF"),
        fixtures::bundle_manifest("org.acme.help", "1.0"),
    )
    .unwrap();
    std::fs::create_dir_all(plugin.join("html")).unwrap();
    std::fs::write(plugin.join("html/index.html"), "<html></html>").unwrap();

    let mut set = RemoteIndexSet::new(Some(path_to_file_url(&p2)), None);
    set.add(ArtifactReference {
        artifact_id: "org.acme.help".to_string(),
        version: Some("1.0".to_string()),
        url: Some(path_to_file_url(&plugin)),
        copy_name: Some("org.acme.help_1.0".to_string()),
        ..ArtifactReference::default()
    })
    .unwrap();

    let mut manager = TrackerManager::builder()
        .with_repository_system(Box::new(InMemoryRepository::new()))
        .with_cache_directory(temp.path().join("cache"))
        .filtering()
        .remote_index()
        .with_remote_index_set(set)
        .operational()
        .build()
        .unwrap();
    assert_eq!(manager.resolve_remote_index_artifacts().unwrap(), 1);

    let report = manager.copy_remote_index_artifacts_to_cache().unwrap();
    assert_eq!(report.downloaded, 1);
    let cached = temp.path().join("cache/org.acme.help_1.0");
    assert!(cached.join("META-INF/MANIFEST.MF").is_file());
    assert!(cached.join("html/index.html").is_file());
    assert!(manager.tracker("org.acme.help", "1.0").unwrap().is_cached());
}
