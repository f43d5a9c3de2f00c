//! End-to-end export behavior over in-memory collaborators.

use std::io::{Cursor, Read};
use std::sync::Arc;

use capsule_core::{CapsuleInstance, Platform, ProjectSpec, ScreenSpec};
use capsule_export::{
    ExportError, ExportService, ExportStatus, InMemoryBlobStorage, InMemoryProjectStore,
    StaticCapsuleRegistry,
};
use serde_json::json;
use zip::ZipArchive;

const BLOB_BASE: &str = "http://localhost:8080/v1/blobs";

fn fitness_project() -> ProjectSpec {
    let dashboard = CapsuleInstance::new("root", "stack")
        .with_child(CapsuleInstance::new("title", "heading").with_prop("text", "Today"))
        .with_child(
            CapsuleInstance::new("steps", "progress")
                .with_prop("value", 0.62)
                .with_prop("label", "Steps"),
        )
        .with_child(CapsuleInstance::new("start", "button").with_prop("label", "Start workout"));
    let history = CapsuleInstance::new("root", "list")
        .with_prop("items", json!(["Mon: 5k", "Wed: 8k"]));

    ProjectSpec::new("Fit Track", "1.4.0")
        .with_screen(ScreenSpec::new("dashboard", "Dashboard", dashboard))
        .with_screen(ScreenSpec::new("history", "History", history))
}

fn setup() -> (ExportService, Arc<InMemoryBlobStorage>) {
    let store = InMemoryProjectStore::new();
    store.insert("fit", fitness_project()).unwrap();
    let blobs = Arc::new(InMemoryBlobStorage::new(BLOB_BASE));
    let service = ExportService::new(
        Arc::new(store),
        Arc::new(StaticCapsuleRegistry::default()),
        blobs.clone(),
    );
    (service, blobs)
}

#[test]
fn invalid_android_target_fails_alone() {
    let (service, blobs) = setup();
    let outcome = service
        .export(
            "fit",
            &json!({
                "targets": [
                    { "platform": "ios", "options": { "bundleId": "com.fittrack.app" } },
                    { "platform": "android", "options": { "packageName": "fittrack" } }
                ]
            }),
        )
        .unwrap();

    assert_eq!(outcome.status, ExportStatus::Ok);
    let response = &outcome.response;
    assert!(!response.success);
    assert_eq!(response.exports.len(), 2);

    let ios = &response.exports[0];
    assert!(ios.success);
    assert!(ios.download_url.is_some());

    let android = &response.exports[1];
    assert!(!android.success);
    assert!(android.download_url.is_none());
    let errors = android.errors.as_ref().unwrap();
    assert!(!errors.is_empty());
    assert!(errors[0].contains("packageName"));

    assert_eq!(response.summary.failed_platforms, vec![Platform::Android]);
    assert_eq!(response.summary.successful_platforms, vec![Platform::Ios]);
    assert_eq!(response.summary.total_size, ios.total_size);
    assert_eq!(blobs.names(), vec!["fit/fit-track-ios-v1.4.0.zip"]);
}

#[test]
fn below_floor_min_sdk_rejects_whole_request() {
    let (service, blobs) = setup();
    let err = service
        .export(
            "fit",
            &json!({
                "targets": [
                    { "platform": "ios" },
                    { "platform": "android", "options": { "packageName": "com.fittrack.app", "minSdk": 20 } }
                ]
            }),
        )
        .unwrap_err();

    let ExportError::Validation(errors) = err else {
        panic!("expected a validation error, got {err}");
    };
    assert_eq!(errors[0].field, "targets[1].options.minSdk");
    assert!(blobs.names().is_empty());
}

#[test]
fn mixed_results_with_unavailable_desktop_compiler() {
    let (service, blobs) = setup();
    let outcome = service
        .export(
            "fit",
            &json!({
                "targets": [
                    { "platform": "ios", "options": { "bundleId": "com.fittrack.app" } },
                    { "platform": "android", "options": { "packageName": "com.fittrack.app" } },
                    { "platform": "desktop" }
                ]
            }),
        )
        .unwrap();

    assert_eq!(outcome.status, ExportStatus::Ok);
    let response = &outcome.response;
    assert!(!response.success);
    assert_eq!(response.exports.len(), 3);
    assert!(response.exports[0].success);
    assert!(response.exports[1].success);

    let desktop = &response.exports[2];
    assert_eq!(desktop.platform, Platform::Desktop);
    assert!(!desktop.success);
    assert!(desktop.errors.as_ref().unwrap()[0].contains("compiler not available"));

    assert_eq!(response.summary.total_platforms, 3);
    assert_eq!(response.summary.successful_platforms, vec![Platform::Ios, Platform::Android]);
    assert_eq!(response.summary.failed_platforms, vec![Platform::Desktop]);
    assert_eq!(
        blobs.names(),
        vec!["fit/fit-track-ios-v1.4.0.zip", "fit/fit-track-android-v1.4.0.zip"]
    );
}

#[test]
fn reported_sizes_match_uploaded_archives() {
    let (service, blobs) = setup();
    let outcome = service
        .export(
            "fit",
            &json!({ "targets": [{ "platform": "ios" }, { "platform": "android" }] }),
        )
        .unwrap();

    let mut total = 0;
    for export in &outcome.response.exports {
        let url = export.download_url.as_deref().unwrap();
        let name = url.strip_prefix(&format!("{BLOB_BASE}/")).unwrap();
        let bytes = blobs.get(name).unwrap();
        assert_eq!(export.total_size, bytes.len() as u64);

        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(export.file_count, archive.len());
        total += export.total_size;
    }
    assert!(outcome.response.success);
    assert_eq!(outcome.response.summary.total_size, total);
}

#[test]
fn archive_contains_screens_and_scaffolding() {
    let (service, blobs) = setup();
    service
        .export(
            "fit",
            &json!({
                "targets": [{ "platform": "ios", "options": { "bundleId": "com.fittrack.app" } }],
                "includeReadme": false
            }),
        )
        .unwrap();

    let bytes = blobs.get("fit/fit-track-ios-v1.4.0.zip").unwrap();
    let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = archive.file_names().map(String::from).collect();
    assert!(names.contains(&"FitTrack/Screens/DashboardScreen.swift".to_string()));
    assert!(names.contains(&"FitTrack/Screens/HistoryScreen.swift".to_string()));
    assert!(names.contains(&".gitignore".to_string()));
    assert!(!names.contains(&"README.md".to_string()));

    let mut spec = String::new();
    archive
        .by_name("project.yml")
        .unwrap()
        .read_to_string(&mut spec)
        .unwrap();
    assert!(spec.contains("com.fittrack.app"));
}

#[test]
fn identical_requests_produce_identical_archives() {
    let request = json!({ "targets": [{ "platform": "android" }] });

    let (first, first_blobs) = setup();
    first.export("fit", &request).unwrap();
    let (second, second_blobs) = setup();
    second.export("fit", &request).unwrap();

    let name = "fit/fit-track-android-v1.4.0.zip";
    assert_eq!(first_blobs.get(name), second_blobs.get(name));
}

#[test]
fn unknown_project_is_not_found() {
    let (service, _) = setup();
    let err = service
        .export("missing", &json!({ "targets": [{ "platform": "ios" }] }))
        .unwrap_err();
    assert!(matches!(err, ExportError::ProjectNotFound(_)));
}

#[test]
fn same_named_projects_keep_separate_archives() {
    let shop = |greeting: &str| {
        ProjectSpec::new("Shop", "1.0.0").with_screen(ScreenSpec::new(
            "home",
            "Home",
            CapsuleInstance::new("t", "text").with_prop("text", greeting),
        ))
    };
    let store = InMemoryProjectStore::new();
    store.insert("a", shop("Welcome to A")).unwrap();
    store.insert("b", shop("Welcome to B")).unwrap();
    let blobs = Arc::new(InMemoryBlobStorage::new(BLOB_BASE));
    let service = ExportService::new(
        Arc::new(store),
        Arc::new(StaticCapsuleRegistry::default()),
        blobs.clone(),
    );

    let request = json!({ "targets": [{ "platform": "ios" }] });
    let a = service.export("a", &request).unwrap();
    let b = service.export("b", &request).unwrap();

    let a_url = a.response.exports[0].download_url.clone().unwrap();
    let b_url = b.response.exports[0].download_url.clone().unwrap();
    assert_ne!(a_url, b_url);
    assert_eq!(blobs.names(), vec!["a/shop-ios-v1.0.0.zip", "b/shop-ios-v1.0.0.zip"]);

    let mut archive = ZipArchive::new(Cursor::new(blobs.get("a/shop-ios-v1.0.0.zip").unwrap())).unwrap();
    let mut screen = String::new();
    archive
        .by_name("Shop/Screens/HomeScreen.swift")
        .unwrap()
        .read_to_string(&mut screen)
        .unwrap();
    assert!(screen.contains("Welcome to A"));
}
