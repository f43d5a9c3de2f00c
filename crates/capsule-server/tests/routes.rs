//! Route behavior through the full router.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use capsule_core::{CapsuleInstance, ProjectSpec, ScreenSpec};
use capsule_server::{create_router, http::AppState, state_with_projects, Config};
use indexmap::IndexMap;
use serde_json::{json, Value};
use tower::ServiceExt;

fn state() -> AppState {
    let project = ProjectSpec::new("Recipe Box", "0.9.0").with_screen(ScreenSpec::new(
        "home",
        "Home",
        CapsuleInstance::new("t", "heading").with_prop("text", "Recipes"),
    ));
    let mut projects = IndexMap::new();
    projects.insert("recipes".to_string(), project);
    state_with_projects(&Config::default(), projects)
}

fn app() -> Router {
    create_router(state())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "ok");
}

#[tokio::test]
async fn export_partial_success_is_200() {
    let response = app()
        .oneshot(post_json(
            "/v1/projects/recipes/export",
            json!({ "targets": [{ "platform": "ios" }, { "platform": "desktop" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["summary"]["totalPlatforms"], 2);
    assert_eq!(body["summary"]["successfulPlatforms"], json!(["ios"]));
    assert_eq!(body["summary"]["failedPlatforms"], json!(["desktop"]));
    assert_eq!(
        body["exports"][0]["downloadUrl"],
        "http://localhost:8080/v1/blobs/recipes/recipe-box-ios-v0.9.0.zip"
    );
}

#[tokio::test]
async fn export_all_failed_is_500() {
    let response = app()
        .oneshot(post_json(
            "/v1/projects/recipes/export",
            json!({ "targets": [{ "platform": "desktop" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json(response).await;
    assert_eq!(body["exports"][0]["success"], false);
}

#[tokio::test]
async fn export_validation_failure_is_400() {
    let response = app()
        .oneshot(post_json(
            "/v1/projects/recipes/export",
            json!({ "targets": [{ "platform": "android", "options": { "packageName": "com.recipes.app", "minSdk": 20 } }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error"], "validation_failed");
    assert_eq!(body["details"][0]["field"], "targets[0].options.minSdk");
}

#[tokio::test]
async fn malformed_json_is_400() {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/projects/recipes/export")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["details"][0]["field"], "body");
}

#[tokio::test]
async fn unknown_project_is_404() {
    let response = app()
        .oneshot(post_json(
            "/v1/projects/nope/export",
            json!({ "targets": [{ "platform": "ios" }] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(response).await["error"], "not_found");
}

#[tokio::test]
async fn exported_archive_is_downloadable() {
    let app = app();
    let response = app
        .clone()
        .oneshot(post_json(
            "/v1/projects/recipes/export",
            json!({ "targets": [{ "platform": "android" }] }),
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    let size = body["exports"][0]["totalSize"].as_u64().unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/v1/blobs/recipes/recipe-box-android-v0.9.0.zip")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/zip");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"recipe-box-android-v0.9.0.zip\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.len() as u64, size);
}

#[tokio::test]
async fn missing_blob_is_404() {
    let response = app()
        .oneshot(Request::builder().uri("/v1/blobs/none.zip").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn generate_returns_files_inline() {
    let project = json!({
        "name": "Inline",
        "version": "1.0.0",
        "targets": ["web", "ios"],
        "screens": [{
            "id": "main",
            "name": "Main",
            "root": { "id": "b", "capsuleId": "button", "props": { "label": "Go" } }
        }]
    });
    let response = app().oneshot(post_json("/v1/generate", project)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["platforms"][0]["platform"], "web");
    assert_eq!(body["platforms"][1]["platform"], "ios");
    let files = body["platforms"][0]["files"].as_array().unwrap();
    assert!(files.iter().any(|f| f["path"] == "src/screens/MainScreen.tsx"));
}

#[tokio::test]
async fn generate_rejects_bad_project() {
    let response = app()
        .oneshot(post_json("/v1/generate", json!({ "name": 42 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
