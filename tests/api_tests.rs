//! HTTP API integration tests
//!
//! Router-level tests against an app state wired with real (but never
//! invoked) provider clients. Nothing here touches the network: the
//! endpoints exercised either read local state or reject bad input.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use isbn_enrich::enrich::Enricher;
use isbn_enrich::events::EventBus;
use isbn_enrich::models::EnrichmentSession;
use isbn_enrich::providers::{GoogleBooksClient, IsbndbClient, SerpClient};
use isbn_enrich::{build_router, AppState};

fn test_app_state() -> AppState {
    let enricher = Enricher::new(
        SerpClient::new("test-serp-key".to_string()).unwrap(),
        IsbndbClient::new("test-isbndb-key".to_string()).unwrap(),
        GoogleBooksClient::new().unwrap(),
    );
    AppState::new(enricher, EventBus::new(100))
}

#[tokio::test]
async fn health_reports_ok() {
    let state = test_app_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["active_sessions"], 0);
}

#[tokio::test]
async fn status_for_unknown_session_is_404() {
    let state = test_app_state();
    let app = build_router(state);

    let uri = format!("/enrich/status/{}", Uuid::new_v4());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn download_for_unknown_session_is_404() {
    let state = test_app_state();
    let app = build_router(state);

    let uri = format!("/enrich/download/{}", Uuid::new_v4());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_while_processing_is_409() {
    let state = test_app_state();

    // Register a session that has not finished yet.
    let session = EnrichmentSession::new(10);
    let session_id = session.session_id;
    state.sessions.write().await.insert(session_id, session);

    let app = build_router(state);

    let uri = format!("/enrich/download/{}", session_id);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn completed_session_downloads_workbook_with_attachment_headers() {
    let state = test_app_state();

    let mut session = EnrichmentSession::new(1);
    let session_id = session.session_id;
    let workbook = isbn_enrich::spreadsheet::write_workbook(&[]).unwrap();
    session.update_progress(1);
    session.complete(workbook.clone());
    state.sessions.write().await.insert(session_id, session);

    let app = build_router(state);

    let uri = format!("/enrich/download/{}", session_id);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response.headers().get("content-disposition").unwrap(),
        "attachment; filename=\"isbn_output.xlsx\""
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(body.to_vec(), workbook);
}

#[tokio::test]
async fn enrich_without_multipart_body_is_rejected() {
    let state = test_app_state();
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/enrich")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(
        response.status().is_client_error(),
        "non-multipart POST must be rejected, got {}",
        response.status()
    );
}

#[tokio::test]
async fn status_reflects_registered_session_progress() {
    let state = test_app_state();

    let mut session = EnrichmentSession::new(50);
    session.update_progress(25);
    let session_id = session.session_id;
    state.sessions.write().await.insert(session_id, session);

    let app = build_router(state);

    let uri = format!("/enrich/status/{}", session_id);
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["state"], "PROCESSING");
    assert_eq!(json["progress"]["completed"], 25);
    assert_eq!(json["progress"]["total"], 50);
    assert_eq!(json["progress"]["fraction"], 0.5);
    assert_eq!(json["progress"]["message"], "Processed 25/50 ISBNs");
    // The workbook never leaks through the status endpoint.
    assert!(json.get("workbook").is_none());
}
