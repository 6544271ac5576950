use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::intake::router::{intake_router, save_handler, submit_handler};
use crate::intake::service::IntakeService;
use crate::intake::storage::UploadPolicy;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request builds")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

#[tokio::test]
async fn submit_handler_rejects_thin_application() {
    let (service, _, _) = build_service();

    let response = submit_handler::<MemoryRepository, MemoryStore>(
        State(Arc::new(service)),
        axum::Json(thin_document()),
    )
    .await;

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(payload["completed"], json!(2));
    assert_eq!(payload["required"], json!(3));
}

#[tokio::test]
async fn save_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(IntakeService::new(
        Arc::new(UnavailableRepository),
        Arc::new(MemoryStore::default()),
        UploadPolicy::default(),
    ));

    let response = save_handler::<UnavailableRepository, MemoryStore>(
        State(service),
        axum::Json(thin_document()),
    )
    .await;

    assert_status(&response, StatusCode::INTERNAL_SERVER_ERROR);
    let payload = read_json_body(response).await;
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("database offline"));
}

#[tokio::test]
async fn criteria_endpoint_lists_every_schema() {
    let (service, _, _) = build_service();
    let response = intake_router(Arc::new(service))
        .oneshot(get("/api/v1/criteria"))
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["minimumCriteria"], json!(3));
    assert_eq!(payload["steps"].as_array().expect("steps").len(), 12);
    let criteria = payload["criteria"].as_array().expect("criteria");
    assert_eq!(criteria.len(), 10);
    assert_eq!(criteria[0]["criterion"], json!("awards"));
}

#[tokio::test]
async fn apply_endpoint_reports_missing_required_fields() {
    let (service, _, _) = build_service();
    let document = serde_json::to_value(thin_document()).expect("serialize");

    let response = intake_router(Arc::new(service))
        .oneshot(json_request(
            "POST",
            "/api/v1/forms/apply",
            json!({
                "document": document,
                "action": {
                    "type": "add_entry",
                    "criterion": "scholarlyArticles",
                    "entry": { "fields": { "articleTitle": "Compilers" } }
                }
            }),
        ))
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
    let payload = read_json_body(response).await;
    assert_eq!(
        payload["fields"],
        json!(["Journal Name", "Publication Date", "Authors", "Abstract"])
    );
}

#[tokio::test]
async fn save_then_load_through_router() {
    let (service, _, _) = build_service();
    let router = intake_router(Arc::new(service));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/forms",
            serde_json::to_value(ready_document()).expect("serialize"),
        ))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let saved = read_json_body(response).await;
    let id = saved["id"].as_str().expect("id assigned").to_string();
    assert_eq!(saved["status"], json!("draft"));

    let response = router
        .clone()
        .oneshot(get(&format!("/api/v1/forms/{id}")))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let loaded = read_json_body(response).await;
    assert_eq!(loaded["fullName"], json!("Grace Hopper"));
    assert_eq!(loaded["awards"].as_array().expect("awards").len(), 1);

    let response = router
        .oneshot(get("/api/v1/forms/unknown-form"))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn upload_endpoint_guesses_type_from_file_name() {
    let (service, _, store) = build_service();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/uploads?criterion=leadingRoles&fileName=org%20chart.png")
        .body(Body::from(vec![0_u8; 64]))
        .expect("request builds");
    let response = intake_router(Arc::new(service))
        .oneshot(request)
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::CREATED);
    let payload = read_json_body(response).await;
    let path = payload["path"].as_str().expect("path");
    assert!(path.starts_with("drafts/leadingRoles/"));
    assert!(path.ends_with("-org_chart.png"));
    assert_eq!(payload["size"], json!(64));
    assert_eq!(store.objects()[0].content_type, "image/png");
}

#[tokio::test]
async fn upload_endpoint_rejects_unsupported_type() {
    let (service, _, store) = build_service();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/uploads?criterion=awards&fileName=notes.txt")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("plain text"))
        .expect("request builds");
    let response = intake_router(Arc::new(service))
        .oneshot(request)
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(store.objects().is_empty());
}

#[tokio::test]
async fn upload_endpoint_rejects_bodies_over_the_size_limit() {
    let (service, _, store) = build_service();
    let max_bytes = usize::try_from(service.policy().max_bytes()).expect("limit fits");
    let router = intake_router(Arc::new(service));

    for size in [max_bytes + 1, max_bytes + 64 * 1024] {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/uploads?criterion=awards&fileName=scan.pdf")
            .header(header::CONTENT_TYPE, "application/pdf")
            .body(Body::from(vec![0_u8; size]))
            .expect("request builds");
        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router responds");

        assert_status(&response, StatusCode::PAYLOAD_TOO_LARGE);
    }
    assert!(store.objects().is_empty());
}

#[tokio::test]
async fn admin_export_sets_download_headers() {
    let (service, _, _) = build_service();
    let saved = service.save_progress(&ready_document()).expect("saved");
    service.submit(&saved).expect("submitted");

    let response = intake_router(Arc::new(service))
        .oneshot(get("/api/v1/admin/export?status=submitted"))
        .await
        .expect("router responds");

    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .expect("ascii header")
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"eb1a-applications-submitted-"));

    let body = read_text_body(response).await;
    assert_eq!(body.lines().count(), 2);
    assert!(body.contains("Grace Hopper"));
}

#[tokio::test]
async fn admin_forms_endpoint_applies_search() {
    let (service, _, _) = build_service();
    service.save_progress(&thin_document()).expect("saved");

    let router = intake_router(Arc::new(service));
    let response = router
        .clone()
        .oneshot(get("/api/v1/admin/forms?status=submitted"))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    assert_eq!(read_json_body(response).await, json!([]));

    let response = router
        .clone()
        .oneshot(get("/api/v1/admin/forms?status=submitted&search=HOPPER"))
        .await
        .expect("router responds");
    assert_status(&response, StatusCode::OK);
    let rows = read_json_body(response).await;
    assert_eq!(rows.as_array().expect("rows").len(), 1);
    assert_eq!(rows[0]["status"], json!("draft"));
    assert_eq!(rows[0]["entryCounts"]["awards"], json!(1));

    let response = router
        .oneshot(get("/api/v1/admin/stats"))
        .await
        .expect("router responds");
    let stats = read_json_body(response).await;
    assert_eq!(stats, json!({ "total": 1, "submitted": 0, "draft": 1 }));
}
