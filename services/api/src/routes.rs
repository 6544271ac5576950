use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use axum::Json;
use eb1a_intake::intake::{intake_router, FormRepository, IntakeService, ObjectStore};
use serde_json::json;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::warn;

pub(crate) fn with_intake_routes<R, S>(service: Arc<IntakeService<R, S>>) -> axum::Router
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    intake_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/files/*path", axum::routing::get(uploaded_file))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Serves evidence written by the local upload store.
pub(crate) async fn uploaded_file(
    Extension(state): Extension<AppState>,
    Path(path): Path<String>,
) -> Response {
    let relative = path.trim_start_matches('/');
    if relative.is_empty() || relative.split('/').any(|segment| segment == "..") {
        return not_found();
    }

    let target = state.upload_root.join(relative);
    match tokio::fs::read(&target).await {
        Ok(bytes) => {
            let content_type = mime_guess::from_path(&target).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, content_type.to_string())],
                bytes,
            )
                .into_response()
        }
        Err(err) if err.kind() == ErrorKind::NotFound => not_found(),
        Err(err) => {
            warn!(path = %relative, error = %err, "failed to read uploaded file");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "unable to read file" })),
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "file not found" })),
    )
        .into_response()
}
