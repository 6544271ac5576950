use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mime::Mime;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::admin::SummaryQuery;
use super::domain::{ApplicantDetails, Criterion, FormDocument, FormId};
use super::export::{ExportQuery, CSV_CONTENT_TYPE};
use super::form::{FormAction, FormError, SubmissionReadiness, MINIMUM_CRITERIA};
use super::repository::FormRepository;
use super::schema::{all_schemas, CriterionSchema, WIZARD_STEPS};
use super::service::{IntakeService, IntakeServiceError};
use super::storage::{ObjectStore, StorageError, UploadRequest};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CriteriaResponse {
    pub(crate) steps: &'static [&'static str],
    pub(crate) minimum_criteria: usize,
    pub(crate) criteria: Vec<&'static CriterionSchema>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApplyRequest {
    pub(crate) document: FormDocument,
    pub(crate) action: FormAction,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadParams {
    pub(crate) criterion: Criterion,
    pub(crate) file_name: String,
    #[serde(default)]
    pub(crate) form_id: Option<FormId>,
}

/// Router builder exposing the wizard, upload, and admin endpoints.
pub fn intake_router<R, S>(service: Arc<IntakeService<R, S>>) -> Router
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    let upload_limit = usize::try_from(service.policy().max_bytes().saturating_add(1))
        .unwrap_or(usize::MAX);

    Router::new()
        .route("/api/v1/criteria", get(criteria_handler))
        .route("/api/v1/forms", post(save_handler::<R, S>))
        .route("/api/v1/forms/start", post(start_handler::<R, S>))
        .route("/api/v1/forms/apply", post(apply_handler::<R, S>))
        .route("/api/v1/forms/readiness", post(readiness_handler))
        .route("/api/v1/forms/submit", post(submit_handler::<R, S>))
        .route("/api/v1/forms/:form_id", get(load_handler::<R, S>))
        .route(
            "/api/v1/uploads",
            post(upload_handler::<R, S>).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/admin/forms", get(summaries_handler::<R, S>))
        .route("/api/v1/admin/stats", get(stats_handler::<R, S>))
        .route("/api/v1/admin/export", get(export_handler::<R, S>))
        .with_state(service)
}

pub(crate) fn error_response(error: IntakeServiceError) -> Response {
    let status = error.status_code();
    let mut payload = json!({ "error": error.to_string() });
    match &error {
        IntakeServiceError::Form(FormError::MissingRequiredFields { fields, .. }) => {
            payload["fields"] = json!(fields);
        }
        IntakeServiceError::InsufficientCriteria {
            completed,
            required,
        } => {
            payload["completed"] = json!(completed);
            payload["required"] = json!(required);
        }
        _ => {}
    }
    (status, Json(payload)).into_response()
}

pub(crate) async fn criteria_handler() -> Json<CriteriaResponse> {
    Json(CriteriaResponse {
        steps: &WIZARD_STEPS,
        minimum_criteria: MINIMUM_CRITERIA,
        criteria: all_schemas(),
    })
}

pub(crate) async fn readiness_handler(
    Json(document): Json<FormDocument>,
) -> Json<SubmissionReadiness> {
    Json(document.readiness())
}

pub(crate) async fn start_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Json(applicant): Json<ApplicantDetails>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.start(&applicant.full_name, &applicant.email) {
        Ok(document) => (StatusCode::CREATED, Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn apply_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Json(request): Json<ApplyRequest>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.apply(request.document, request.action) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Json(document): Json<FormDocument>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.save_progress(&document) {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Json(document): Json<FormDocument>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.submit(&document) {
        Ok(submitted) => (StatusCode::OK, Json(submitted)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn load_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Path(form_id): Path<String>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.load(&FormId(form_id)) {
        Ok(document) => (StatusCode::OK, Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn upload_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<Mime>().ok())
        .filter(|value| value.essence_str() != mime::APPLICATION_OCTET_STREAM.essence_str())
        .unwrap_or_else(|| mime_guess::from_path(&params.file_name).first_or_octet_stream());

    let request = UploadRequest {
        form_id: params.form_id,
        criterion: params.criterion,
        file_name: params.file_name,
        content_type,
        bytes: body.to_vec(),
    };

    // Stores may do blocking file or network IO.
    let outcome = tokio::task::spawn_blocking(move || service.upload(request))
        .await
        .unwrap_or_else(|err| {
            Err(IntakeServiceError::Storage(StorageError::Transport(format!(
                "upload task failed: {err}"
            ))))
        });

    match outcome {
        Ok(uploaded) => (StatusCode::CREATED, Json(uploaded)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn summaries_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Query(query): Query<SummaryQuery>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.list_summaries(&query) {
        Ok(summaries) => (StatusCode::OK, Json(summaries)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn stats_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.stats() {
        Ok(stats) => (StatusCode::OK, Json(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R, S>(
    State(service): State<Arc<IntakeService<R, S>>>,
    Query(query): Query<ExportQuery>,
) -> Response
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    match service.export(&query) {
        Ok(export) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", export.file_name),
                ),
            ],
            export.bytes,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}
