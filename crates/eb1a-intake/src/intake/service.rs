use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use tracing::{info, warn};

use super::admin::{filter_summaries, DashboardStats, FormSummary, SummaryQuery};
use super::domain::{ApplicantDetails, FormDocument, FormId, FormStatus};
use super::export::{
    entries_csv, export_file_name, summaries_csv, CsvExport, ExportError, ExportKind, ExportQuery,
};
use super::form::{FormAction, FormError};
use super::repository::{FormRepository, RepositoryError, StoredForm};
use super::storage::{
    object_path, ObjectStore, StorageError, UploadPolicy, UploadRequest, UploadedFile,
};

/// Service composing the form reducer, repository, and object store.
pub struct IntakeService<R, S> {
    repository: Arc<R>,
    store: Arc<S>,
    policy: UploadPolicy,
}

impl<R, S> IntakeService<R, S>
where
    R: FormRepository + 'static,
    S: ObjectStore + 'static,
{
    pub fn new(repository: Arc<R>, store: Arc<S>, policy: UploadPolicy) -> Self {
        Self {
            repository,
            store,
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// New, unsaved draft for the applicant entered on the welcome step.
    pub fn start(
        &self,
        full_name: &str,
        email: &str,
    ) -> Result<FormDocument, IntakeServiceError> {
        let applicant = ApplicantDetails::new(full_name, email)?;
        Ok(FormDocument::new(applicant))
    }

    pub fn apply(
        &self,
        document: FormDocument,
        action: FormAction,
    ) -> Result<FormDocument, IntakeServiceError> {
        Ok(document.apply(action)?)
    }

    /// Persist the document as a draft, assigning an id on first save.
    pub fn save_progress(
        &self,
        document: &FormDocument,
    ) -> Result<FormDocument, IntakeServiceError> {
        if document.is_submitted() {
            return Err(FormError::AlreadySubmitted.into());
        }

        let saved = self.persist(document, FormStatus::Draft)?;
        info!(form_id = ?saved.id, entries = saved.collections.total_entries(), "form progress saved");
        Ok(saved)
    }

    /// Mark the document submitted once it covers enough criteria.
    pub fn submit(&self, document: &FormDocument) -> Result<FormDocument, IntakeServiceError> {
        if document.is_submitted() {
            return Err(FormError::AlreadySubmitted.into());
        }

        let readiness = document.readiness();
        if !readiness.ready {
            warn!(
                form_id = ?document.id,
                completed = readiness.completed,
                "submission refused: not enough criteria"
            );
            return Err(IntakeServiceError::InsufficientCriteria {
                completed: readiness.completed,
                required: readiness.required,
            });
        }

        let submitted = self.persist(document, FormStatus::Submitted)?;
        info!(form_id = ?submitted.id, criteria = readiness.completed, "application submitted");
        Ok(submitted)
    }

    pub fn load(&self, id: &FormId) -> Result<FormDocument, IntakeServiceError> {
        let record = self
            .repository
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record.to_document()?)
    }

    /// Store an evidence file and return where it can be fetched from.
    pub fn upload(&self, request: UploadRequest) -> Result<UploadedFile, IntakeServiceError> {
        if request.file_name.trim().is_empty() {
            return Err(StorageError::EmptyFileName.into());
        }

        let size = request.bytes.len() as u64;
        if let Err(err) = self.policy.check(size, &request.content_type) {
            warn!(file = %request.file_name, size, error = %err, "upload rejected");
            return Err(err.into());
        }

        let path = object_path(&request, Utc::now().timestamp_millis());
        let url = self
            .store
            .upload(&path, &request.bytes, &request.content_type)?;
        info!(%path, size, criterion = %request.criterion, "evidence uploaded");

        Ok(UploadedFile { path, url, size })
    }

    pub fn list_summaries(
        &self,
        query: &SummaryQuery,
    ) -> Result<Vec<FormSummary>, IntakeServiceError> {
        let summaries = self
            .repository
            .list()?
            .iter()
            .map(FormSummary::from_stored)
            .collect();
        Ok(filter_summaries(summaries, query))
    }

    pub fn stats(&self) -> Result<DashboardStats, IntakeServiceError> {
        let summaries = self.list_summaries(&SummaryQuery::default())?;
        Ok(DashboardStats::from_summaries(&summaries))
    }

    pub fn export(&self, query: &ExportQuery) -> Result<CsvExport, IntakeServiceError> {
        let summaries = self.list_summaries(&SummaryQuery {
            status: query.status,
            search: None,
        })?;
        let file_name = export_file_name(query.status, query.kind, Utc::now().date_naive());

        let (bytes, rows) = match query.kind {
            ExportKind::Summary => (summaries_csv(&summaries)?, summaries.len()),
            ExportKind::Entries => {
                let documents = summaries
                    .iter()
                    .map(|summary| self.load(&summary.id))
                    .collect::<Result<Vec<_>, _>>()?;
                entries_csv(&documents)?
            }
        };

        info!(%file_name, rows, "applications exported");
        Ok(CsvExport {
            file_name,
            rows,
            bytes,
        })
    }

    fn persist(
        &self,
        document: &FormDocument,
        status: FormStatus,
    ) -> Result<FormDocument, IntakeServiceError> {
        let now = Utc::now();
        let mut next = document.clone();
        next.status = status;
        if status == FormStatus::Submitted {
            next.submitted_at = Some(now);
        }

        match &document.id {
            None => {
                next.id = Some(FormId::generate());
                next.created_at = Some(now);
                next.updated_at = None;
                self.repository.insert(StoredForm::from_document(&next)?)?;
            }
            Some(id) => {
                let existing = self
                    .repository
                    .fetch(id)?
                    .ok_or(RepositoryError::NotFound)?;
                if existing.status == FormStatus::Submitted {
                    return Err(FormError::AlreadySubmitted.into());
                }
                next.created_at = Some(existing.created_at);
                next.updated_at = Some(now);
                self.repository.update(StoredForm::from_document(&next)?)?;
            }
        }

        Ok(next)
    }
}

/// Error raised by the intake service.
#[derive(Debug, thiserror::Error)]
pub enum IntakeServiceError {
    #[error(transparent)]
    Form(#[from] FormError),
    #[error("only {completed} of the minimum {required} criteria have evidence")]
    InsufficientCriteria { completed: usize, required: usize },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl IntakeServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            IntakeServiceError::Form(FormError::AlreadySubmitted) => StatusCode::CONFLICT,
            IntakeServiceError::Form(FormError::EntryNotFound { .. }) => StatusCode::NOT_FOUND,
            IntakeServiceError::Form(_) | IntakeServiceError::InsufficientCriteria { .. } => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            IntakeServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
            IntakeServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            IntakeServiceError::Repository(_) | IntakeServiceError::Export(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            IntakeServiceError::Storage(StorageError::TooLarge { .. }) => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            IntakeServiceError::Storage(StorageError::UnsupportedType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            IntakeServiceError::Storage(StorageError::EmptyFileName) => StatusCode::BAD_REQUEST,
            IntakeServiceError::Storage(StorageError::Transport(_)) => StatusCode::BAD_GATEWAY,
        }
    }
}
