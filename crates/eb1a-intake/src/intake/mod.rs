//! EB1A evidence intake: the per-criterion entry manager, the form document
//! reducer, persistence, evidence uploads, and the admin dashboard exports.

pub mod admin;
pub mod domain;
pub mod entries;
pub mod export;
pub mod form;
pub mod repository;
pub mod router;
pub mod schema;
pub mod service;
pub mod storage;

#[cfg(test)]
mod tests;

pub use admin::{DashboardStats, FormSummary, StatusFilter, SummaryQuery};
pub use domain::{
    ApplicantDetails, CriteriaCollections, Criterion, EntryDraft, EntryId, EntryRecord,
    FormDocument, FormId, FormStatus,
};
pub use entries::CriterionEntries;
pub use export::{CsvExport, ExportError, ExportKind, ExportQuery};
pub use form::{FormAction, FormError, SubmissionReadiness, MINIMUM_CRITERIA};
pub use repository::{FormRepository, RepositoryError, StoredForm};
pub use router::intake_router;
pub use schema::{schema_for, CriterionSchema};
pub use service::{IntakeService, IntakeServiceError};
pub use storage::{
    LocalDirectoryStore, ObjectStore, StorageError, UploadPolicy, UploadRequest, UploadedFile,
};
