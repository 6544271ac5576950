use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::http::StatusCode;
use axum::response::Response;
use mime::Mime;
use serde_json::Value;

use crate::intake::domain::{ApplicantDetails, Criterion, EntryDraft, FormDocument, FormId};
use crate::intake::form::FormAction;
use crate::intake::repository::{FormRepository, RepositoryError, StoredForm};
use crate::intake::service::IntakeService;
use crate::intake::storage::{ObjectStore, StorageError, UploadPolicy};

pub(super) fn applicant() -> ApplicantDetails {
    ApplicantDetails::new("Grace Hopper", "grace@example.org").expect("valid applicant")
}

pub(super) fn award_draft() -> EntryDraft {
    EntryDraft::from_fields([
        ("awardName", "Computer Sciences Man of the Year"),
        ("dateReceived", "1969-05-01"),
        ("awardingOrganization", "Data Processing Management Association"),
    ])
}

pub(super) fn membership_draft() -> EntryDraft {
    EntryDraft::from_fields([
        ("associationName", "National Academy of Engineering"),
        ("memberSince", "1973-01-01"),
    ])
}

pub(super) fn publication_draft() -> EntryDraft {
    EntryDraft::from_fields([
        ("publicationTitle", "The Woman Who Taught Computers English"),
        ("publicationDate", "1984-06-01"),
        ("publisherName", "Computerworld"),
    ])
}

pub(super) fn add(criterion: Criterion, entry: EntryDraft) -> FormAction {
    FormAction::AddEntry { criterion, entry }
}

/// Draft covering awards, memberships, and published material.
pub(super) fn ready_document() -> FormDocument {
    FormDocument::new(applicant())
        .apply(add(Criterion::Awards, award_draft()))
        .and_then(|doc| doc.apply(add(Criterion::Memberships, membership_draft())))
        .and_then(|doc| doc.apply(add(Criterion::PublishedMaterials, publication_draft())))
        .expect("fixture actions apply")
}

/// Draft with evidence for only two criteria.
pub(super) fn thin_document() -> FormDocument {
    FormDocument::new(applicant())
        .apply(add(Criterion::Awards, award_draft()))
        .and_then(|doc| doc.apply(add(Criterion::Memberships, membership_draft())))
        .expect("fixture actions apply")
}

pub(super) fn build_service() -> (
    IntakeService<MemoryRepository, MemoryStore>,
    Arc<MemoryRepository>,
    Arc<MemoryStore>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let store = Arc::new(MemoryStore::default());
    let service = IntakeService::new(
        repository.clone(),
        store.clone(),
        UploadPolicy::with_max_megabytes(1),
    );
    (service, repository, store)
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    pub(super) records: Arc<Mutex<HashMap<FormId, StoredForm>>>,
}

impl MemoryRepository {
    pub(super) fn stored(&self, id: &FormId) -> Option<StoredForm> {
        self.records
            .lock()
            .expect("repository mutex poisoned")
            .get(id)
            .cloned()
    }
}

impl FormRepository for MemoryRepository {
    fn insert(&self, record: StoredForm) -> Result<StoredForm, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: StoredForm) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if !guard.contains_key(&record.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(record.id.clone(), record);
        Ok(())
    }

    fn fetch(&self, id: &FormId) -> Result<Option<StoredForm>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<StoredForm>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }
}

pub(super) struct UnavailableRepository;

impl FormRepository for UnavailableRepository {
    fn insert(&self, _record: StoredForm) -> Result<StoredForm, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _record: StoredForm) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &FormId) -> Result<Option<StoredForm>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<StoredForm>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct StoredObject {
    pub(super) path: String,
    pub(super) content_type: String,
    pub(super) size: usize,
}

#[derive(Default, Clone)]
pub(super) struct MemoryStore {
    objects: Arc<Mutex<Vec<StoredObject>>>,
}

impl MemoryStore {
    pub(super) fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().expect("store mutex poisoned").clone()
    }
}

impl ObjectStore for MemoryStore {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &Mime,
    ) -> Result<String, StorageError> {
        self.objects
            .lock()
            .expect("store mutex poisoned")
            .push(StoredObject {
                path: path.to_string(),
                content_type: content_type.essence_str().to_string(),
                size: bytes.len(),
            });
        Ok(format!("https://files.test/{path}"))
    }
}

pub(super) struct FailingStore;

impl ObjectStore for FailingStore {
    fn upload(
        &self,
        _path: &str,
        _bytes: &[u8],
        _content_type: &Mime,
    ) -> Result<String, StorageError> {
        Err(StorageError::Transport("bucket unreachable".to_string()))
    }
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
