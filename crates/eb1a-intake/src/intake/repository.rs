use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::domain::{CriteriaCollections, FormDocument, FormId, FormStatus};

/// Row stored per application: identity and lifecycle columns plus the
/// applicant's answers as an opaque JSON blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredForm {
    pub id: FormId,
    pub data: Value,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FormBlob {
    full_name: String,
    email: String,
    #[serde(default)]
    status: FormStatus,
    #[serde(flatten)]
    collections: CriteriaCollections,
}

impl StoredForm {
    /// Builds the row for a document that has already been assigned an id.
    pub fn from_document(document: &FormDocument) -> Result<Self, RepositoryError> {
        let id = document.id.clone().ok_or(RepositoryError::MissingIdentity)?;
        let created_at = document.created_at.ok_or(RepositoryError::MissingIdentity)?;

        let blob = FormBlob {
            full_name: document.full_name.clone(),
            email: document.email.clone(),
            status: document.status,
            collections: document.collections.clone(),
        };
        let data =
            serde_json::to_value(blob).map_err(|err| RepositoryError::Corrupt(err.to_string()))?;

        Ok(Self {
            id,
            data,
            status: document.status,
            created_at,
            updated_at: document.updated_at,
            submitted_at: document.submitted_at,
        })
    }

    /// Rebuilds the document; row columns win over anything in the blob.
    pub fn to_document(&self) -> Result<FormDocument, RepositoryError> {
        let blob: FormBlob = serde_json::from_value(self.data.clone())
            .map_err(|err| RepositoryError::Corrupt(format!("form {}: {err}", self.id)))?;

        Ok(FormDocument {
            id: Some(self.id.clone()),
            full_name: blob.full_name,
            email: blob.email,
            status: self.status,
            created_at: Some(self.created_at),
            updated_at: self.updated_at,
            submitted_at: self.submitted_at,
            collections: blob.collections,
        })
    }

    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Collections parsed leniently so dashboards survive a malformed blob.
    pub fn collections(&self) -> CriteriaCollections {
        serde_json::from_value(self.data.clone()).unwrap_or_default()
    }
}

/// Storage abstraction so the service module can be exercised in isolation.
pub trait FormRepository: Send + Sync {
    fn insert(&self, record: StoredForm) -> Result<StoredForm, RepositoryError>;
    fn update(&self, record: StoredForm) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &FormId) -> Result<Option<StoredForm>, RepositoryError>;
    fn list(&self) -> Result<Vec<StoredForm>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("form has no id or creation time yet")]
    MissingIdentity,
    #[error("stored form is unreadable: {0}")]
    Corrupt(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
