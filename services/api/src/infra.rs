use eb1a_intake::intake::{
    Criterion, ExportKind, FormId, FormRepository, ObjectStore, RepositoryError, StatusFilter,
    StorageError, StoredForm,
};
use metrics_exporter_prometheus::PrometheusHandle;
use mime_guess::mime::Mime;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) upload_root: Arc<PathBuf>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryFormRepository {
    records: Arc<Mutex<HashMap<FormId, StoredForm>>>,
}

impl FormRepository for InMemoryFormRepository {
    fn insert(&self, record: StoredForm) -> Result<StoredForm, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        if guard.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.id.clone(), record.clone());
        Ok(record)
    }

    fn update(&self, record: StoredForm) -> Result<(), RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        if guard.contains_key(&record.id) {
            guard.insert(record.id.clone(), record);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &FormId) -> Result<Option<StoredForm>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<StoredForm>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository mutex poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }
}

/// Store for offline commands that never accept uploads.
pub(crate) struct OfflineStore;

impl ObjectStore for OfflineStore {
    fn upload(
        &self,
        _path: &str,
        _bytes: &[u8],
        _content_type: &Mime,
    ) -> Result<String, StorageError> {
        Err(StorageError::Transport(
            "uploads are disabled for offline commands".to_string(),
        ))
    }
}

pub(crate) fn parse_status_filter(raw: &str) -> Result<StatusFilter, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "all" => Ok(StatusFilter::All),
        "draft" => Ok(StatusFilter::Draft),
        "submitted" => Ok(StatusFilter::Submitted),
        other => Err(format!(
            "unknown status '{other}' (expected all, draft, or submitted)"
        )),
    }
}

pub(crate) fn parse_export_kind(raw: &str) -> Result<ExportKind, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "summary" => Ok(ExportKind::Summary),
        "entries" => Ok(ExportKind::Entries),
        other => Err(format!(
            "unknown export kind '{other}' (expected summary or entries)"
        )),
    }
}

pub(crate) fn parse_criterion(raw: &str) -> Result<Criterion, String> {
    Criterion::from_key(raw.trim()).ok_or_else(|| {
        let known: Vec<&str> = Criterion::ALL.iter().map(|criterion| criterion.key()).collect();
        format!("unknown criterion '{raw}' (expected one of {})", known.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn row(id: &str) -> StoredForm {
        StoredForm {
            id: FormId(id.to_string()),
            data: json!({ "fullName": "Ada Lovelace", "email": "ada@example.org" }),
            status: Default::default(),
            created_at: Utc::now(),
            updated_at: None,
            submitted_at: None,
        }
    }

    #[test]
    fn repository_rejects_duplicate_inserts_and_unknown_updates() {
        let repository = InMemoryFormRepository::default();
        repository.insert(row("f-1")).expect("first insert");

        assert!(matches!(
            repository.insert(row("f-1")),
            Err(RepositoryError::Conflict)
        ));
        assert!(matches!(
            repository.update(row("f-2")),
            Err(RepositoryError::NotFound)
        ));
        assert_eq!(repository.list().expect("list").len(), 1);
    }

    #[test]
    fn cli_value_parsers_accept_known_names() {
        assert_eq!(parse_status_filter(" Submitted "), Ok(StatusFilter::Submitted));
        assert!(parse_status_filter("archived").is_err());
        assert_eq!(parse_export_kind("ENTRIES"), Ok(ExportKind::Entries));
        assert_eq!(parse_criterion("leadingRoles"), Ok(Criterion::LeadingRoles));
        assert!(parse_criterion("patents")
            .expect_err("unknown")
            .contains("commercialSuccesses"));
    }
}
