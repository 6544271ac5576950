use std::fs;
use std::path::PathBuf;

use mime::Mime;
use serde::Serialize;

use super::domain::{Criterion, FormId};

const MEGABYTE: u64 = 1024 * 1024;
const DRAFT_PREFIX: &str = "drafts";

/// Object store that hands back a public URL for every stored file.
pub trait ObjectStore: Send + Sync {
    fn upload(&self, path: &str, bytes: &[u8], content_type: &Mime)
        -> Result<String, StorageError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("file size {size} bytes exceeds the limit of {limit_mb}MB")]
    TooLarge { size: u64, limit_mb: u64 },
    #[error("file type {0} is not accepted; upload a PDF, PNG, or JPEG")]
    UnsupportedType(String),
    #[error("file name is empty")]
    EmptyFileName,
    #[error("upload failed: {0}")]
    Transport(String),
}

/// Size and type limits enforced before anything reaches the store.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadPolicy {
    max_bytes: u64,
    accepted: Vec<Mime>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::with_max_megabytes(10)
    }
}

impl UploadPolicy {
    pub fn with_max_megabytes(max_megabytes: u64) -> Self {
        Self {
            max_bytes: max_megabytes.saturating_mul(MEGABYTE),
            accepted: vec![mime::APPLICATION_PDF, mime::IMAGE_PNG, mime::IMAGE_JPEG],
        }
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    pub fn check(&self, size: u64, content_type: &Mime) -> Result<(), StorageError> {
        if size > self.max_bytes {
            return Err(StorageError::TooLarge {
                size,
                limit_mb: self.max_bytes / MEGABYTE,
            });
        }

        let essence = content_type.essence_str();
        if self
            .accepted
            .iter()
            .any(|accepted| accepted.essence_str() == essence)
        {
            Ok(())
        } else {
            Err(StorageError::UnsupportedType(essence.to_string()))
        }
    }
}

/// A file the applicant wants to attach to an entry.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub form_id: Option<FormId>,
    pub criterion: Criterion,
    pub file_name: String,
    pub content_type: Mime,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadedFile {
    pub path: String,
    pub url: String,
    pub size: u64,
}

/// Replaces every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

/// `{form id or "drafts"}/{criterion}/{millis}-{sanitized name}`
pub fn object_path(request: &UploadRequest, timestamp_millis: i64) -> String {
    let owner = request
        .form_id
        .as_ref()
        .map(|id| sanitize_file_name(&id.0))
        .unwrap_or_else(|| DRAFT_PREFIX.to_string());
    format!(
        "{owner}/{}/{timestamp_millis}-{}",
        request.criterion.key(),
        sanitize_file_name(request.file_name.trim())
    )
}

/// Writes uploads below a directory that is served at `public_base_url`.
/// Writes are blocking; async callers run them on the blocking pool.
#[derive(Debug, Clone)]
pub struct LocalDirectoryStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDirectoryStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }
}

impl ObjectStore for LocalDirectoryStore {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        _content_type: &Mime,
    ) -> Result<String, StorageError> {
        let relative = path.trim_start_matches('/');
        if relative.split('/').any(|segment| segment == "..") {
            return Err(StorageError::Transport(format!("invalid object path {path}")));
        }

        let target = self.root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|err| StorageError::Transport(err.to_string()))?;
        }
        fs::write(&target, bytes).map_err(|err| StorageError::Transport(err.to_string()))?;

        Ok(format!("{}/{relative}", self.public_base_url))
    }
}
