use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{
    ApplicantDetails, CriteriaCollections, Criterion, EntryDraft, EntryId, FormDocument,
    FormStatus,
};
use super::entries::CriterionEntries;

/// Number of non-empty criteria an application needs before it can be submitted.
pub const MINIMUM_CRITERIA: usize = 3;

/// Every mutation the wizard can make to a form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FormAction {
    UpdateApplicant {
        full_name: String,
        email: String,
    },
    AddEntry {
        criterion: Criterion,
        entry: EntryDraft,
    },
    EditEntry {
        criterion: Criterion,
        entry_id: EntryId,
        entry: EntryDraft,
    },
    RemoveEntry {
        criterion: Criterion,
        entry_id: EntryId,
    },
    AttachFile {
        criterion: Criterion,
        entry_id: EntryId,
        field: String,
        url: String,
    },
    DetachFile {
        criterion: Criterion,
        entry_id: EntryId,
        field: String,
    },
}

/// Local validation failures. None of them mutate the document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("full name is required")]
    MissingFullName,
    #[error("a valid email address is required")]
    InvalidEmail,
    #[error("{criterion}: please complete the required fields: {}", .fields.join(", "))]
    MissingRequiredFields {
        criterion: Criterion,
        fields: Vec<&'static str>,
    },
    #[error("{criterion}: unknown field '{key}'")]
    UnknownField { criterion: Criterion, key: String },
    #[error("{criterion}: unknown attachment '{key}'")]
    UnknownAttachment { criterion: Criterion, key: String },
    #[error("{criterion}: entry {entry_id} not found")]
    EntryNotFound {
        criterion: Criterion,
        entry_id: EntryId,
    },
    #[error("application has already been submitted and can no longer be edited")]
    AlreadySubmitted,
}

impl ApplicantDetails {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Result<Self, FormError> {
        let full_name = full_name.into().trim().to_string();
        let email = email.into().trim().to_string();

        if full_name.is_empty() {
            return Err(FormError::MissingFullName);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(FormError::InvalidEmail);
        }

        Ok(Self { full_name, email })
    }
}

/// Per-criterion entry count as shown on the review step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionCount {
    pub criterion: Criterion,
    pub label: &'static str,
    pub count: usize,
}

/// Whether a document has enough evidence categories to be submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionReadiness {
    pub criteria: Vec<CriterionCount>,
    pub completed: usize,
    pub required: usize,
    pub ready: bool,
}

impl SubmissionReadiness {
    pub fn completed_criteria(&self) -> impl Iterator<Item = &CriterionCount> {
        self.criteria.iter().filter(|entry| entry.count > 0)
    }
}

impl FormDocument {
    /// Fresh draft for an applicant; nothing is persisted yet.
    pub fn new(applicant: ApplicantDetails) -> Self {
        Self {
            id: None,
            full_name: applicant.full_name,
            email: applicant.email,
            status: FormStatus::Draft,
            created_at: None,
            updated_at: None,
            submitted_at: None,
            collections: CriteriaCollections::default(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.status == FormStatus::Submitted
    }

    /// Entry manager over a copy of one collection.
    pub fn entries(&self, criterion: Criterion) -> CriterionEntries {
        CriterionEntries::from_entries(criterion, self.collections.get(criterion).to_vec())
    }

    /// Applies one action and returns the resulting document.
    pub fn apply(mut self, action: FormAction) -> Result<Self, FormError> {
        if self.is_submitted() {
            return Err(FormError::AlreadySubmitted);
        }

        match action {
            FormAction::UpdateApplicant { full_name, email } => {
                let applicant = ApplicantDetails::new(full_name, email)?;
                self.full_name = applicant.full_name;
                self.email = applicant.email;
            }
            FormAction::AddEntry { criterion, entry } => {
                self.with_entries(criterion, |entries| entries.add(entry).map(|_| ()))?;
            }
            FormAction::EditEntry {
                criterion,
                entry_id,
                entry,
            } => {
                self.with_entries(criterion, |entries| {
                    entries.edit(&entry_id, entry).map(|_| ())
                })?;
            }
            FormAction::RemoveEntry {
                criterion,
                entry_id,
            } => {
                self.with_entries(criterion, |entries| {
                    entries.remove(&entry_id);
                    Ok(())
                })?;
            }
            FormAction::AttachFile {
                criterion,
                entry_id,
                field,
                url,
            } => {
                self.with_entries(criterion, |entries| {
                    entries.attach(&entry_id, &field, url).map(|_| ())
                })?;
            }
            FormAction::DetachFile {
                criterion,
                entry_id,
                field,
            } => {
                self.with_entries(criterion, |entries| {
                    entries.detach(&entry_id, &field).map(|_| ())
                })?;
            }
        }

        Ok(self)
    }

    pub fn readiness(&self) -> SubmissionReadiness {
        let criteria: Vec<CriterionCount> = self
            .collections
            .counts()
            .map(|(criterion, count)| CriterionCount {
                criterion,
                label: criterion.label(),
                count,
            })
            .collect();
        let completed = criteria.iter().filter(|entry| entry.count > 0).count();

        SubmissionReadiness {
            criteria,
            completed,
            required: MINIMUM_CRITERIA,
            ready: completed >= MINIMUM_CRITERIA,
        }
    }

    fn with_entries<F>(&mut self, criterion: Criterion, mutate: F) -> Result<(), FormError>
    where
        F: FnOnce(&mut CriterionEntries) -> Result<(), FormError>,
    {
        let slot = self.collections.get_mut(criterion);
        let mut entries = CriterionEntries::from_entries(criterion, std::mem::take(slot));
        let outcome = mutate(&mut entries);
        *slot = entries.into_entries();

        if let Err(err) = &outcome {
            warn!(%criterion, error = %err, "form action rejected");
        }
        outcome
    }
}
