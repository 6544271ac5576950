use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Criterion, FormId, FormStatus};
use super::form::MINIMUM_CRITERIA;
use super::repository::StoredForm;

const UNKNOWN_NAME: &str = "Unknown";
const UNKNOWN_EMAIL: &str = "No email provided";

/// Dashboard tab selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Submitted,
}

impl StatusFilter {
    pub fn matches(self, status: FormStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Draft => status == FormStatus::Draft,
            StatusFilter::Submitted => status == FormStatus::Submitted,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Draft => "draft",
            StatusFilter::Submitted => "submitted",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SummaryQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub search: Option<String>,
}

/// One row of the applications table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSummary {
    pub id: FormId,
    pub full_name: String,
    pub email: String,
    pub status: FormStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub entry_counts: BTreeMap<Criterion, usize>,
    pub total_entries: usize,
    pub completed_criteria: usize,
    pub meets_minimum: bool,
}

impl FormSummary {
    pub fn from_stored(record: &StoredForm) -> Self {
        let collections = record.collections();
        let entry_counts: BTreeMap<Criterion, usize> = collections.counts().collect();
        let completed_criteria = entry_counts.values().filter(|count| **count > 0).count();

        Self {
            id: record.id.clone(),
            full_name: record
                .data_str("fullName")
                .unwrap_or(UNKNOWN_NAME)
                .to_string(),
            email: record
                .data_str("email")
                .unwrap_or(UNKNOWN_EMAIL)
                .to_string(),
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
            submitted_at: record.submitted_at,
            total_entries: collections.total_entries(),
            entry_counts,
            completed_criteria,
            meets_minimum: completed_criteria >= MINIMUM_CRITERIA,
        }
    }

    fn matches_search(&self, term: &str) -> bool {
        self.full_name.to_lowercase().contains(term)
            || self.email.to_lowercase().contains(term)
            || self.id.0.to_lowercase().contains(term)
    }
}

/// Newest first. A non-blank search runs across every form regardless of the
/// status tab; a blank or missing search narrows by the tab instead.
pub fn filter_summaries(mut summaries: Vec<FormSummary>, query: &SummaryQuery) -> Vec<FormSummary> {
    summaries.sort_by(|left, right| right.created_at.cmp(&left.created_at));

    let term = query
        .search
        .as_deref()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty());

    summaries
        .into_iter()
        .filter(|summary| match &term {
            Some(term) => summary.matches_search(term),
            None => query.status.matches(summary.status),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total: usize,
    pub submitted: usize,
    pub draft: usize,
}

impl DashboardStats {
    pub fn from_summaries(summaries: &[FormSummary]) -> Self {
        let submitted = summaries
            .iter()
            .filter(|summary| summary.status == FormStatus::Submitted)
            .count();
        Self {
            total: summaries.len(),
            submitted,
            draft: summaries.len() - submitted,
        }
    }
}
