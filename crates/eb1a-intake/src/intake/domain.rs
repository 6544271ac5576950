use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier assigned to a form the first time it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormId(pub String);

impl FormId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for FormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier for one evidence entry; unique within its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The ten EB1A evidentiary criteria, in wizard order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Criterion {
    Awards,
    Memberships,
    PublishedMaterials,
    JudgingExperiences,
    OriginalContributions,
    ScholarlyArticles,
    Exhibitions,
    LeadingRoles,
    HighSalaries,
    CommercialSuccesses,
}

impl Criterion {
    pub const ALL: [Criterion; 10] = [
        Criterion::Awards,
        Criterion::Memberships,
        Criterion::PublishedMaterials,
        Criterion::JudgingExperiences,
        Criterion::OriginalContributions,
        Criterion::ScholarlyArticles,
        Criterion::Exhibitions,
        Criterion::LeadingRoles,
        Criterion::HighSalaries,
        Criterion::CommercialSuccesses,
    ];

    /// Collection key used in the stored JSON document.
    pub const fn key(self) -> &'static str {
        match self {
            Criterion::Awards => "awards",
            Criterion::Memberships => "memberships",
            Criterion::PublishedMaterials => "publishedMaterials",
            Criterion::JudgingExperiences => "judgingExperiences",
            Criterion::OriginalContributions => "originalContributions",
            Criterion::ScholarlyArticles => "scholarlyArticles",
            Criterion::Exhibitions => "exhibitions",
            Criterion::LeadingRoles => "leadingRoles",
            Criterion::HighSalaries => "highSalaries",
            Criterion::CommercialSuccesses => "commercialSuccesses",
        }
    }

    /// Short label shown on the review step and in exports.
    pub const fn label(self) -> &'static str {
        match self {
            Criterion::Awards => "Prizes & Awards",
            Criterion::Memberships => "Memberships",
            Criterion::PublishedMaterials => "Published Materials",
            Criterion::JudgingExperiences => "Judging Experience",
            Criterion::OriginalContributions => "Original Contributions",
            Criterion::ScholarlyArticles => "Scholarly Articles",
            Criterion::Exhibitions => "Exhibitions",
            Criterion::LeadingRoles => "Leading Roles",
            Criterion::HighSalaries => "High Salary Evidence",
            Criterion::CommercialSuccesses => "Commercial Success",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|criterion| criterion.key().eq_ignore_ascii_case(key.trim()))
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lifecycle of a form document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormStatus {
    #[default]
    Draft,
    Submitted,
}

impl FormStatus {
    pub const fn label(self) -> &'static str {
        match self {
            FormStatus::Draft => "draft",
            FormStatus::Submitted => "submitted",
        }
    }
}

pub type FieldValues = BTreeMap<String, String>;
pub type AttachmentUrls = BTreeMap<String, String>;

/// One evidence item inside a criterion collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: EntryId,
    #[serde(default)]
    pub fields: FieldValues,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attachments: AttachmentUrls,
}

impl EntryRecord {
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn attachment(&self, key: &str) -> Option<&str> {
        self.attachments.get(key).map(String::as_str)
    }
}

/// Field values (and any attachments uploaded before saving) for an entry
/// that is being added or edited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryDraft {
    #[serde(default)]
    pub fields: FieldValues,
    #[serde(default)]
    pub attachments: AttachmentUrls,
}

impl EntryDraft {
    pub fn from_fields<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            fields: fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
            attachments: AttachmentUrls::new(),
        }
    }

    pub fn with_attachment(mut self, key: impl Into<String>, url: impl Into<String>) -> Self {
        self.attachments.insert(key.into(), url.into());
        self
    }
}

/// The ten evidence collections of a form, serialized under their original keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriteriaCollections {
    #[serde(default)]
    pub awards: Vec<EntryRecord>,
    #[serde(default)]
    pub memberships: Vec<EntryRecord>,
    #[serde(default)]
    pub published_materials: Vec<EntryRecord>,
    #[serde(default)]
    pub judging_experiences: Vec<EntryRecord>,
    #[serde(default)]
    pub original_contributions: Vec<EntryRecord>,
    #[serde(default)]
    pub scholarly_articles: Vec<EntryRecord>,
    #[serde(default)]
    pub exhibitions: Vec<EntryRecord>,
    #[serde(default)]
    pub leading_roles: Vec<EntryRecord>,
    #[serde(default)]
    pub high_salaries: Vec<EntryRecord>,
    #[serde(default)]
    pub commercial_successes: Vec<EntryRecord>,
}

impl CriteriaCollections {
    pub fn get(&self, criterion: Criterion) -> &[EntryRecord] {
        match criterion {
            Criterion::Awards => &self.awards,
            Criterion::Memberships => &self.memberships,
            Criterion::PublishedMaterials => &self.published_materials,
            Criterion::JudgingExperiences => &self.judging_experiences,
            Criterion::OriginalContributions => &self.original_contributions,
            Criterion::ScholarlyArticles => &self.scholarly_articles,
            Criterion::Exhibitions => &self.exhibitions,
            Criterion::LeadingRoles => &self.leading_roles,
            Criterion::HighSalaries => &self.high_salaries,
            Criterion::CommercialSuccesses => &self.commercial_successes,
        }
    }

    pub fn get_mut(&mut self, criterion: Criterion) -> &mut Vec<EntryRecord> {
        match criterion {
            Criterion::Awards => &mut self.awards,
            Criterion::Memberships => &mut self.memberships,
            Criterion::PublishedMaterials => &mut self.published_materials,
            Criterion::JudgingExperiences => &mut self.judging_experiences,
            Criterion::OriginalContributions => &mut self.original_contributions,
            Criterion::ScholarlyArticles => &mut self.scholarly_articles,
            Criterion::Exhibitions => &mut self.exhibitions,
            Criterion::LeadingRoles => &mut self.leading_roles,
            Criterion::HighSalaries => &mut self.high_salaries,
            Criterion::CommercialSuccesses => &mut self.commercial_successes,
        }
    }

    pub fn counts(&self) -> impl Iterator<Item = (Criterion, usize)> + '_ {
        Criterion::ALL
            .into_iter()
            .map(|criterion| (criterion, self.get(criterion).len()))
    }

    pub fn total_entries(&self) -> usize {
        self.counts().map(|(_, count)| count).sum()
    }
}

/// Name and email captured on the welcome step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantDetails {
    pub full_name: String,
    pub email: String,
}

/// The complete per-applicant record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FormId>,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub status: FormStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub collections: CriteriaCollections,
}
