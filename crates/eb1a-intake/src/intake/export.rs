//! Spreadsheet-friendly CSV exports for the admin dashboard.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::admin::{FormSummary, StatusFilter};
use super::domain::{Criterion, FormDocument};

pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportKind {
    #[default]
    Summary,
    Entries,
}

impl ExportKind {
    pub const fn label(self) -> &'static str {
        match self {
            ExportKind::Summary => "summary",
            ExportKind::Entries => "entries",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub status: StatusFilter,
    #[serde(default)]
    pub kind: ExportKind,
}

/// Rendered export ready to be written or downloaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error("unable to finish export: {0}")]
    Flush(String),
}

pub fn export_file_name(filter: StatusFilter, kind: ExportKind, day: NaiveDate) -> String {
    match kind {
        ExportKind::Summary => format!(
            "eb1a-applications-{}-{}.csv",
            filter.label(),
            day.format("%Y-%m-%d")
        ),
        ExportKind::Entries => format!(
            "eb1a-applications-{}-{}-{}.csv",
            filter.label(),
            kind.label(),
            day.format("%Y-%m-%d")
        ),
    }
}

fn timestamp(value: Option<DateTime<Utc>>) -> String {
    value.map(|value| value.to_rfc3339()).unwrap_or_default()
}

/// One row per application with per-criterion entry counts.
pub fn summaries_csv(summaries: &[FormSummary]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = vec![
        "id".to_string(),
        "full_name".to_string(),
        "email".to_string(),
        "status".to_string(),
        "created_at".to_string(),
        "updated_at".to_string(),
        "submitted_at".to_string(),
    ];
    header.extend(Criterion::ALL.iter().map(|criterion| criterion.label().to_string()));
    header.push("criteria_completed".to_string());
    writer.write_record(&header)?;

    for summary in summaries {
        let mut row = vec![
            summary.id.0.clone(),
            summary.full_name.clone(),
            summary.email.clone(),
            summary.status.label().to_string(),
            summary.created_at.to_rfc3339(),
            timestamp(summary.updated_at),
            timestamp(summary.submitted_at),
        ];
        row.extend(Criterion::ALL.iter().map(|criterion| {
            summary
                .entry_counts
                .get(criterion)
                .copied()
                .unwrap_or_default()
                .to_string()
        }));
        row.push(summary.completed_criteria.to_string());
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))
}

/// One row per field value and attachment, for reviewers who need the detail.
pub fn entries_csv(documents: &[FormDocument]) -> Result<(Vec<u8>, usize), ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "form_id",
        "full_name",
        "criterion",
        "entry_id",
        "kind",
        "key",
        "value",
    ])?;

    let mut rows = 0;
    for document in documents {
        let form_id = document
            .id
            .as_ref()
            .map(|id| id.0.as_str())
            .unwrap_or_default();
        for criterion in Criterion::ALL {
            for entry in document.collections.get(criterion) {
                let values = entry
                    .fields
                    .iter()
                    .map(|(key, value)| ("field", key, value))
                    .chain(
                        entry
                            .attachments
                            .iter()
                            .map(|(key, value)| ("attachment", key, value)),
                    );
                for (kind, key, value) in values {
                    writer.write_record([
                        form_id,
                        document.full_name.as_str(),
                        criterion.key(),
                        entry.id.0.as_str(),
                        kind,
                        key.as_str(),
                        value.as_str(),
                    ])?;
                    rows += 1;
                }
            }
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.to_string()))?;
    Ok((bytes, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intake::domain::{ApplicantDetails, EntryDraft, FormId};
    use crate::intake::form::FormAction;

    #[test]
    fn file_names_follow_dashboard_convention() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).expect("valid date");
        assert_eq!(
            export_file_name(StatusFilter::Submitted, ExportKind::Summary, day),
            "eb1a-applications-submitted-2026-03-09.csv"
        );
        assert_eq!(
            export_file_name(StatusFilter::All, ExportKind::Entries, day),
            "eb1a-applications-all-entries-2026-03-09.csv"
        );
    }

    #[test]
    fn entries_export_lists_fields_and_attachments() {
        let applicant = ApplicantDetails::new("Rosalind Franklin", "rf@example.org").expect("valid");
        let mut document = FormDocument::new(applicant)
            .apply(FormAction::AddEntry {
                criterion: Criterion::PublishedMaterials,
                entry: EntryDraft::from_fields([
                    ("publicationTitle", "Photo 51, explained"),
                    ("publicationDate", "1953-04-25"),
                    ("publisherName", "Nature"),
                ])
                .with_attachment("evidenceUrl", "https://files/nature.pdf"),
            })
            .expect("entry applies");
        document.id = Some(FormId("f-7".to_string()));

        let (bytes, rows) = entries_csv(&[document]).expect("export");
        assert_eq!(rows, 4);

        let mut reader = csv::Reader::from_reader(bytes.as_slice());
        let records: Vec<csv::StringRecord> = reader
            .records()
            .collect::<Result<_, _>>()
            .expect("parse export");
        assert_eq!(records.len(), 4);
        assert!(records.iter().all(|record| &record[0] == "f-7"));
        assert!(records
            .iter()
            .any(|record| &record[4] == "attachment" && &record[6] == "https://files/nature.pdf"));
        assert!(records
            .iter()
            .any(|record| &record[5] == "publicationTitle" && &record[6] == "Photo 51, explained"));
    }
}
