use crate::infra::{
    parse_criterion, parse_export_kind, parse_status_filter, InMemoryFormRepository, OfflineStore,
};
use chrono::Local;
use clap::Args;
use eb1a_intake::error::AppError;
use eb1a_intake::intake::schema::all_schemas;
use eb1a_intake::intake::{
    schema_for, Criterion, CriterionSchema, EntryDraft, ExportKind, ExportQuery, FormAction,
    FormRepository, IntakeService, IntakeServiceError, LocalDirectoryStore, StatusFilter,
    StoredForm, SubmissionReadiness, SummaryQuery, UploadPolicy, UploadRequest,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default, PartialEq, Eq)]
pub(crate) struct CriteriaArgs {
    /// Show a single criterion by key (e.g. scholarlyArticles)
    #[arg(long, value_parser = parse_criterion)]
    pub(crate) only: Option<Criterion>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Applicant name used for the scripted session
    #[arg(long, default_value = "Ada Lovelace")]
    pub(crate) full_name: String,
    /// Applicant email used for the scripted session
    #[arg(long, default_value = "ada@example.org")]
    pub(crate) email: String,
    /// Directory the demo writes its sample upload to (defaults to the system temp dir)
    #[arg(long)]
    pub(crate) upload_dir: Option<PathBuf>,
    /// Stop after saving the draft instead of submitting it
    #[arg(long)]
    pub(crate) skip_submit: bool,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// JSON file holding an array of stored application rows
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Status tab to export: all, draft, or submitted
    #[arg(long, value_parser = parse_status_filter, default_value = "all")]
    pub(crate) status: StatusFilter,
    /// Export layout: summary or entries
    #[arg(long, value_parser = parse_export_kind, default_value = "summary")]
    pub(crate) kind: ExportKind,
    /// Write the CSV here instead of standard output
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn print_criteria(args: CriteriaArgs) -> Result<(), AppError> {
    let schemas: Vec<&'static CriterionSchema> = match args.only {
        Some(criterion) => vec![schema_for(criterion)],
        None => all_schemas(),
    };

    for schema in schemas {
        render_schema(schema);
    }
    Ok(())
}

fn render_schema(schema: &CriterionSchema) {
    println!("{} [{}]", schema.title, schema.criterion.key());
    println!("  {}", schema.heading);
    for field in schema.fields {
        let marker = if field.required { "*" } else { " " };
        println!("  {marker} {:<28} {}", field.key, field.label);
    }
    for attachment in schema.attachments {
        println!("    {:<28} {} (upload)", attachment.key, attachment.label);
    }
    println!();
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        full_name,
        email,
        upload_dir,
        skip_submit,
    } = args;

    let upload_dir = upload_dir.unwrap_or_else(|| std::env::temp_dir().join("eb1a-intake-demo"));
    let public_base_url = format!("file://{}", upload_dir.display());
    let repository = Arc::new(InMemoryFormRepository::default());
    let service = IntakeService::new(
        repository.clone(),
        Arc::new(LocalDirectoryStore::new(upload_dir, public_base_url)),
        UploadPolicy::default(),
    );

    println!(
        "EB1A evidence intake demo ({})",
        Local::now().format("%Y-%m-%d %H:%M")
    );

    let mut document = service.start(&full_name, &email)?;
    println!("- Welcome: {} <{}>", document.full_name, document.email);

    for (criterion, draft) in demo_entries() {
        document = service.apply(document, FormAction::AddEntry { criterion, entry: draft })?;
        println!(
            "- Added {} entry ({} total)",
            criterion.label(),
            document.collections.get(criterion).len()
        );
    }

    let rejected = service.apply(
        document.clone(),
        FormAction::AddEntry {
            criterion: Criterion::ScholarlyArticles,
            entry: EntryDraft::from_fields([("articleTitle", "Notes on the Analytical Engine")]),
        },
    );
    if let Err(err) = rejected {
        println!("  Incomplete article rejected: {err}");
    }

    let award_id = document
        .collections
        .get(Criterion::Awards)
        .first()
        .map(|entry| entry.id.clone());
    if let Some(entry_id) = award_id {
        let file_name = "award certificate.pdf";
        let uploaded = service.upload(UploadRequest {
            form_id: None,
            criterion: Criterion::Awards,
            file_name: file_name.to_string(),
            content_type: mime_guess::from_path(file_name).first_or_octet_stream(),
            bytes: b"%PDF-1.7\n% demo certificate\n".to_vec(),
        })?;
        println!("- Uploaded {} bytes -> {}", uploaded.size, uploaded.url);
        document = service.apply(
            document,
            FormAction::AttachFile {
                criterion: Criterion::Awards,
                entry_id,
                field: "certificateUrl".to_string(),
                url: uploaded.url,
            },
        )?;
    }

    render_readiness(&document.readiness());

    let saved = service.save_progress(&document)?;
    let form_id = saved
        .id
        .as_ref()
        .map(|id| id.to_string())
        .unwrap_or_default();
    println!("- Progress saved as {form_id}");

    if skip_submit {
        println!("  Submission skipped");
    } else {
        match service.submit(&saved) {
            Ok(submitted) => println!("- Submitted: status {}", submitted.status.label()),
            Err(err @ IntakeServiceError::InsufficientCriteria { .. }) => {
                println!("  Submission refused: {err}");
            }
            Err(err) => return Err(err.into()),
        }
    }

    let stats = service.stats()?;
    println!(
        "\nAdmin dashboard: {} total | {} submitted | {} draft",
        stats.total, stats.submitted, stats.draft
    );
    for summary in service.list_summaries(&SummaryQuery::default())? {
        println!(
            "  - {} | {} | {} | {} criteria | {} entries",
            summary.id,
            summary.full_name,
            summary.status.label(),
            summary.completed_criteria,
            summary.total_entries
        );
    }

    if let Some(id) = saved.id.as_ref() {
        if let Some(record) = repository.fetch(id).map_err(IntakeServiceError::from)? {
            let rows = serde_json::to_string_pretty(&vec![record])?;
            println!("\nStored row (usable with `export --input`):\n{rows}");
        }
    }

    let export = service.export(&ExportQuery::default())?;
    println!("\n{} ({} rows)", export.file_name, export.rows);
    print!("{}", String::from_utf8_lossy(&export.bytes));

    Ok(())
}

fn render_readiness(readiness: &SubmissionReadiness) {
    println!(
        "- Review: {} of {} required criteria have evidence{}",
        readiness.completed,
        readiness.required,
        if readiness.ready { "" } else { " (not ready)" }
    );
    for count in readiness.completed_criteria() {
        println!("    {}: {}", count.label, count.count);
    }
}

fn demo_entries() -> Vec<(Criterion, EntryDraft)> {
    vec![
        (
            Criterion::Awards,
            EntryDraft::from_fields([
                ("awardName", "Royal Society Medal"),
                ("dateReceived", "1843-11-30"),
                ("awardingOrganization", "Royal Society"),
            ]),
        ),
        (
            Criterion::PublishedMaterials,
            EntryDraft::from_fields([
                ("publicationTitle", "Sketch of the Analytical Engine"),
                ("publicationDate", "1843-09-01"),
                ("publisherName", "Taylor's Scientific Memoirs"),
            ]),
        ),
        (
            Criterion::OriginalContributions,
            EntryDraft::from_fields([
                ("contributionTitle", "First published algorithm"),
                ("contributionDate", "1843-09-01"),
                ("field", "Computing"),
                ("significance", "Bernoulli numbers computed on the Analytical Engine"),
            ]),
        ),
    ]
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        input,
        status,
        kind,
        output,
    } = args;

    let raw = std::fs::read_to_string(&input)?;
    let rows: Vec<StoredForm> = serde_json::from_str(&raw)?;

    let repository = Arc::new(InMemoryFormRepository::default());
    for row in rows {
        repository
            .insert(row)
            .map_err(IntakeServiceError::from)?;
    }

    let service = IntakeService::new(repository, Arc::new(OfflineStore), UploadPolicy::default());
    let export = service.export(&ExportQuery { status, kind })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &export.bytes)?;
            println!(
                "Wrote {} rows to {} (suggested name {})",
                export.rows,
                path.display(),
                export.file_name
            );
        }
        None => print!("{}", String::from_utf8_lossy(&export.bytes)),
    }
    Ok(())
}
