//! Static field schemas for the ten criterion steps.
//!
//! Every criterion shares one entry manager; the schema is what differs. It
//! names the accepted field and attachment keys and marks which fields must
//! be present before an entry can be saved.

use serde::Serialize;

use super::domain::{Criterion, FieldValues};
use super::form::FormError;

/// Step titles shown by the wizard stepper, in order.
pub const WIZARD_STEPS: [&str; 12] = [
    "Instructions",
    "Prizes & Awards",
    "Memberships",
    "Published Material",
    "Judge of Others' Work",
    "Original Contributions",
    "Scholarly Articles",
    "Artistic Exhibitions",
    "Leading Role",
    "High Salary",
    "Commercial Success",
    "Review & Submit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    LongText,
    Date,
    Choice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldDescriptor {
    const fn required(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: true,
        }
    }

    const fn optional(key: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            kind,
            required: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttachmentDescriptor {
    pub key: &'static str,
    pub label: &'static str,
}

const fn attachment(key: &'static str, label: &'static str) -> AttachmentDescriptor {
    AttachmentDescriptor { key, label }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CriterionSchema {
    pub criterion: Criterion,
    pub title: &'static str,
    pub heading: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub attachments: &'static [AttachmentDescriptor],
}

impl CriterionSchema {
    pub fn field(&self, key: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|field| field.key == key)
    }

    pub fn attachment(&self, key: &str) -> Option<&'static AttachmentDescriptor> {
        self.attachments.iter().find(|slot| slot.key == key)
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|field| field.required)
    }

    /// Presence check only: unknown keys are rejected and every required
    /// field must carry a non-blank value.
    pub fn validate_fields(&self, values: &FieldValues) -> Result<(), FormError> {
        if let Some(unknown) = values.keys().find(|key| self.field(key).is_none()) {
            return Err(FormError::UnknownField {
                criterion: self.criterion,
                key: unknown.clone(),
            });
        }

        let missing: Vec<&'static str> = self
            .required_fields()
            .filter(|field| {
                values
                    .get(field.key)
                    .map_or(true, |value| value.trim().is_empty())
            })
            .map(|field| field.label)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(FormError::MissingRequiredFields {
                criterion: self.criterion,
                fields: missing,
            })
        }
    }

    pub fn validate_attachment(&self, key: &str) -> Result<&'static AttachmentDescriptor, FormError> {
        self.attachment(key)
            .ok_or_else(|| FormError::UnknownAttachment {
                criterion: self.criterion,
                key: key.to_string(),
            })
    }
}

use FieldKind::{Choice, Date, LongText, Text};

static AWARDS: CriterionSchema = CriterionSchema {
    criterion: Criterion::Awards,
    title: "Prizes & Awards",
    heading: "Criterion 1: Nationally or Internationally Recognized Prizes or Awards",
    fields: &[
        FieldDescriptor::optional("fullName", "Recipient Name", Text),
        FieldDescriptor::required("awardName", "Award Name", Text),
        FieldDescriptor::required("dateReceived", "Date Received", Date),
        FieldDescriptor::required("awardingOrganization", "Awarding Organization", Text),
        FieldDescriptor::optional("awardDescription", "Award Description", LongText),
        FieldDescriptor::optional("awardCriteria", "Award Criteria", LongText),
        FieldDescriptor::optional("selectionProcess", "Selection Process", LongText),
    ],
    attachments: &[
        attachment("certificateUrl", "Award Certificate or Notification"),
        attachment("supportingDocUrl", "Supporting Documentation"),
    ],
};

static MEMBERSHIPS: CriterionSchema = CriterionSchema {
    criterion: Criterion::Memberships,
    title: "Memberships",
    heading: "Criterion 2: Membership in Associations",
    fields: &[
        FieldDescriptor::required("associationName", "Association Name", Text),
        FieldDescriptor::required("memberSince", "Member Since", Date),
        FieldDescriptor::optional("associationDescription", "Association Description", LongText),
        FieldDescriptor::optional(
            "membershipRequirements",
            "Membership Requirements",
            LongText,
        ),
        FieldDescriptor::optional("contributions", "Contributions", LongText),
    ],
    attachments: &[
        attachment("certificateUrl", "Membership Certificate or Card"),
        attachment("supportingDocUrl", "Supporting Documentation"),
    ],
};

static PUBLISHED_MATERIALS: CriterionSchema = CriterionSchema {
    criterion: Criterion::PublishedMaterials,
    title: "Published Material",
    heading: "Criterion 3: Published Material About You",
    fields: &[
        FieldDescriptor::required("publicationTitle", "Publication Title", Text),
        FieldDescriptor::required("publicationDate", "Publication Date", Date),
        FieldDescriptor::required("publisherName", "Publisher Name", Text),
        FieldDescriptor::optional("circulationInfo", "Circulation Information", LongText),
        FieldDescriptor::optional("contentSummary", "Content Summary", LongText),
    ],
    attachments: &[
        attachment("publicationUrl", "Upload Publication"),
        attachment("evidenceUrl", "Circulation Evidence"),
    ],
};

static JUDGING_EXPERIENCES: CriterionSchema = CriterionSchema {
    criterion: Criterion::JudgingExperiences,
    title: "Judge of Others' Work",
    heading: "Criterion 4: Judge of the Work of Others",
    fields: &[
        FieldDescriptor::required("judgeRole", "Judging Role", Text),
        FieldDescriptor::required("startDate", "Start Date", Date),
        FieldDescriptor::optional("endDate", "End Date", Date),
        FieldDescriptor::required("organizationName", "Organization Name", Text),
        FieldDescriptor::optional("description", "Description", LongText),
        FieldDescriptor::optional("selectionProcess", "Selection Process", LongText),
    ],
    attachments: &[
        attachment("appointmentLetterUrl", "Appointment Letter"),
        attachment("evidenceUrl", "Judging Evidence"),
    ],
};

static ORIGINAL_CONTRIBUTIONS: CriterionSchema = CriterionSchema {
    criterion: Criterion::OriginalContributions,
    title: "Original Contributions",
    heading: "Criterion 5: Original Scientific, Scholarly, or Business-Related Contributions",
    fields: &[
        FieldDescriptor::required("contributionTitle", "Contribution Title", Text),
        FieldDescriptor::required("contributionDate", "Contribution Date", Date),
        FieldDescriptor::required("field", "Field", Text),
        FieldDescriptor::optional("description", "Description", LongText),
        FieldDescriptor::optional("significance", "Significance", LongText),
        FieldDescriptor::optional("implementation", "Implementation", LongText),
    ],
    attachments: &[
        attachment("evidenceUrl", "Contribution Evidence"),
        attachment("lettersUrl", "Expert Letters"),
        attachment("supportingDocUrl", "Supporting Documentation"),
    ],
};

static SCHOLARLY_ARTICLES: CriterionSchema = CriterionSchema {
    criterion: Criterion::ScholarlyArticles,
    title: "Scholarly Articles",
    heading: "Criterion 6: Scholarly Articles in Professional Journals",
    fields: &[
        FieldDescriptor::required("articleTitle", "Article Title", Text),
        FieldDescriptor::required("journalName", "Journal Name", Text),
        FieldDescriptor::required("publicationDate", "Publication Date", Date),
        FieldDescriptor::required("authors", "Authors", Text),
        FieldDescriptor::required("abstract", "Abstract", LongText),
        FieldDescriptor::optional("journalImpact", "Journal Impact", LongText),
        FieldDescriptor::optional("significance", "Significance", LongText),
    ],
    attachments: &[
        attachment("articleUrl", "Upload Article"),
        attachment("citationUrl", "Upload Citation Evidence"),
        attachment("journalInfoUrl", "Upload Journal Information"),
    ],
};

static EXHIBITIONS: CriterionSchema = CriterionSchema {
    criterion: Criterion::Exhibitions,
    title: "Artistic Exhibitions",
    heading: "Criterion 7: Display of Work at Artistic Exhibitions or Showcases",
    fields: &[
        FieldDescriptor::required("exhibitionName", "Exhibition Name", Text),
        FieldDescriptor::required("venueName", "Venue Name", Text),
        FieldDescriptor::required("startDate", "Start Date", Date),
        FieldDescriptor::optional("endDate", "End Date", Date),
        FieldDescriptor::optional("venueLocation", "Venue Location", Text),
        FieldDescriptor::optional("exhibitionDescription", "Exhibition Description", LongText),
        FieldDescriptor::optional("workDescription", "Work Description", LongText),
        FieldDescriptor::optional("selectionProcess", "Selection Process", LongText),
        FieldDescriptor::optional("venuePrestige", "Venue Prestige", LongText),
    ],
    attachments: &[
        attachment("exhibitionDocUrl", "Exhibition Documentation"),
        attachment("visualEvidenceUrl", "Visual Evidence"),
        attachment("reviewsUrl", "Reviews"),
    ],
};

static LEADING_ROLES: CriterionSchema = CriterionSchema {
    criterion: Criterion::LeadingRoles,
    title: "Leading Role",
    heading: "Criterion 8: Leading or Critical Role in Distinguished Organizations",
    fields: &[
        FieldDescriptor::required("organizationName", "Organization Name", Text),
        FieldDescriptor::required("roleTitle", "Role Title", Text),
        FieldDescriptor::required("startDate", "Start Date", Date),
        FieldDescriptor::optional("endDate", "End Date", Date),
        FieldDescriptor::optional(
            "organizationDescription",
            "Organization Description",
            LongText,
        ),
        FieldDescriptor::optional("responsibilities", "Responsibilities", LongText),
        FieldDescriptor::optional("achievements", "Achievements", LongText),
        FieldDescriptor::optional("reportingStructure", "Reporting Structure", LongText),
    ],
    attachments: &[
        attachment("verificationUrl", "Role Verification"),
        attachment("organizationChartUrl", "Organization Chart"),
        attachment("distinctionEvidenceUrl", "Distinction Evidence"),
        attachment("recommendationUrl", "Recommendation Letter"),
    ],
};

static HIGH_SALARIES: CriterionSchema = CriterionSchema {
    criterion: Criterion::HighSalaries,
    title: "High Salary",
    heading: "Criterion 9: High Salary Evidence",
    fields: &[
        FieldDescriptor::required("employerName", "Employer Name", Text),
        FieldDescriptor::required("startDate", "Start Date", Date),
        FieldDescriptor::optional("endDate", "End Date", Date),
        FieldDescriptor::required("baseSalary", "Base Salary", Text),
        FieldDescriptor::required("currency", "Currency", Choice),
        FieldDescriptor::optional("frequency", "Payment Frequency", Choice),
        FieldDescriptor::optional(
            "additionalCompensation",
            "Additional Compensation",
            LongText,
        ),
        FieldDescriptor::optional("industryComparison", "Industry Comparison", LongText),
    ],
    attachments: &[
        attachment("salaryDocUrl", "Salary Documentation"),
        attachment("industryEvidenceUrl", "Industry Salary Evidence"),
        attachment("expertLettersUrl", "Expert Letters"),
    ],
};

static COMMERCIAL_SUCCESSES: CriterionSchema = CriterionSchema {
    criterion: Criterion::CommercialSuccesses,
    title: "Commercial Success",
    heading: "Criterion 10: Commercial Success in the Performing Arts",
    fields: &[
        FieldDescriptor::required("projectTitle", "Project Title", Text),
        FieldDescriptor::required("projectType", "Project Type", Choice),
        FieldDescriptor::required("releaseDate", "Release Date", Date),
        FieldDescriptor::optional("role", "Your Role", Text),
        FieldDescriptor::optional("metrics", "Commercial Metrics", LongText),
        FieldDescriptor::optional("industryContext", "Industry Context", LongText),
        FieldDescriptor::optional("criticalReception", "Critical Reception", LongText),
    ],
    attachments: &[
        attachment("salesDocUrl", "Sales Documentation"),
        attachment("mediaCoverageUrl", "Media Coverage"),
        attachment("recognitionUrl", "Industry Recognition"),
        attachment("contractsUrl", "Contracts"),
    ],
};

pub fn schema_for(criterion: Criterion) -> &'static CriterionSchema {
    match criterion {
        Criterion::Awards => &AWARDS,
        Criterion::Memberships => &MEMBERSHIPS,
        Criterion::PublishedMaterials => &PUBLISHED_MATERIALS,
        Criterion::JudgingExperiences => &JUDGING_EXPERIENCES,
        Criterion::OriginalContributions => &ORIGINAL_CONTRIBUTIONS,
        Criterion::ScholarlyArticles => &SCHOLARLY_ARTICLES,
        Criterion::Exhibitions => &EXHIBITIONS,
        Criterion::LeadingRoles => &LEADING_ROLES,
        Criterion::HighSalaries => &HIGH_SALARIES,
        Criterion::CommercialSuccesses => &COMMERCIAL_SUCCESSES,
    }
}

pub fn all_schemas() -> Vec<&'static CriterionSchema> {
    Criterion::ALL.into_iter().map(schema_for).collect()
}
