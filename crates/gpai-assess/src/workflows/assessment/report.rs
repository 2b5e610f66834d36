use super::classification::Classification;
use super::domain::{AssessmentStage, QuestionId, SystemicRisk};
use super::questionnaire::questionnaire;
use super::scoring::ScoreTally;
use super::session::{ProviderIdentity, TrailEntry, Verdict};
use chrono::NaiveDate;
use serde::Serialize;

/// Stages whose answers are exported as `Step<n>_<question>` columns.
const STEP_COLUMN_STAGES: [AssessmentStage; 5] = [
    AssessmentStage::Specialization,
    AssessmentStage::ProviderDetermination,
    AssessmentStage::PreliminaryChecks,
    AssessmentStage::BaselineObligations,
    AssessmentStage::SystemicRisk,
];

/// One column of the flat report record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportField {
    pub column: String,
    pub value: String,
}

impl ReportField {
    fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// Final, immutable record of a completed assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssessmentReport {
    pub assessed_on: NaiveDate,
    pub identity: ProviderIdentity,
    pub classification: Classification,
    pub tally: ScoreTally,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_plan: Option<String>,
    pub responses: Vec<TrailEntry>,
}

impl AssessmentReport {
    pub(crate) fn new(verdict: Verdict, trail: Vec<TrailEntry>, assessed_on: NaiveDate) -> Self {
        Self {
            assessed_on,
            identity: verdict.identity,
            classification: verdict.classification,
            tally: verdict.tally,
            remediation_plan: verdict.remediation_plan,
            responses: trail,
        }
    }

    pub fn answer(&self, question: QuestionId) -> Option<&TrailEntry> {
        self.responses
            .iter()
            .find(|entry| entry.question == question)
    }

    /// Flatten the report into its fixed, ordered column set.
    ///
    /// Questions that were not on the assessment path export as empty values.
    pub fn fields(&self) -> Vec<ReportField> {
        let classification = &self.classification;
        let identity = &self.identity;
        let mut fields = vec![
            ReportField::new("Model Name", identity.model_name.as_str()),
            ReportField::new("Provider Name", identity.provider_name.as_str()),
            ReportField::new(
                "Provider Type (Recital 109)",
                identity.provider_type.as_str(),
            ),
            ReportField::new(
                "Provider Justification",
                identity.context_justification.as_str(),
            ),
            ReportField::new("Assessment Date", self.assessed_on.to_string()),
            ReportField::new(
                "Specialization Verdict",
                classification.specialization_verdict.label(),
            ),
            ReportField::new("Provider Status", classification.provider_status.label()),
            ReportField::new(
                "Substantial Modification",
                classification.substantial_modification.label(),
            ),
            ReportField::new("Preliminary Score", self.tally.preliminary.to_string()),
            ReportField::new("Baseline Score", self.tally.baseline.to_string()),
            ReportField::new("Overall Score", self.tally.overall().to_string()),
            ReportField::new("Systemic Score", self.tally.systemic.to_string()),
            ReportField::new(
                "Systemic Risk? (Article 51)",
                classification.systemic_risk.label(),
            ),
            ReportField::new("Systemic Risk Basis", classification.systemic_basis.label()),
            ReportField::new(
                "Overall Compliance Status",
                classification.compliance_status.label(),
            ),
            ReportField::new(
                "Remediation Plan",
                self.remediation_plan.as_deref().unwrap_or_default(),
            ),
        ];

        for stage in STEP_COLUMN_STAGES {
            for question in questionnaire().stage_questions(stage) {
                let value = self
                    .answer(question.id)
                    .map(|entry| entry.answer.as_str())
                    .unwrap_or_default();
                fields.push(ReportField::new(
                    format!("Step{}_{}", stage.step(), question.id),
                    value,
                ));
            }
        }

        fields
    }

    /// Map the baseline answers and systemic classification onto the articles they engage.
    pub fn obligations(&self) -> Vec<ObligationStatus> {
        let mut obligations: Vec<ObligationStatus> = BASELINE_OBLIGATIONS
            .iter()
            .map(|&(question, article, topic)| {
                let level = match self.answer(question).and_then(|entry| entry.points) {
                    Some(2) => ObligationLevel::InPlace,
                    Some(1) => ObligationLevel::Partial,
                    _ => ObligationLevel::Missing,
                };
                ObligationStatus {
                    article,
                    topic,
                    level,
                }
            })
            .collect();

        if self.classification.systemic_risk == SystemicRisk::Yes {
            obligations.push(ObligationStatus {
                article: "Article 55",
                topic: "Additional obligations for systemic-risk models: adversarial testing, \
                        stricter documentation, incident reporting",
                level: ObligationLevel::Required,
            });
        }

        obligations
    }
}

const BASELINE_OBLIGATIONS: [(QuestionId, &str, &str); 4] = [
    (
        QuestionId::TechDoc,
        "Article 53(1)(a)",
        "Technical documentation",
    ),
    (
        QuestionId::Instructions,
        "Article 53(1)(b)",
        "Downstream instructions",
    ),
    (QuestionId::Copyright, "Article 53(1)(c)", "Copyright policy"),
    (
        QuestionId::DataSummary,
        "Article 53(1)(d)",
        "Public data summary",
    ),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObligationLevel {
    InPlace,
    Partial,
    Missing,
    /// Triggered by classification rather than answered.
    Required,
}

impl ObligationLevel {
    pub const fn label(self) -> &'static str {
        match self {
            Self::InPlace => "In place",
            Self::Partial => "Partial",
            Self::Missing => "Missing",
            Self::Required => "Required",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObligationStatus {
    pub article: &'static str,
    pub topic: &'static str,
    pub level: ObligationLevel,
}
