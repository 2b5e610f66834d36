use super::scoring::Score;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStage {
    Specialization,
    ProviderDetermination,
    PreliminaryChecks,
    BaselineObligations,
    SystemicRisk,
    Outcome,
    ReportDetails,
}

impl AssessmentStage {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Specialization,
            Self::ProviderDetermination,
            Self::PreliminaryChecks,
            Self::BaselineObligations,
            Self::SystemicRisk,
            Self::Outcome,
            Self::ReportDetails,
        ]
    }

    /// One-based step number used for report column prefixes.
    pub const fn step(self) -> u8 {
        match self {
            Self::Specialization => 1,
            Self::ProviderDetermination => 2,
            Self::PreliminaryChecks => 3,
            Self::BaselineObligations => 4,
            Self::SystemicRisk => 5,
            Self::Outcome => 6,
            Self::ReportDetails => 7,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Specialization => "Specialized vs. Potentially General-Purpose",
            Self::ProviderDetermination => "Provider Determination (Article 3 & 53)",
            Self::PreliminaryChecks => "Preliminary GPAI Checks (Recitals 98 & 99)",
            Self::BaselineObligations => "Detailed GPAI Compliance Checks (Article 53)",
            Self::SystemicRisk => "Systemic Risk Assessment (Articles 51, 55 & Recital 110)",
            Self::Outcome => "Scoring & Outcome",
            Self::ReportDetails => "Report Details & Provider Context (Recital 109)",
        }
    }
}

/// Identifier for every question in the fixed questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionId {
    Specialized,
    DevelopmentOrigin,
    ParamChange,
    PurposeChange,
    DataChange,
    IntegrationChange,
    ParamScale,
    TrainingScope,
    BroadAbility,
    GenerativeCap,
    TechDoc,
    Instructions,
    Copyright,
    DataSummary,
    FlopThreshold,
    SotaAdvancement,
    MassDeployment,
    HarmfulScaffolding,
    BorderlineSystemicRisk,
    RemediationPlan,
    ModelName,
    ProviderName,
    ProviderType,
    ContextJustification,
}

impl QuestionId {
    pub const ALL: [Self; 24] = [
        Self::Specialized,
        Self::DevelopmentOrigin,
        Self::ParamChange,
        Self::PurposeChange,
        Self::DataChange,
        Self::IntegrationChange,
        Self::ParamScale,
        Self::TrainingScope,
        Self::BroadAbility,
        Self::GenerativeCap,
        Self::TechDoc,
        Self::Instructions,
        Self::Copyright,
        Self::DataSummary,
        Self::FlopThreshold,
        Self::SotaAdvancement,
        Self::MassDeployment,
        Self::HarmfulScaffolding,
        Self::BorderlineSystemicRisk,
        Self::RemediationPlan,
        Self::ModelName,
        Self::ProviderName,
        Self::ProviderType,
        Self::ContextJustification,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Specialized => "specialized",
            Self::DevelopmentOrigin => "development_origin",
            Self::ParamChange => "param_change",
            Self::PurposeChange => "purpose_change",
            Self::DataChange => "data_change",
            Self::IntegrationChange => "integration_change",
            Self::ParamScale => "param_scale",
            Self::TrainingScope => "training_scope",
            Self::BroadAbility => "broad_ability",
            Self::GenerativeCap => "generative_cap",
            Self::TechDoc => "tech_doc",
            Self::Instructions => "instructions",
            Self::Copyright => "copyright",
            Self::DataSummary => "data_summary",
            Self::FlopThreshold => "flop_threshold",
            Self::SotaAdvancement => "sota_advancement",
            Self::MassDeployment => "mass_deployment",
            Self::HarmfulScaffolding => "harmful_scaffolding",
            Self::BorderlineSystemicRisk => "borderline_systemic_risk",
            Self::RemediationPlan => "remediation_plan",
            Self::ModelName => "model_name",
            Self::ProviderName => "provider_name",
            Self::ProviderType => "provider_type",
            Self::ContextJustification => "context_justification",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionId {
    type Err = InvalidResponse;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| InvalidResponse::UnknownQuestion(trimmed.to_string()))
    }
}

/// Accumulator a score-bearing question contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreKind {
    Preliminary,
    Baseline,
    Systemic,
}

impl ScoreKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Preliminary => "Preliminary Score",
            Self::Baseline => "Baseline Score",
            Self::Systemic => "Systemic Score",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpecializationVerdict {
    Specialized,
    GeneralPurposeCandidate,
}

impl SpecializationVerdict {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Specialized => "specialized",
            Self::GeneralPurposeCandidate => "general-purpose-candidate",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderStatus {
    Provider,
    NotProvider,
}

impl ProviderStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::NotProvider => "not-provider",
        }
    }
}

/// Result of the third-party modification sub-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstantialModification {
    /// Internally developed models skip the sub-check.
    NotApplicable,
    Present,
    Absent,
}

impl SubstantialModification {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotApplicable => "Not applicable (internally developed)",
            Self::Present => "Yes",
            Self::Absent => "No",
        }
    }

    pub const fn makes_provider(self) -> bool {
        !matches!(self, Self::Absent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemicRisk {
    Yes,
    No,
}

impl SystemicRisk {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes",
            Self::No => "No",
        }
    }
}

/// How the systemic-risk classification was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemicRiskBasis {
    /// Compute threshold or state-of-the-art indicator answered affirmatively.
    PresumptionIndicator,
    /// Borderline indicator count settled by the manual classification question.
    ManualOverride,
    /// At most one secondary indicator present.
    BelowIndicatorThreshold,
}

impl SystemicRiskBasis {
    pub const fn label(self) -> &'static str {
        match self {
            Self::PresumptionIndicator => "Compute threshold or high-impact indicator (Article 51)",
            Self::ManualOverride => "Manual classification of borderline indicators",
            Self::BelowIndicatorThreshold => "Indicators below systemic threshold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    Compliant,
    Provisional,
    NonCompliant,
}

impl ComplianceStatus {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Compliant => "compliant",
            Self::Provisional => "provisional",
            Self::NonCompliant => "non-compliant",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Compliant => "Compliant or Mostly Compliant with Baseline GPAI Obligations",
            Self::Provisional => "Provisionally Compliant (Some Gaps)",
            Self::NonCompliant => {
                "Non-Compliant / High Risk (Insufficient Baseline) - Remediation Needed"
            }
        }
    }

    pub const fn requires_remediation(self) -> bool {
        !matches!(self, Self::Compliant)
    }
}

/// Early-exit verdicts; no report is produced for these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Termination {
    OutOfScope,
    NotProvider,
    BelowThreshold { preliminary: Score },
}

impl Termination {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::OutOfScope => "out_of_scope",
            Self::NotProvider => "not_provider",
            Self::BelowThreshold { .. } => "below_threshold",
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Self::OutOfScope => {
                "The model is specialized and falls outside the GPAI scope (Recital 98).".to_string()
            }
            Self::NotProvider => "No substantial modifications: you are likely not the provider \
                 under Article 3 and no further GPAI obligations generally apply."
                .to_string(),
            Self::BelowThreshold { preliminary } => format!(
                "Preliminary score {preliminary} is below the GPAI threshold (Recitals 98 & 99); \
                 the model may be specialized or too small in scale."
            ),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Rejection of a submitted answer. Always recoverable by resubmitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidResponse {
    #[error("unknown question identifier '{0}'")]
    UnknownQuestion(String),
    #[error("question {received} cannot be answered yet; {expected} is pending")]
    OutOfOrder {
        expected: QuestionId,
        received: QuestionId,
    },
    #[error("question {0} is already answered; revise it instead")]
    AlreadyAnswered(QuestionId),
    #[error("question {0} is not part of the current assessment path")]
    NotOnPath(QuestionId),
    #[error("'{answer}' is not a permitted answer for {question} (expected one of: {permitted})")]
    OptionNotPermitted {
        question: QuestionId,
        answer: String,
        permitted: String,
    },
    #[error("question {0} requires a non-empty answer")]
    BlankText(QuestionId),
    #[error("question {0} must be answered before the assessment can be finalized")]
    MissingAnswer(QuestionId),
    #[error("assessment already concluded as {termination}; question {question} cannot be answered (revise an earlier answer to continue)")]
    AssessmentClosed {
        termination: Termination,
        question: QuestionId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_ids_parse_case_insensitively() {
        assert_eq!(
            " Param_Scale ".parse::<QuestionId>(),
            Ok(QuestionId::ParamScale)
        );
        assert_eq!(
            "not_a_question".parse::<QuestionId>(),
            Err(InvalidResponse::UnknownQuestion("not_a_question".to_string()))
        );
    }

    #[test]
    fn all_ids_are_indexed_in_declaration_order() {
        for (position, id) in QuestionId::ALL.into_iter().enumerate() {
            assert_eq!(id.index(), position);
        }
    }

    #[test]
    fn only_compliant_status_skips_remediation() {
        assert!(!ComplianceStatus::Compliant.requires_remediation());
        assert!(ComplianceStatus::Provisional.requires_remediation());
        assert!(ComplianceStatus::NonCompliant.requires_remediation());
    }
}
