use super::domain::{
    ComplianceStatus, ProviderStatus, SpecializationVerdict, SubstantialModification,
    SystemicRisk, SystemicRiskBasis,
};
use super::questionnaire::AnswerOption;
use super::scoring::Score;
use serde::Serialize;

/// Preliminary scores below this value end the assessment.
pub const PRELIMINARY_THRESHOLD: u8 = 3;
/// Overall score at or above which baseline obligations are considered met.
pub const COMPLIANT_THRESHOLD: u8 = 12;
/// Overall score at or above which the provider is provisionally compliant.
pub const PROVISIONAL_THRESHOLD: u8 = 8;
/// Secondary indicator count above which the manual classification is required.
pub const BORDERLINE_INDICATOR_COUNT: u8 = 1;

/// Shown to every provider context other than a large commercial provider.
pub const PROPORTIONALITY_NOTE: &str = "Recital 109 acknowledges proportionate obligations for smaller or research-focused providers. However, you still must meet essential GPAI obligations if your model meets the criteria.";

/// Every classification derived for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub specialization_verdict: SpecializationVerdict,
    pub provider_status: ProviderStatus,
    pub substantial_modification: SubstantialModification,
    pub systemic_risk: SystemicRisk,
    pub systemic_basis: SystemicRiskBasis,
    pub compliance_status: ComplianceStatus,
}

/// Outcome of the systemic-risk rule before any manual input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemicDecision {
    Decided(SystemicRisk, SystemicRiskBasis),
    NeedsOverride,
}

pub fn specialization_verdict(answer: &AnswerOption) -> SpecializationVerdict {
    if answer.code == "specialized" {
        SpecializationVerdict::Specialized
    } else {
        SpecializationVerdict::GeneralPurposeCandidate
    }
}

/// Any affirmative modification answer makes a third-party integrator the provider.
pub fn substantial_modification<'a, I>(answers: I) -> SubstantialModification
where
    I: IntoIterator<Item = &'a AnswerOption>,
{
    if answers.into_iter().any(AnswerOption::is_affirmative) {
        SubstantialModification::Present
    } else {
        SubstantialModification::Absent
    }
}

pub fn provider_status(modification: SubstantialModification) -> ProviderStatus {
    if modification.makes_provider() {
        ProviderStatus::Provider
    } else {
        ProviderStatus::NotProvider
    }
}

pub fn meets_preliminary_threshold(preliminary: Score) -> bool {
    preliminary.value >= PRELIMINARY_THRESHOLD
}

/// The compute and frontier indicators settle the question on their own; otherwise a
/// borderline count of indicators defers to a human decision.
pub fn systemic_decision(
    flop_threshold: bool,
    sota_advancement: bool,
    systemic: Score,
) -> SystemicDecision {
    if flop_threshold || sota_advancement {
        SystemicDecision::Decided(SystemicRisk::Yes, SystemicRiskBasis::PresumptionIndicator)
    } else if systemic.value > BORDERLINE_INDICATOR_COUNT {
        SystemicDecision::NeedsOverride
    } else {
        SystemicDecision::Decided(SystemicRisk::No, SystemicRiskBasis::BelowIndicatorThreshold)
    }
}

pub fn systemic_override(answer: &AnswerOption) -> SystemicRisk {
    if answer.is_affirmative() {
        SystemicRisk::Yes
    } else {
        SystemicRisk::No
    }
}

pub fn compliance_status(overall: Score) -> ComplianceStatus {
    if overall.value >= COMPLIANT_THRESHOLD {
        ComplianceStatus::Compliant
    } else if overall.value >= PROVISIONAL_THRESHOLD {
        ComplianceStatus::Provisional
    } else {
        ComplianceStatus::NonCompliant
    }
}

pub fn proportionality_note(provider_type: &AnswerOption) -> Option<&'static str> {
    (provider_type.code != "large_commercial").then_some(PROPORTIONALITY_NOTE)
}
