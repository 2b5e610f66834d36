use super::classification::{self, Classification, SystemicDecision};
use super::domain::{
    AssessmentStage, InvalidResponse, QuestionId, ScoreKind, SpecializationVerdict,
    SubstantialModification, SystemicRisk, SystemicRiskBasis, Termination,
};
use super::questionnaire::{questionnaire, AnswerOption, Question, Questionnaire};
use super::report::AssessmentReport;
use super::responses::{Answer, ResponseSet};
use super::scoring::{self, Score, ScoreTally};
use chrono::NaiveDate;
use serde::Serialize;
use std::ops::ControlFlow;
use tracing::{debug, info, warn};

const MODIFICATION_QUESTIONS: [QuestionId; 4] = [
    QuestionId::ParamChange,
    QuestionId::PurposeChange,
    QuestionId::DataChange,
    QuestionId::IntegrationChange,
];

/// One visited question on the current path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrailEntry {
    pub stage: AssessmentStage,
    pub question: QuestionId,
    pub answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u8>,
}

/// Free-text and context fields identifying the assessed model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderIdentity {
    pub model_name: String,
    pub provider_name: String,
    pub provider_type: String,
    pub context_justification: String,
    /// Recital 109 reminder for providers outside the large commercial context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proportionality_note: Option<&'static str>,
}

/// Everything derived for a run that answered every question on its path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub classification: Classification,
    pub tally: ScoreTally,
    pub identity: ProviderIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation_plan: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The workflow is suspended on this question.
    Pending(&'static Question),
    Terminated(Termination),
    /// All questions on the path are answered; the report can be generated.
    Ready(Box<Verdict>),
}

impl Progress {
    pub fn pending_question(&self) -> Option<&'static Question> {
        match self {
            Progress::Pending(question) => Some(*question),
            _ => None,
        }
    }
}

/// Terminal artifact of a finalized session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Terminated(Termination),
    Report(Box<AssessmentReport>),
}

/// Snapshot of a walk over the response set.
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub progress: Progress,
    pub trail: Vec<TrailEntry>,
}

enum Stop {
    Pending(QuestionId),
    Terminated(Termination),
}

/// Walks the stages in order, stopping at the first unanswered question or early exit.
struct Walker<'a> {
    questionnaire: &'static Questionnaire,
    responses: &'a ResponseSet,
    trail: Vec<TrailEntry>,
}

impl<'a> Walker<'a> {
    fn new(responses: &'a ResponseSet) -> Self {
        Self {
            questionnaire: questionnaire(),
            responses,
            trail: Vec::new(),
        }
    }

    fn answer(&mut self, id: QuestionId) -> ControlFlow<Stop, &'a Answer> {
        let Some(answer) = self.responses.get(id) else {
            return ControlFlow::Break(Stop::Pending(id));
        };

        self.trail.push(TrailEntry {
            stage: self.questionnaire.question(id).stage,
            question: id,
            answer: answer.label().to_string(),
            points: answer.points(),
        });
        ControlFlow::Continue(answer)
    }

    fn choice(&mut self, id: QuestionId) -> ControlFlow<Stop, &'static AnswerOption> {
        match self.answer(id)? {
            Answer::Choice(option) => ControlFlow::Continue(*option),
            Answer::Text(_) => ControlFlow::Break(Stop::Pending(id)),
        }
    }

    fn text(&mut self, id: QuestionId) -> ControlFlow<Stop, String> {
        let answer = self.answer(id)?;
        ControlFlow::Continue(answer.label().to_string())
    }

    fn tally(&mut self, kind: ScoreKind) -> ControlFlow<Stop, Score> {
        let questionnaire = self.questionnaire;
        for question in questionnaire.tally_questions(kind) {
            self.choice(question.id)?;
        }
        match scoring::tally(questionnaire, self.responses, kind) {
            Ok(score) => ControlFlow::Continue(score),
            Err(missing) => ControlFlow::Break(Stop::Pending(missing)),
        }
    }

    fn run(&mut self) -> ControlFlow<Stop, Verdict> {
        let specialization =
            classification::specialization_verdict(self.choice(QuestionId::Specialized)?);
        if specialization == SpecializationVerdict::Specialized {
            return ControlFlow::Break(Stop::Terminated(Termination::OutOfScope));
        }

        let substantial_modification = self.provider_gate()?;
        let provider_status = classification::provider_status(substantial_modification);

        let preliminary = self.tally(ScoreKind::Preliminary)?;
        if !classification::meets_preliminary_threshold(preliminary) {
            return ControlFlow::Break(Stop::Terminated(Termination::BelowThreshold {
                preliminary,
            }));
        }

        let baseline = self.tally(ScoreKind::Baseline)?;
        let systemic = self.tally(ScoreKind::Systemic)?;
        let (systemic_risk, systemic_basis) = self.systemic_classification(systemic)?;

        let tally = ScoreTally {
            preliminary,
            baseline,
            systemic,
        };
        let compliance_status = classification::compliance_status(tally.overall());
        let remediation_plan = if compliance_status.requires_remediation() {
            Some(self.text(QuestionId::RemediationPlan)?)
        } else {
            None
        };

        let model_name = self.text(QuestionId::ModelName)?;
        let provider_name = self.text(QuestionId::ProviderName)?;
        let provider_type = self.choice(QuestionId::ProviderType)?;
        let identity = ProviderIdentity {
            model_name,
            provider_name,
            provider_type: provider_type.label.to_string(),
            context_justification: self.text(QuestionId::ContextJustification)?,
            proportionality_note: classification::proportionality_note(provider_type),
        };

        ControlFlow::Continue(Verdict {
            classification: Classification {
                specialization_verdict: specialization,
                provider_status,
                substantial_modification,
                systemic_risk,
                systemic_basis,
                compliance_status,
            },
            tally,
            identity,
            remediation_plan,
        })
    }

    fn provider_gate(&mut self) -> ControlFlow<Stop, SubstantialModification> {
        let origin = self.choice(QuestionId::DevelopmentOrigin)?;
        if origin.code == "internal" {
            return ControlFlow::Continue(SubstantialModification::NotApplicable);
        }

        let mut answers = Vec::with_capacity(MODIFICATION_QUESTIONS.len());
        for id in MODIFICATION_QUESTIONS {
            answers.push(self.choice(id)?);
        }

        let modification = classification::substantial_modification(answers);
        if modification.makes_provider() {
            ControlFlow::Continue(modification)
        } else {
            ControlFlow::Break(Stop::Terminated(Termination::NotProvider))
        }
    }

    fn systemic_classification(
        &mut self,
        systemic: Score,
    ) -> ControlFlow<Stop, (SystemicRisk, SystemicRiskBasis)> {
        let flop = self.is_affirmative(QuestionId::FlopThreshold);
        let sota = self.is_affirmative(QuestionId::SotaAdvancement);

        match classification::systemic_decision(flop, sota, systemic) {
            SystemicDecision::Decided(risk, basis) => ControlFlow::Continue((risk, basis)),
            SystemicDecision::NeedsOverride => {
                let decision = self.choice(QuestionId::BorderlineSystemicRisk)?;
                ControlFlow::Continue((
                    classification::systemic_override(decision),
                    SystemicRiskBasis::ManualOverride,
                ))
            }
        }
    }

    fn is_affirmative(&self, id: QuestionId) -> bool {
        self.responses
            .get(id)
            .map(Answer::is_affirmative)
            .unwrap_or(false)
    }
}

fn evaluate(responses: &ResponseSet) -> Evaluation {
    let mut walker = Walker::new(responses);
    let progress = match walker.run() {
        ControlFlow::Continue(verdict) => Progress::Ready(Box::new(verdict)),
        ControlFlow::Break(Stop::Pending(id)) => {
            Progress::Pending(walker.questionnaire.question(id))
        }
        ControlFlow::Break(Stop::Terminated(termination)) => Progress::Terminated(termination),
    };

    Evaluation {
        progress,
        trail: walker.trail,
    }
}

/// A single assessment run. Owns its responses; everything else is derived on demand.
#[derive(Debug, Clone, Default)]
pub struct AssessmentSession {
    responses: ResponseSet,
}

impl AssessmentSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_responses(responses: ResponseSet) -> Self {
        Self { responses }
    }

    pub fn responses(&self) -> &ResponseSet {
        &self.responses
    }

    pub fn evaluate(&self) -> Evaluation {
        evaluate(&self.responses)
    }

    pub fn progress(&self) -> Progress {
        self.evaluate().progress
    }

    pub fn trail(&self) -> Vec<TrailEntry> {
        self.evaluate().trail
    }

    pub fn current_question(&self) -> Option<&'static Question> {
        self.progress().pending_question()
    }

    /// Answer the pending question. Any other question is rejected without mutating state.
    pub fn submit(&mut self, id: QuestionId, raw: &str) -> Result<Progress, InvalidResponse> {
        let evaluation = self.evaluate();
        let result = match &evaluation.progress {
            Progress::Pending(question) if question.id == id => self.store(id, raw),
            Progress::Terminated(termination) => Err(InvalidResponse::AssessmentClosed {
                termination: *termination,
                question: id,
            }),
            Progress::Pending(question) => {
                if on_trail(&evaluation.trail, id) {
                    Err(InvalidResponse::AlreadyAnswered(id))
                } else {
                    Err(InvalidResponse::OutOfOrder {
                        expected: question.id,
                        received: id,
                    })
                }
            }
            Progress::Ready(_) => {
                if on_trail(&evaluation.trail, id) {
                    Err(InvalidResponse::AlreadyAnswered(id))
                } else {
                    Err(InvalidResponse::NotOnPath(id))
                }
            }
        };

        self.after_change(id, result)
    }

    /// Change an answer already on the current path. The flow is recomputed afterwards, so
    /// answers that fall off the path no longer count. A terminated session reopens when the
    /// revised answer no longer ends it.
    pub fn revise(&mut self, id: QuestionId, raw: &str) -> Result<Progress, InvalidResponse> {
        let evaluation = self.evaluate();
        let result = if on_trail(&evaluation.trail, id) {
            self.store(id, raw)
        } else {
            Err(InvalidResponse::NotOnPath(id))
        };

        self.after_change(id, result)
    }

    /// Default every unanswered optional free-text question on the path to an empty answer.
    pub fn skip_optional_text(&mut self) -> Progress {
        loop {
            let progress = self.progress();
            match progress {
                Progress::Pending(question) if question.is_free_text() && !question.is_required() => {
                    self.responses
                        .insert(question.id, Answer::Text(String::new()));
                }
                other => return other,
            }
        }
    }

    /// Close the session and produce its terminal artifact.
    pub fn finalize(self, assessed_on: NaiveDate) -> Result<Outcome, InvalidResponse> {
        let Evaluation { progress, trail } = self.evaluate();
        match progress {
            Progress::Pending(question) => Err(InvalidResponse::MissingAnswer(question.id)),
            Progress::Terminated(termination) => {
                info!(verdict = %termination, "assessment terminated early");
                Ok(Outcome::Terminated(termination))
            }
            Progress::Ready(verdict) => {
                let report = AssessmentReport::new(*verdict, trail, assessed_on);
                info!(
                    model = %report.identity.model_name,
                    compliance = report.classification.compliance_status.code(),
                    systemic_risk = report.classification.systemic_risk.label(),
                    "assessment report generated"
                );
                Ok(Outcome::Report(Box::new(report)))
            }
        }
    }

    fn store(&mut self, id: QuestionId, raw: &str) -> Result<(), InvalidResponse> {
        let answer = questionnaire().question(id).accept(raw)?;
        debug!(question = %id, answer = answer.label(), "response recorded");
        self.responses.insert(id, answer);
        Ok(())
    }

    fn after_change(
        &self,
        id: QuestionId,
        result: Result<(), InvalidResponse>,
    ) -> Result<Progress, InvalidResponse> {
        match result {
            Ok(()) => Ok(self.progress()),
            Err(err) => {
                warn!(question = %id, error = %err, "response rejected");
                Err(err)
            }
        }
    }
}

fn on_trail(trail: &[TrailEntry], id: QuestionId) -> bool {
    trail.iter().any(|entry| entry.question == id)
}

/// Evaluate a complete response set in one pass.
///
/// Optional free-text questions left unanswered default to empty text.
pub fn assess(responses: ResponseSet, assessed_on: NaiveDate) -> Result<Outcome, InvalidResponse> {
    let mut session = AssessmentSession::from_responses(responses);
    session.skip_optional_text();
    session.finalize(assessed_on)
}
