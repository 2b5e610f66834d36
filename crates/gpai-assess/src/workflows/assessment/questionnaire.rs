use super::domain::{AssessmentStage, InvalidResponse, QuestionId, ScoreKind};
use super::responses::Answer;
use super::scoring::ScoreRange;
use serde::Serialize;
use std::sync::OnceLock;

/// A permitted answer with an explicit point value bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnswerOption {
    pub code: &'static str,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u8>,
}

impl AnswerOption {
    const fn scored(code: &'static str, label: &'static str, points: u8) -> Self {
        Self {
            code,
            label,
            points: Some(points),
        }
    }

    const fn plain(code: &'static str, label: &'static str) -> Self {
        Self {
            code,
            label,
            points: None,
        }
    }

    fn matches(&self, raw: &str) -> bool {
        self.code.eq_ignore_ascii_case(raw) || self.label.eq_ignore_ascii_case(raw)
    }

    pub fn is_affirmative(&self) -> bool {
        self.code == "yes"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    Choice {
        options: Vec<AnswerOption>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tally: Option<ScoreKind>,
    },
    FreeText {
        required: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: QuestionId,
    pub stage: AssessmentStage,
    pub prompt: &'static str,
    pub reference: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<&'static str>,
    pub kind: QuestionKind,
}

impl Question {
    pub fn options(&self) -> &[AnswerOption] {
        match &self.kind {
            QuestionKind::Choice { options, .. } => options,
            QuestionKind::FreeText { .. } => &[],
        }
    }

    pub fn tally(&self) -> Option<ScoreKind> {
        match &self.kind {
            QuestionKind::Choice { tally, .. } => *tally,
            QuestionKind::FreeText { .. } => None,
        }
    }

    pub fn is_free_text(&self) -> bool {
        matches!(self.kind, QuestionKind::FreeText { .. })
    }

    pub fn is_required(&self) -> bool {
        match self.kind {
            QuestionKind::Choice { .. } => true,
            QuestionKind::FreeText { required } => required,
        }
    }

    /// Validate a raw answer against the declared option set.
    ///
    /// Choice answers match an option code or label, ignoring ASCII case and
    /// surrounding whitespace.
    pub fn accept(&'static self, raw: &str) -> Result<Answer, InvalidResponse> {
        let trimmed = raw.trim();
        match &self.kind {
            QuestionKind::Choice { options, .. } => options
                .iter()
                .find(|option| option.matches(trimmed))
                .map(Answer::Choice)
                .ok_or_else(|| InvalidResponse::OptionNotPermitted {
                    question: self.id,
                    answer: trimmed.to_string(),
                    permitted: options
                        .iter()
                        .map(|option| option.label)
                        .collect::<Vec<_>>()
                        .join(", "),
                }),
            QuestionKind::FreeText { required } => {
                if *required && trimmed.is_empty() {
                    Err(InvalidResponse::BlankText(self.id))
                } else {
                    Ok(Answer::Text(trimmed.to_string()))
                }
            }
        }
    }

    fn points_range(&self) -> ScoreRange {
        let points = self.options().iter().filter_map(|option| option.points);
        let min = points.clone().min().unwrap_or(0);
        let max = points.max().unwrap_or(0);
        ScoreRange { min, max }
    }
}

/// The fixed question schema, indexed by [`QuestionId`].
#[derive(Debug, Serialize)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn standard() -> Self {
        let mut questions = standard_questions();
        questions.sort_by_key(|question| question.id.index());
        Self { questions }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question(&self, id: QuestionId) -> &Question {
        &self.questions[id.index()]
    }

    pub fn stage_questions(&self, stage: AssessmentStage) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |question| question.stage == stage)
    }

    pub(crate) fn tally_questions(&self, kind: ScoreKind) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(move |question| question.tally() == Some(kind))
    }

    /// Bounds of a tally, summed over each contributing question's option points.
    pub fn score_range(&self, kind: ScoreKind) -> ScoreRange {
        self.tally_questions(kind)
            .map(Question::points_range)
            .fold(ScoreRange { min: 0, max: 0 }, |acc, range| ScoreRange {
                min: acc.min + range.min,
                max: acc.max + range.max,
            })
    }
}

/// Process-wide questionnaire shared by every session.
pub fn questionnaire() -> &'static Questionnaire {
    static QUESTIONNAIRE: OnceLock<Questionnaire> = OnceLock::new();
    QUESTIONNAIRE.get_or_init(Questionnaire::standard)
}

fn yes_no() -> Vec<AnswerOption> {
    vec![
        AnswerOption::plain("yes", "Yes"),
        AnswerOption::plain("no", "No"),
    ]
}

fn no_yes_scored() -> Vec<AnswerOption> {
    vec![
        AnswerOption::scored("no", "No", 0),
        AnswerOption::scored("yes", "Yes", 1),
    ]
}

fn no_partly_yes() -> Vec<AnswerOption> {
    vec![
        AnswerOption::scored("no", "No", 0),
        AnswerOption::scored("partly", "Partly", 1),
        AnswerOption::scored("yes", "Yes", 2),
    ]
}

fn baseline_levels(
    none: &'static str,
    partial: &'static str,
    full: &'static str,
) -> Vec<AnswerOption> {
    vec![
        AnswerOption::scored("none", none, 0),
        AnswerOption::scored("partial", partial, 1),
        AnswerOption::scored("full", full, 2),
    ]
}

fn choice(options: Vec<AnswerOption>) -> QuestionKind {
    QuestionKind::Choice {
        options,
        tally: None,
    }
}

fn scored(options: Vec<AnswerOption>, kind: ScoreKind) -> QuestionKind {
    QuestionKind::Choice {
        options,
        tally: Some(kind),
    }
}

fn standard_questions() -> Vec<Question> {
    use AssessmentStage::*;

    vec![
        Question {
            id: QuestionId::Specialized,
            stage: Specialization,
            prompt: "Does your model appear entirely specialized (no broad or flexible capabilities)?",
            reference: "Recital 98",
            help: Some("Purely rule-based systems, small classifiers, single-purpose anomaly detection, or traditional statistical models are specialized."),
            kind: choice(vec![
                AnswerOption::plain("specialized", "Yes (Specialized/Narrow)"),
                AnswerOption::plain("general_purpose", "No (Potentially General-Purpose)"),
            ]),
        },
        Question {
            id: QuestionId::DevelopmentOrigin,
            stage: ProviderDetermination,
            prompt: "Did you develop the model internally, or is it from a third party?",
            reference: "Article 3",
            help: Some("The provider is the entity that develops or substantially modifies the model."),
            kind: choice(vec![
                AnswerOption::plain("internal", "Internally Developed"),
                AnswerOption::plain("third_party", "Third Party"),
            ]),
        },
        Question {
            id: QuestionId::ParamChange,
            stage: ProviderDetermination,
            prompt: "Have you changed >10% of parameters or model architecture?",
            reference: "Recital 109",
            help: None,
            kind: choice(yes_no()),
        },
        Question {
            id: QuestionId::PurposeChange,
            stage: ProviderDetermination,
            prompt: "Is the intended purpose or functionality significantly changed?",
            reference: "Recital 109",
            help: None,
            kind: choice(yes_no()),
        },
        Question {
            id: QuestionId::DataChange,
            stage: ProviderDetermination,
            prompt: "Have you retrained on distinctly different data (extensive fine-tuning)?",
            reference: "Recital 109",
            help: None,
            kind: choice(yes_no()),
        },
        Question {
            id: QuestionId::IntegrationChange,
            stage: ProviderDetermination,
            prompt: "Does modification significantly alter downstream integration?",
            reference: "Recital 109",
            help: None,
            kind: choice(yes_no()),
        },
        Question {
            id: QuestionId::ParamScale,
            stage: PreliminaryChecks,
            prompt: "Approximate parameter count (Recital 98, threshold ~1B)?",
            reference: "Recital 98",
            help: None,
            kind: scored(
                vec![
                    AnswerOption::scored("under_1b", "< 1B", 0),
                    AnswerOption::scored("1b_10b", "1B–10B", 1),
                    AnswerOption::scored("over_10b", "> 10B", 2),
                ],
                ScoreKind::Preliminary,
            ),
        },
        Question {
            id: QuestionId::TrainingScope,
            stage: PreliminaryChecks,
            prompt: "Was the model trained on large, diverse datasets using self-supervised or unsupervised methods?",
            reference: "Recital 98",
            help: None,
            kind: scored(no_partly_yes(), ScoreKind::Preliminary),
        },
        Question {
            id: QuestionId::BroadAbility,
            stage: PreliminaryChecks,
            prompt: "Does it perform competently on multiple distinct tasks or domains?",
            reference: "Recital 98",
            help: None,
            kind: scored(no_partly_yes(), ScoreKind::Preliminary),
        },
        Question {
            id: QuestionId::GenerativeCap,
            stage: PreliminaryChecks,
            prompt: "Does it generate adaptable content (text, images, code) across tasks?",
            reference: "Recital 99",
            help: None,
            kind: scored(no_partly_yes(), ScoreKind::Preliminary),
        },
        Question {
            id: QuestionId::TechDoc,
            stage: BaselineObligations,
            prompt: "Technical documentation: Do you have detailed documentation of training and evaluation?",
            reference: "Article 53(1)(a)",
            help: None,
            kind: scored(
                baseline_levels(
                    "Not in place (0)",
                    "Partially in place (1)",
                    "Fully in place (2)",
                ),
                ScoreKind::Baseline,
            ),
        },
        Question {
            id: QuestionId::Instructions,
            stage: BaselineObligations,
            prompt: "Downstream usage instructions and disclosures: Provided to end-users?",
            reference: "Article 53(1)(b)",
            help: None,
            kind: scored(
                baseline_levels(
                    "0 - None",
                    "1 - Some partial instructions",
                    "2 - Comprehensive guidelines",
                ),
                ScoreKind::Baseline,
            ),
        },
        Question {
            id: QuestionId::Copyright,
            stage: BaselineObligations,
            prompt: "Copyright compliance policy: Ensuring lawful use of data, references, etc.?",
            reference: "Article 53(1)(c)",
            help: None,
            kind: scored(
                baseline_levels("0 - None", "1 - Partial policy", "2 - Fully documented policy"),
                ScoreKind::Baseline,
            ),
        },
        Question {
            id: QuestionId::DataSummary,
            stage: BaselineObligations,
            prompt: "Public summary of training data: Published or available?",
            reference: "Article 53(1)(d)",
            help: None,
            kind: scored(
                baseline_levels(
                    "0 - Not published",
                    "1 - Partially available",
                    "2 - Comprehensive summary",
                ),
                ScoreKind::Baseline,
            ),
        },
        Question {
            id: QuestionId::FlopThreshold,
            stage: SystemicRisk,
            prompt: "Did training exceed ~10^25 FLOPs?",
            reference: "Article 51(2)",
            help: None,
            kind: scored(no_yes_scored(), ScoreKind::Systemic),
        },
        Question {
            id: QuestionId::SotaAdvancement,
            stage: SystemicRisk,
            prompt: "Is the model near state-of-the-art or has an equivalent high impact?",
            reference: "Article 51(1)",
            help: None,
            kind: scored(no_yes_scored(), ScoreKind::Systemic),
        },
        Question {
            id: QuestionId::MassDeployment,
            stage: SystemicRisk,
            prompt: "Is/will the model be widely deployed or integrated, potentially influencing large-scale users?",
            reference: "Recital 110",
            help: None,
            kind: scored(no_yes_scored(), ScoreKind::Systemic),
        },
        Question {
            id: QuestionId::HarmfulScaffolding,
            stage: SystemicRisk,
            prompt: "Could the model significantly enable harmful applications via generative or scaffolding features?",
            reference: "Recital 110",
            help: None,
            kind: scored(no_yes_scored(), ScoreKind::Systemic),
        },
        Question {
            id: QuestionId::BorderlineSystemicRisk,
            stage: SystemicRisk,
            prompt: "Multiple indicators of systemic impact exist but thresholds are not conclusively met. Make a final classification on systemic risk:",
            reference: "Article 51",
            help: Some("Your answer alone determines the systemic-risk classification."),
            kind: choice(vec![
                AnswerOption::plain("yes", "Yes - High Impact/Systemic"),
                AnswerOption::plain("no", "No - Not Systemic"),
            ]),
        },
        Question {
            id: QuestionId::RemediationPlan,
            stage: Outcome,
            prompt: "Justification / Remediation Plan:",
            reference: "Article 53",
            help: Some("Provide any justification or next steps for remediation."),
            kind: QuestionKind::FreeText { required: false },
        },
        Question {
            id: QuestionId::ModelName,
            stage: ReportDetails,
            prompt: "Model Name/Identifier",
            reference: "Article 53(1)(a)",
            help: None,
            kind: QuestionKind::FreeText { required: true },
        },
        Question {
            id: QuestionId::ProviderName,
            stage: ReportDetails,
            prompt: "Provider Name/Entity",
            reference: "Article 3",
            help: None,
            kind: QuestionKind::FreeText { required: false },
        },
        Question {
            id: QuestionId::ProviderType,
            stage: ReportDetails,
            prompt: "Select your organizational context",
            reference: "Recital 109",
            help: Some("Obligations can be proportionate to the provider's context."),
            kind: choice(vec![
                AnswerOption::plain("large_commercial", "Large commercial provider"),
                AnswerOption::plain("sme", "SME or startup"),
                AnswerOption::plain("academic", "Academic or non-commercial research entity"),
                AnswerOption::plain("public_sector", "Public sector / other"),
            ]),
        },
        Question {
            id: QuestionId::ContextJustification,
            stage: ReportDetails,
            prompt: "If you plan to adjust or scale obligations, explain how your context justifies it.",
            reference: "Recital 109",
            help: None,
            kind: QuestionKind::FreeText { required: false },
        },
    ]
}
