pub mod classification;
pub mod domain;
mod export;
pub mod questionnaire;
mod report;
mod responses;
mod router;
pub mod scoring;
mod session;

pub use classification::Classification;
pub use domain::{
    AssessmentStage, ComplianceStatus, InvalidResponse, ProviderStatus, QuestionId, ScoreKind,
    SpecializationVerdict, SubstantialModification, SystemicRisk, SystemicRiskBasis, Termination,
};
pub use export::{report_file_name, ExportError, ReportExporter, REPORT_FILE_PREFIX};
pub use questionnaire::{questionnaire, AnswerOption, Question, QuestionKind, Questionnaire};
pub use report::{AssessmentReport, ObligationLevel, ObligationStatus, ReportField};
pub use responses::{Answer, ResponseSet};
pub use router::{
    assessment_router, AssessmentRequest, EvaluationResponse, EvaluationStatus, TerminationView,
};
pub use scoring::{Score, ScoreRange, ScoreTally};
pub use session::{
    assess, AssessmentSession, Evaluation, Outcome, Progress, ProviderIdentity, TrailEntry,
    Verdict,
};
