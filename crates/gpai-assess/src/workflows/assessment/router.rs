use std::collections::BTreeMap;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

use super::classification::Classification;
use super::domain::{InvalidResponse, Termination};
use super::export::{report_file_name, ReportExporter};
use super::questionnaire::{questionnaire, Question, Questionnaire};
use super::report::{AssessmentReport, ObligationStatus};
use super::responses::ResponseSet;
use super::scoring::ScoreTally;
use super::session::{assess, AssessmentSession, Outcome, Progress, TrailEntry};

/// Router exposing the questionnaire and stateless evaluation endpoints.
pub fn assessment_router() -> Router {
    Router::new()
        .route("/api/v1/assessment/questionnaire", get(questionnaire_handler))
        .route("/api/v1/assessment/evaluate", post(evaluate_handler))
        .route("/api/v1/assessment/report", post(report_handler))
}

/// Full response set submitted by a client; each request is evaluated from scratch.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AssessmentRequest {
    #[serde(default)]
    pub responses: BTreeMap<String, String>,
    #[serde(default)]
    pub assessed_on: Option<NaiveDate>,
}

impl AssessmentRequest {
    fn assessed_on(&self) -> NaiveDate {
        self.assessed_on.unwrap_or_else(|| Local::now().date_naive())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Pending,
    Terminated,
    Completed,
}

#[derive(Debug, Serialize)]
pub struct TerminationView {
    pub termination: Termination,
    pub summary: String,
}

impl From<Termination> for TerminationView {
    fn from(termination: Termination) -> Self {
        Self {
            summary: termination.summary(),
            termination,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub status: EvaluationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<&'static Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination: Option<TerminationView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<ScoreTally>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<AssessmentReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub obligations: Vec<ObligationStatus>,
    pub trail: Vec<TrailEntry>,
}

pub(crate) async fn questionnaire_handler() -> Json<&'static Questionnaire> {
    Json(questionnaire())
}

pub(crate) async fn evaluate_handler(
    Json(request): Json<AssessmentRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    Ok(Json(evaluate_request(&request)?))
}

/// Finalize a complete response set and return the CSV report as an attachment.
pub(crate) async fn report_handler(
    Json(request): Json<AssessmentRequest>,
) -> Result<Response, AppError> {
    let responses = ResponseSet::from_raw(&request.responses)?;
    let report = match assess(responses, request.assessed_on())? {
        Outcome::Report(report) => report,
        Outcome::Terminated(termination) => return Err(AppError::Terminated(termination)),
    };

    let csv = ReportExporter::to_csv_string(&report)?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        report_file_name(&report.identity.model_name)
    );
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    )
        .into_response())
}

fn evaluate_request(request: &AssessmentRequest) -> Result<EvaluationResponse, InvalidResponse> {
    let responses = ResponseSet::from_raw(&request.responses)?;
    let session = AssessmentSession::from_responses(responses);
    let evaluation = session.evaluate();

    let mut body = EvaluationResponse {
        status: EvaluationStatus::Pending,
        next_question: None,
        termination: None,
        classification: None,
        tally: None,
        report: None,
        obligations: Vec::new(),
        trail: evaluation.trail,
    };

    match evaluation.progress {
        Progress::Pending(question) => {
            body.next_question = Some(question);
        }
        Progress::Terminated(termination) => {
            body.status = EvaluationStatus::Terminated;
            body.termination = Some(termination.into());
        }
        Progress::Ready(verdict) => {
            body.status = EvaluationStatus::Completed;
            body.classification = Some(verdict.classification);
            body.tally = Some(verdict.tally);
            if let Outcome::Report(report) = session.finalize(request.assessed_on())? {
                body.obligations = report.obligations();
                body.report = Some(*report);
            }
        }
    }

    Ok(body)
}
