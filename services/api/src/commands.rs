use crate::infra::parse_date;
use crate::interactive::InteractiveAssessment;
use chrono::{Local, NaiveDate};
use clap::Args;
use gpai_assess::config::AppConfig;
use gpai_assess::error::AppError;
use gpai_assess::workflows::assessment::{
    assess, questionnaire, AssessmentReport, AssessmentRequest, Outcome, QuestionKind,
    ReportExporter, ResponseSet,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Default)]
pub(crate) struct OutputArgs {
    /// Directory for the exported CSV (defaults to APP_REPORT_DIR)
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// Assessment date recorded in the report (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) date: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct AssessArgs {
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// JSON file mapping question identifiers to answers
    #[arg(long)]
    pub(crate) responses: PathBuf,
    #[command(flatten)]
    pub(crate) output: OutputArgs,
}

/// Either a bare `{question: answer}` map or the HTTP request body shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ResponsesFile {
    Flat(BTreeMap<String, String>),
    Request(AssessmentRequest),
}

pub(crate) fn run_questions() -> Result<(), AppError> {
    let stdout = io::stdout();
    render_questionnaire(&mut stdout.lock())?;
    Ok(())
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut output = stdout.lock();

    let session = InteractiveAssessment::new(stdin.lock(), &mut output).run()?;
    let outcome = session.finalize(assessed_on(args.output.date))?;

    let dir = output_dir(&config, args.output.output_dir);
    conclude(&mut output, &outcome, &dir)
}

pub(crate) fn run_evaluate(args: EvaluateArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let raw = fs::read_to_string(&args.responses)?;
    let (answers, file_date) = match serde_json::from_str::<ResponsesFile>(&raw)? {
        ResponsesFile::Flat(answers) => (answers, None),
        ResponsesFile::Request(request) => (request.responses, request.assessed_on),
    };

    let responses = ResponseSet::from_raw(&answers)?;
    let outcome = assess(responses, assessed_on(args.output.date.or(file_date)))?;

    let dir = output_dir(&config, args.output.output_dir);
    let stdout = io::stdout();
    conclude(&mut stdout.lock(), &outcome, &dir)
}

fn assessed_on(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

fn output_dir(config: &AppConfig, requested: Option<PathBuf>) -> PathBuf {
    requested.unwrap_or_else(|| config.reports.output_dir.clone())
}

fn conclude<W: Write>(out: &mut W, outcome: &Outcome, dir: &Path) -> Result<(), AppError> {
    render_outcome(out, outcome)?;
    if let Outcome::Report(report) = outcome {
        let path = ReportExporter::write_to_dir(report, dir)?;
        writeln!(out, "\nReport written to {}", path.display())?;
    }
    Ok(())
}

pub(crate) fn render_questionnaire<W: Write>(out: &mut W) -> io::Result<()> {
    let mut current_stage = None;
    for question in questionnaire().questions() {
        if current_stage != Some(question.stage) {
            current_stage = Some(question.stage);
            writeln!(
                out,
                "\nStep {}: {}",
                question.stage.step(),
                question.stage.label()
            )?;
        }

        writeln!(
            out,
            "- [{}] {} ({})",
            question.id, question.prompt, question.reference
        )?;
        match &question.kind {
            QuestionKind::Choice { options, .. } => {
                for option in options {
                    match option.points {
                        Some(points) => writeln!(
                            out,
                            "    {} = {} [{} pt]",
                            option.code, option.label, points
                        )?,
                        None => writeln!(out, "    {} = {}", option.code, option.label)?,
                    }
                }
            }
            QuestionKind::FreeText { required: true } => writeln!(out, "    free text (required)")?,
            QuestionKind::FreeText { required: false } => writeln!(out, "    free text (optional)")?,
        }
    }
    Ok(())
}

pub(crate) fn render_outcome<W: Write>(out: &mut W, outcome: &Outcome) -> io::Result<()> {
    match outcome {
        Outcome::Terminated(termination) => {
            writeln!(out, "\nAssessment concluded early: {termination}")?;
            writeln!(out, "{}", termination.summary())?;
            writeln!(out, "No GPAI report was generated.")
        }
        Outcome::Report(report) => render_report(out, report),
    }
}

fn render_report<W: Write>(out: &mut W, report: &AssessmentReport) -> io::Result<()> {
    let classification = &report.classification;
    let tally = &report.tally;

    writeln!(out, "\nGPAI assessment summary")?;
    writeln!(
        out,
        "Model: {} (assessed {})",
        report.identity.model_name, report.assessed_on
    )?;
    if !report.identity.provider_name.is_empty() {
        writeln!(out, "Provider: {}", report.identity.provider_name)?;
    }
    writeln!(out, "Provider context: {}", report.identity.provider_type)?;
    if let Some(note) = report.identity.proportionality_note {
        writeln!(out, "Note: {note}")?;
    }
    writeln!(
        out,
        "Provider status: {} ({})",
        classification.provider_status.label(),
        classification.substantial_modification.label()
    )?;

    writeln!(out, "\nScores")?;
    writeln!(out, "- Preliminary: {}", tally.preliminary)?;
    writeln!(out, "- Baseline: {}", tally.baseline)?;
    writeln!(out, "- Overall: {}", tally.overall())?;
    writeln!(out, "- Systemic indicators: {}", tally.systemic)?;

    writeln!(
        out,
        "\nSystemic risk: {} ({})",
        classification.systemic_risk.label(),
        classification.systemic_basis.label()
    )?;
    writeln!(
        out,
        "Compliance status: {}",
        classification.compliance_status.label()
    )?;

    writeln!(out, "\nObligations")?;
    for obligation in report.obligations() {
        writeln!(
            out,
            "- {} {}: {}",
            obligation.article,
            obligation.topic,
            obligation.level.label()
        )?;
    }

    if let Some(plan) = report.remediation_plan.as_deref().filter(|plan| !plan.is_empty()) {
        writeln!(out, "\nRemediation plan: {plan}")?;
    }
    Ok(())
}
