//! End-to-end scenarios for the GPAI assessment flow, driven through the public session API.

use chrono::NaiveDate;
use proptest::prelude::*;

use gpai_assess::workflows::assessment::classification;
use gpai_assess::workflows::assessment::{
    assess, questionnaire, AssessmentSession, AssessmentStage, ComplianceStatus, InvalidResponse,
    Outcome, Progress, ProviderStatus, QuestionId, ResponseSet, ScoreKind,
    SubstantialModification, SystemicRisk, SystemicRiskBasis, Termination,
};

fn assessed_on() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 2).expect("valid date")
}

fn responses(pairs: &[(&str, &str)]) -> ResponseSet {
    ResponseSet::from_raw(pairs.iter().copied()).expect("valid responses")
}

const GATE_AND_INTERNAL: [(&str, &str); 2] = [
    ("specialized", "general_purpose"),
    ("development_origin", "internal"),
];

const STRONG_PRELIMINARY: [(&str, &str); 4] = [
    ("param_scale", "over_10b"),
    ("training_scope", "yes"),
    ("broad_ability", "yes"),
    ("generative_cap", "yes"),
];

const FULL_BASELINE: [(&str, &str); 4] = [
    ("tech_doc", "full"),
    ("instructions", "full"),
    ("copyright", "full"),
    ("data_summary", "full"),
];

const IDENTITY: [(&str, &str); 2] = [("model_name", "nimbus-70b"), ("provider_type", "sme")];

fn with<'a>(parts: &[&[(&'a str, &'a str)]]) -> Vec<(&'a str, &'a str)> {
    parts.iter().flat_map(|part| part.iter().copied()).collect()
}

fn systemic(
    flop: &'static str,
    sota: &'static str,
    mass: &'static str,
    harmful: &'static str,
) -> [(&'static str, &'static str); 4] {
    [
        ("flop_threshold", flop),
        ("sota_advancement", sota),
        ("mass_deployment", mass),
        ("harmful_scaffolding", harmful),
    ]
}

fn drive(session: &mut AssessmentSession, pairs: &[(&str, &str)]) -> Progress {
    let mut progress = session.progress();
    for (id, answer) in pairs {
        let id: QuestionId = id.parse().expect("known question");
        progress = session.submit(id, answer).expect("answer accepted");
    }
    progress
}

#[test]
fn specialized_models_end_at_the_gate() {
    let mut session = AssessmentSession::new();
    let progress = drive(&mut session, &[("specialized", "specialized")]);

    assert_eq!(progress, Progress::Terminated(Termination::OutOfScope));
    assert_eq!(session.trail().len(), 1);
    assert!(session.current_question().is_none());

    let outcome = session.finalize(assessed_on()).expect("finalizes");
    assert_eq!(outcome, Outcome::Terminated(Termination::OutOfScope));
}

#[test]
fn third_party_without_modifications_is_not_the_provider() {
    let outcome = assess(
        responses(&[
            ("specialized", "general_purpose"),
            ("development_origin", "third_party"),
            ("param_change", "no"),
            ("purpose_change", "no"),
            ("data_change", "no"),
            ("integration_change", "no"),
        ]),
        assessed_on(),
    )
    .expect("complete path");

    assert_eq!(outcome, Outcome::Terminated(Termination::NotProvider));
}

#[test]
fn any_substantial_modification_makes_the_integrator_the_provider() {
    let mut session = AssessmentSession::new();
    let progress = drive(
        &mut session,
        &[
            ("specialized", "general_purpose"),
            ("development_origin", "third_party"),
            ("param_change", "no"),
            ("purpose_change", "no"),
            ("data_change", "yes"),
            ("integration_change", "no"),
        ],
    );

    assert_eq!(
        progress.pending_question().map(|question| question.id),
        Some(QuestionId::ParamScale)
    );
}

#[test]
fn low_preliminary_scores_terminate_before_baseline() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &[
            ("param_scale", "under_1b"),
            ("training_scope", "partly"),
            ("broad_ability", "no"),
            ("generative_cap", "partly"),
        ],
    ]);
    let session = AssessmentSession::from_responses(responses(&pairs));

    match session.progress() {
        Progress::Terminated(Termination::BelowThreshold { preliminary }) => {
            assert_eq!(preliminary.value, 2);
            assert_eq!(preliminary.max(), 8);
        }
        other => panic!("expected below-threshold termination, got {other:?}"),
    }
    assert!(session
        .trail()
        .iter()
        .all(|entry| entry.stage != AssessmentStage::BaselineObligations));
}

#[test]
fn answers_beyond_a_low_preliminary_score_are_ignored() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &[
            ("param_scale", "under_1b"),
            ("training_scope", "partly"),
            ("broad_ability", "no"),
            ("generative_cap", "partly"),
        ],
        &FULL_BASELINE,
        &systemic("yes", "yes", "yes", "yes"),
        &[("borderline_systemic_risk", "yes")],
        &IDENTITY,
    ]);

    let outcome = assess(responses(&pairs), assessed_on()).expect("path complete");
    match outcome {
        Outcome::Terminated(Termination::BelowThreshold { preliminary }) => {
            assert_eq!(preliminary.value, 2);
        }
        other => panic!("expected below-threshold termination, got {other:?}"),
    }
}

#[test]
fn preliminary_score_of_three_passes_the_threshold() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &[
            ("param_scale", "1b_10b"),
            ("training_scope", "partly"),
            ("broad_ability", "partly"),
            ("generative_cap", "no"),
        ],
    ]);
    let session = AssessmentSession::from_responses(responses(&pairs));

    assert_eq!(
        session.current_question().map(|question| question.id),
        Some(QuestionId::TechDoc)
    );
}

#[test]
fn compute_presumption_classifies_systemic_risk_without_override() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("yes", "no", "yes", "yes"),
        &IDENTITY,
    ]);

    let Outcome::Report(report) = assess(responses(&pairs), assessed_on()).expect("report") else {
        panic!("expected report");
    };
    assert_eq!(report.classification.systemic_risk, SystemicRisk::Yes);
    assert_eq!(
        report.classification.systemic_basis,
        SystemicRiskBasis::PresumptionIndicator
    );
    assert!(report.answer(QuestionId::BorderlineSystemicRisk).is_none());
}

#[test]
fn borderline_indicators_require_a_manual_decision() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("no", "no", "yes", "yes"),
    ]);
    let mut session = AssessmentSession::from_responses(responses(&pairs));

    assert_eq!(
        session.current_question().map(|question| question.id),
        Some(QuestionId::BorderlineSystemicRisk)
    );

    for (decision, expected) in [("yes", SystemicRisk::Yes), ("no", SystemicRisk::No)] {
        let mut branch = session.clone();
        branch
            .submit(QuestionId::BorderlineSystemicRisk, decision)
            .expect("override accepted");
        branch.submit(QuestionId::ModelName, "nimbus-70b").expect("name");
        branch.submit(QuestionId::ProviderName, "").expect("optional name");
        branch.submit(QuestionId::ProviderType, "academic").expect("type");
        let progress = branch
            .submit(QuestionId::ContextJustification, "")
            .expect("optional justification");

        let Progress::Ready(verdict) = progress else {
            panic!("expected ready verdict");
        };
        assert_eq!(verdict.classification.systemic_risk, expected);
        assert_eq!(
            verdict.classification.systemic_basis,
            SystemicRiskBasis::ManualOverride
        );
        assert_eq!(verdict.tally.systemic.value, 2);
    }

    session
        .submit(QuestionId::BorderlineSystemicRisk, "Yes - High Impact/Systemic")
        .expect("label accepted");
    assert_eq!(
        session.current_question().map(|question| question.id),
        Some(QuestionId::ModelName)
    );
}

#[test]
fn single_secondary_indicator_is_not_systemic() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("no", "no", "no", "yes"),
        &IDENTITY,
    ]);

    let Outcome::Report(report) = assess(responses(&pairs), assessed_on()).expect("report") else {
        panic!("expected report");
    };
    assert_eq!(report.classification.systemic_risk, SystemicRisk::No);
    assert_eq!(
        report.classification.systemic_basis,
        SystemicRiskBasis::BelowIndicatorThreshold
    );
}

#[test]
fn compliance_bands_follow_the_overall_score() {
    let cases: [(&[(&str, &str)], u8, ComplianceStatus); 3] = [
        (&FULL_BASELINE, 16, ComplianceStatus::Compliant),
        (
            &[
                ("tech_doc", "none"),
                ("instructions", "none"),
                ("copyright", "none"),
                ("data_summary", "none"),
            ],
            8,
            ComplianceStatus::Provisional,
        ),
        (
            &[
                ("tech_doc", "none"),
                ("instructions", "none"),
                ("copyright", "none"),
                ("data_summary", "none"),
            ],
            3,
            ComplianceStatus::NonCompliant,
        ),
    ];

    for (baseline, expected_overall, expected_status) in cases {
        let preliminary: &[(&str, &str)] = if expected_overall == 3 {
            &[
                ("param_scale", "1b_10b"),
                ("training_scope", "partly"),
                ("broad_ability", "partly"),
                ("generative_cap", "no"),
            ]
        } else {
            &STRONG_PRELIMINARY
        };
        let pairs = with(&[
            &GATE_AND_INTERNAL,
            preliminary,
            baseline,
            &systemic("no", "no", "no", "no"),
            &IDENTITY,
        ]);

        let Outcome::Report(report) = assess(responses(&pairs), assessed_on()).expect("report")
        else {
            panic!("expected report");
        };
        assert_eq!(report.tally.overall().value, expected_overall);
        assert_eq!(report.classification.compliance_status, expected_status);
        assert_eq!(
            report.remediation_plan.is_some(),
            expected_status.requires_remediation()
        );
    }
}

#[test]
fn remediation_plan_is_only_requested_when_gaps_exist() {
    let compliant = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("no", "no", "no", "no"),
    ]);
    let session = AssessmentSession::from_responses(responses(&compliant));
    assert_eq!(
        session.current_question().map(|question| question.id),
        Some(QuestionId::ModelName)
    );

    let gaps = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &[
            ("tech_doc", "partial"),
            ("instructions", "none"),
            ("copyright", "none"),
            ("data_summary", "partial"),
        ],
        &systemic("no", "no", "no", "no"),
    ]);
    let session = AssessmentSession::from_responses(responses(&gaps));
    assert_eq!(
        session.current_question().map(|question| question.id),
        Some(QuestionId::RemediationPlan)
    );
}

#[test]
fn internally_developed_models_skip_modification_questions() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("no", "no", "no", "no"),
        &IDENTITY,
    ]);
    let Outcome::Report(report) = assess(responses(&pairs), assessed_on()).expect("report") else {
        panic!("expected report");
    };

    assert_eq!(report.classification.provider_status, ProviderStatus::Provider);
    assert_eq!(
        report.classification.substantial_modification,
        SubstantialModification::NotApplicable
    );
    assert!(report.answer(QuestionId::ParamChange).is_none());
    assert_eq!(report.identity.provider_name, "");
    assert_eq!(report.assessed_on, assessed_on());
}

#[test]
fn out_of_order_and_off_path_submissions_leave_state_untouched() {
    let mut session = AssessmentSession::new();
    drive(&mut session, &GATE_AND_INTERNAL);
    let before = session.responses().clone();

    assert_eq!(
        session.submit(QuestionId::TechDoc, "full"),
        Err(InvalidResponse::OutOfOrder {
            expected: QuestionId::ParamScale,
            received: QuestionId::TechDoc,
        })
    );
    assert_eq!(
        session.submit(QuestionId::Specialized, "general_purpose"),
        Err(InvalidResponse::AlreadyAnswered(QuestionId::Specialized))
    );
    assert!(matches!(
        session.submit(QuestionId::ParamScale, "several billion"),
        Err(InvalidResponse::OptionNotPermitted { .. })
    ));
    assert_eq!(session.responses(), &before);
}

#[test]
fn terminated_sessions_reject_new_answers_but_accept_revisions() {
    let mut session = AssessmentSession::new();
    drive(&mut session, &[("specialized", "specialized")]);

    assert!(matches!(
        session.submit(QuestionId::DevelopmentOrigin, "internal"),
        Err(InvalidResponse::AssessmentClosed {
            termination: Termination::OutOfScope,
            ..
        })
    ));
    assert_eq!(
        session.revise(QuestionId::DevelopmentOrigin, "internal"),
        Err(InvalidResponse::NotOnPath(QuestionId::DevelopmentOrigin))
    );

    let progress = session
        .revise(QuestionId::Specialized, "general_purpose")
        .expect("gate revision accepted");
    assert_eq!(
        progress.pending_question().map(|question| question.id),
        Some(QuestionId::DevelopmentOrigin)
    );
    drive(&mut session, &[("development_origin", "internal")]);
    assert_eq!(session.current_question().map(|question| question.id), Some(QuestionId::ParamScale));
}

#[test]
fn raising_a_low_preliminary_answer_resumes_the_flow() {
    let mut session = AssessmentSession::new();
    let progress = drive(
        &mut session,
        &with(&[
            &GATE_AND_INTERNAL,
            &[
                ("param_scale", "under_1b"),
                ("training_scope", "no"),
                ("broad_ability", "partly"),
                ("generative_cap", "no"),
            ],
        ]),
    );
    assert!(matches!(
        progress,
        Progress::Terminated(Termination::BelowThreshold { .. })
    ));

    let progress = session
        .revise(QuestionId::ParamScale, "over_10b")
        .expect("revision accepted");
    assert_eq!(
        progress.pending_question().map(|question| question.id),
        Some(QuestionId::TechDoc)
    );
}

#[test]
fn revising_the_origin_recomputes_the_path() {
    let mut session = AssessmentSession::new();
    drive(
        &mut session,
        &[
            ("specialized", "general_purpose"),
            ("development_origin", "third_party"),
            ("param_change", "yes"),
            ("purpose_change", "no"),
            ("data_change", "no"),
            ("integration_change", "no"),
            ("param_scale", "over_10b"),
        ],
    );
    assert_eq!(session.trail().len(), 7);

    let progress = session
        .revise(QuestionId::DevelopmentOrigin, "internal")
        .expect("revision accepted");

    assert_eq!(
        progress.pending_question().map(|question| question.id),
        Some(QuestionId::TrainingScope)
    );
    let trail: Vec<QuestionId> = session.trail().iter().map(|entry| entry.question).collect();
    assert_eq!(
        trail,
        vec![
            QuestionId::Specialized,
            QuestionId::DevelopmentOrigin,
            QuestionId::ParamScale
        ]
    );
    assert_eq!(
        session.revise(QuestionId::ParamChange, "no"),
        Err(InvalidResponse::NotOnPath(QuestionId::ParamChange))
    );
}

#[test]
fn finalize_requires_every_question_on_the_path() {
    let session = AssessmentSession::from_responses(responses(&GATE_AND_INTERNAL));
    assert_eq!(
        session.finalize(assessed_on()),
        Err(InvalidResponse::MissingAnswer(QuestionId::ParamScale))
    );
}

#[test]
fn blank_model_name_is_rejected() {
    let pairs = with(&[
        &GATE_AND_INTERNAL,
        &STRONG_PRELIMINARY,
        &FULL_BASELINE,
        &systemic("no", "no", "no", "no"),
    ]);
    let mut session = AssessmentSession::from_responses(responses(&pairs));

    assert_eq!(
        session.submit(QuestionId::ModelName, "   "),
        Err(InvalidResponse::BlankText(QuestionId::ModelName))
    );
}

fn choice_codes(id: QuestionId) -> Vec<&'static str> {
    questionnaire()
        .question(id)
        .options()
        .iter()
        .map(|option| option.code)
        .collect()
}

fn scored_answers() -> impl Strategy<Value = Vec<(QuestionId, &'static str)>> {
    let scored: Vec<QuestionId> = QuestionId::ALL
        .into_iter()
        .filter(|id| questionnaire().question(*id).tally().is_some())
        .collect();
    let strategies: Vec<_> = scored
        .into_iter()
        .map(|id| proptest::sample::select(choice_codes(id)).prop_map(move |code| (id, code)))
        .collect();
    strategies
}

proptest! {
    #[test]
    fn tallies_stay_within_their_ranges(answers in scored_answers(), override_yes in any::<bool>()) {
        let mut pairs: Vec<(String, String)> = GATE_AND_INTERNAL
            .iter()
            .chain(IDENTITY.iter())
            .map(|(id, answer)| (id.to_string(), answer.to_string()))
            .collect();
        pairs.extend(answers.iter().map(|(id, code)| (id.to_string(), code.to_string())));
        pairs.push((
            "borderline_systemic_risk".to_string(),
            if override_yes { "yes" } else { "no" }.to_string(),
        ));

        // The override is ignored whenever the indicators settle the classification.
        let set = ResponseSet::from_raw(pairs).expect("valid responses");

        match assess(set, assessed_on()).expect("complete response set") {
            Outcome::Terminated(Termination::BelowThreshold { preliminary }) => {
                prop_assert!(preliminary.value < 3);
                prop_assert!(preliminary.range.contains(preliminary.value));
            }
            Outcome::Terminated(other) => {
                prop_assert!(false, "unexpected termination {other:?}");
            }
            Outcome::Report(report) => {
                let tally = report.tally;
                for (kind, score) in [
                    (ScoreKind::Preliminary, tally.preliminary),
                    (ScoreKind::Baseline, tally.baseline),
                    (ScoreKind::Systemic, tally.systemic),
                ] {
                    prop_assert_eq!(score.range, questionnaire().score_range(kind));
                    prop_assert!(score.range.contains(score.value));
                }
                prop_assert!(tally.preliminary.value >= 3);
                prop_assert_eq!(tally.overall().max(), 16);
                prop_assert_eq!(
                    report.remediation_plan.is_some(),
                    report.classification.compliance_status.requires_remediation()
                );

                let affirmative = |id: QuestionId| {
                    answers.iter().any(|(question, code)| *question == id && *code == "yes")
                };
                let indicators = [
                    QuestionId::FlopThreshold,
                    QuestionId::SotaAdvancement,
                    QuestionId::MassDeployment,
                    QuestionId::HarmfulScaffolding,
                ]
                .into_iter()
                .filter(|id| affirmative(*id))
                .count();
                prop_assert_eq!(usize::from(tally.systemic.value), indicators);

                let verdict = report.classification;
                let expected = if affirmative(QuestionId::FlopThreshold)
                    || affirmative(QuestionId::SotaAdvancement)
                {
                    (SystemicRisk::Yes, SystemicRiskBasis::PresumptionIndicator)
                } else if indicators > 1 {
                    let risk = if override_yes { SystemicRisk::Yes } else { SystemicRisk::No };
                    (risk, SystemicRiskBasis::ManualOverride)
                } else {
                    (SystemicRisk::No, SystemicRiskBasis::BelowIndicatorThreshold)
                };
                prop_assert_eq!((verdict.systemic_risk, verdict.systemic_basis), expected);

                let overall = tally.overall().value;
                let status = if overall >= 12 {
                    ComplianceStatus::Compliant
                } else if overall >= 8 {
                    ComplianceStatus::Provisional
                } else {
                    ComplianceStatus::NonCompliant
                };
                prop_assert_eq!(verdict.compliance_status, status);
                prop_assert_eq!(
                    verdict.compliance_status,
                    classification::compliance_status(tally.overall())
                );
            }
        }
    }
}
