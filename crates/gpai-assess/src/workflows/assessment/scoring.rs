use super::domain::{QuestionId, ScoreKind};
use super::questionnaire::Questionnaire;
use super::responses::ResponseSet;
use serde::Serialize;
use std::fmt;

/// Inclusive bounds a tally can take, derived from the option points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreRange {
    pub min: u8,
    pub max: u8,
}

impl ScoreRange {
    pub const fn contains(self, value: u8) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score {
    pub value: u8,
    pub range: ScoreRange,
}

impl Score {
    pub const fn max(self) -> u8 {
        self.range.max
    }

    /// Sum of two tallies; the range widens accordingly.
    pub const fn combine(self, other: Score) -> Score {
        Score {
            value: self.value + other.value,
            range: ScoreRange {
                min: self.range.min + other.range.min,
                max: self.range.max + other.range.max,
            },
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.range.max)
    }
}

/// Tallies for a run that reached the aggregation stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreTally {
    pub preliminary: Score,
    pub baseline: Score,
    pub systemic: Score,
}

impl ScoreTally {
    pub const fn overall(&self) -> Score {
        self.preliminary.combine(self.baseline)
    }
}

/// Sums the points of every question feeding `kind`.
///
/// Returns the first unanswered contributing question when the stage is incomplete.
pub(crate) fn tally(
    questionnaire: &Questionnaire,
    responses: &ResponseSet,
    kind: ScoreKind,
) -> Result<Score, QuestionId> {
    let mut value = 0u8;
    for question in questionnaire.tally_questions(kind) {
        let points = responses
            .get(question.id)
            .and_then(|answer| answer.points())
            .ok_or(question.id)?;
        value += points;
    }

    Ok(Score {
        value,
        range: questionnaire.score_range(kind),
    })
}
