use super::domain::{InvalidResponse, QuestionId};
use super::questionnaire::{questionnaire, AnswerOption};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A validated answer to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Choice(&'static AnswerOption),
    Text(String),
}

impl Answer {
    pub fn points(&self) -> Option<u8> {
        match self {
            Answer::Choice(option) => option.points,
            Answer::Text(_) => None,
        }
    }

    /// Human-readable value used in reports.
    pub fn label(&self) -> &str {
        match self {
            Answer::Choice(option) => option.label,
            Answer::Text(text) => text,
        }
    }

    pub fn code(&self) -> Option<&'static str> {
        match self {
            Answer::Choice(option) => Some(option.code),
            Answer::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Answer::Text(text) => Some(text),
            Answer::Choice(_) => None,
        }
    }

    pub fn is_affirmative(&self) -> bool {
        matches!(self, Answer::Choice(option) if option.is_affirmative())
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Answer::Choice(option) => serializer.serialize_str(option.code),
            Answer::Text(text) => serializer.serialize_str(text),
        }
    }
}

/// Answers collected so far, keyed by question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseSet {
    answers: BTreeMap<QuestionId, Answer>,
}

impl ResponseSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a response set from raw `question -> answer` pairs, validating each entry.
    pub fn from_raw<I, K, V>(entries: I) -> Result<Self, InvalidResponse>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut responses = Self::new();
        for (question, answer) in entries {
            let id = question.as_ref().parse::<QuestionId>()?;
            responses.record(id, answer.as_ref())?;
        }
        Ok(responses)
    }

    /// Validate `raw` against the question's option set and store it, replacing any prior answer.
    pub fn record(&mut self, id: QuestionId, raw: &str) -> Result<&Answer, InvalidResponse> {
        let answer = questionnaire().question(id).accept(raw)?;
        self.answers.insert(id, answer);
        Ok(&self.answers[&id])
    }

    pub fn get(&self, id: QuestionId) -> Option<&Answer> {
        self.answers.get(&id)
    }

    pub fn contains(&self, id: QuestionId) -> bool {
        self.answers.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (QuestionId, &Answer)> {
        self.answers.iter().map(|(id, answer)| (*id, answer))
    }

    pub(crate) fn insert(&mut self, id: QuestionId, answer: Answer) {
        self.answers.insert(id, answer);
    }
}
