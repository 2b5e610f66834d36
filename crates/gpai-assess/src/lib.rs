//! EU AI Act general-purpose AI model assessment: questionnaire flow, scoring,
//! classification and flat report export.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
