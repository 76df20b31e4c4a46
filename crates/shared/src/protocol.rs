use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    domain::{QuizQuestion, ResumeData},
    error::{EnvelopeError, TaskFailure},
};

/// Maximum number of `{"body": "<json>"}` layers unwrapped before giving up.
pub const MAX_ENVELOPE_DEPTH: usize = 8;

/// One request to the multiplexed task endpoint, discriminated by `task`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "camelCase")]
pub enum TaskRequest {
    #[serde(rename_all = "camelCase")]
    GenerateQuiz { file_key: String },
    #[serde(rename_all = "camelCase")]
    Summarize { file_key: String },
    #[serde(rename_all = "camelCase")]
    GenerateResume { resume_data: ResumeData },
    GenerateInterview { role: String, level: String },
    EvaluateAnswer {
        question: String,
        answer: String,
        role: String,
        level: String,
    },
    #[serde(rename_all = "camelCase")]
    AnalyzeSkillGap {
        current_skills: String,
        target_role: String,
    },
}

impl TaskRequest {
    pub fn tag(&self) -> TaskTag {
        match self {
            Self::GenerateQuiz { .. } => TaskTag::GenerateQuiz,
            Self::Summarize { .. } => TaskTag::Summarize,
            Self::GenerateResume { .. } => TaskTag::GenerateResume,
            Self::GenerateInterview { .. } => TaskTag::GenerateInterview,
            Self::EvaluateAnswer { .. } => TaskTag::EvaluateAnswer,
            Self::AnalyzeSkillGap { .. } => TaskTag::AnalyzeSkillGap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskTag {
    GenerateQuiz,
    Summarize,
    GenerateResume,
    GenerateInterview,
    EvaluateAnswer,
    AnalyzeSkillGap,
}

impl TaskTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GenerateQuiz => "generateQuiz",
            Self::Summarize => "summarize",
            Self::GenerateResume => "generateResume",
            Self::GenerateInterview => "generateInterview",
            Self::EvaluateAnswer => "evaluateAnswer",
            Self::AnalyzeSkillGap => "analyzeSkillGap",
        }
    }

    /// Fallback alert when the remote side reports failure without an `error`.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::GenerateQuiz => "Failed to generate quiz. Please try again.",
            Self::Summarize => "No summary returned.",
            Self::GenerateResume => "Failed to generate resume. Please try again.",
            Self::GenerateInterview => "Failed to generate interview questions. Please try again.",
            Self::EvaluateAnswer => "Failed to evaluate answer. Please try again.",
            Self::AnalyzeSkillGap => "Failed to analyze skill gap. Please try again.",
        }
    }

    pub fn transport_failure_message(self) -> &'static str {
        match self {
            Self::GenerateQuiz => "Error generating quiz. Check the logs for details.",
            Self::Summarize => "Summary failed.",
            Self::GenerateResume => "Error generating resume. Check the logs for details.",
            Self::GenerateInterview => "Error starting interview. Check the logs for details.",
            Self::EvaluateAnswer => "Error evaluating answer. Check the logs for details.",
            Self::AnalyzeSkillGap => "Error analyzing skill gap. Check the logs for details.",
        }
    }
}

impl fmt::Display for TaskTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unwraps transport envelopes until a flat payload remains.
///
/// A value is considered wrapped when it is an object whose `body` field is a
/// string, or when it is itself a JSON string; in both cases the string is
/// parsed as the next document.
pub fn normalize_envelope(raw: Value) -> Result<Value, EnvelopeError> {
    let mut current = raw;
    for _ in 0..MAX_ENVELOPE_DEPTH {
        let next = match wrapped_document(&current) {
            Some(text) => serde_json::from_str::<Value>(text)
                .map_err(|err| EnvelopeError::Malformed(err.to_string()))?,
            None => return Ok(current),
        };
        current = next;
    }
    if wrapped_document(&current).is_some() {
        return Err(EnvelopeError::TooDeep(MAX_ENVELOPE_DEPTH));
    }
    Ok(current)
}

fn wrapped_document(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map.get("body").and_then(Value::as_str),
        _ => None,
    }
}

/// Flat view of a task response after envelope normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResponse {
    pub success: bool,
    pub data: Map<String, Value>,
    pub error: Option<String>,
}

impl TaskResponse {
    pub fn from_raw(raw: Value) -> Result<Self, EnvelopeError> {
        normalize_envelope(raw).map(Self::from_payload)
    }

    pub fn from_payload(payload: Value) -> Self {
        let mut data = match payload {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let success = matches!(data.remove("success"), Some(Value::Bool(true)));
        let error = match data.remove("error") {
            Some(Value::String(message)) if !message.trim().is_empty() => Some(message),
            _ => None,
        };
        Self {
            success,
            data,
            error,
        }
    }

    /// Interprets the response as the success payload of `task`.
    pub fn into_success<T: TaskPayload>(self, task: TaskTag) -> Result<T, TaskFailure> {
        if !self.success {
            return Err(TaskFailure::Rejected(
                self.error
                    .unwrap_or_else(|| task.failure_message().to_string()),
            ));
        }
        for &field in T::REQUIRED_FIELDS {
            if self.data.get(field).map_or(true, Value::is_null) {
                return Err(TaskFailure::MissingField { field });
            }
        }
        let payload: T = serde_json::from_value(Value::Object(self.data))
            .map_err(|err| TaskFailure::Invalid(err.to_string()))?;
        payload.validate()?;
        Ok(payload)
    }
}

/// Typed success payload of one task kind.
pub trait TaskPayload: DeserializeOwned {
    const REQUIRED_FIELDS: &'static [&'static str];

    fn validate(&self) -> Result<(), TaskFailure> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizPayload {
    pub questions: Vec<QuizQuestion>,
}

impl TaskPayload for QuizPayload {
    const REQUIRED_FIELDS: &'static [&'static str] = &["questions"];

    fn validate(&self) -> Result<(), TaskFailure> {
        if self.questions.is_empty() {
            return Err(TaskFailure::MissingField { field: "questions" });
        }
        if let Some(bad) = self
            .questions
            .iter()
            .find(|q| q.correct_answer >= q.options.len())
        {
            return Err(TaskFailure::Invalid(format!(
                "question {} has correctAnswer {} but only {} options",
                bad.id,
                bad.correct_answer,
                bad.options.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryPayload {
    pub summary: String,
}

impl TaskPayload for SummaryPayload {
    const REQUIRED_FIELDS: &'static [&'static str] = &["summary"];
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedResume {
    pub resume: String,
    pub cover_letter: String,
}

impl TaskPayload for GeneratedResume {
    const REQUIRED_FIELDS: &'static [&'static str] = &["resume", "coverLetter"];
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InterviewPayload {
    pub questions: Vec<String>,
}

impl TaskPayload for InterviewPayload {
    const REQUIRED_FIELDS: &'static [&'static str] = &["questions"];

    fn validate(&self) -> Result<(), TaskFailure> {
        if self.questions.is_empty() {
            return Err(TaskFailure::MissingField { field: "questions" });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedbackPayload {
    pub feedback: String,
}

impl TaskPayload for FeedbackPayload {
    const REQUIRED_FIELDS: &'static [&'static str] = &["feedback"];
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillGapReport {
    pub missing_skills: Vec<String>,
    pub recommendations: Vec<String>,
    pub match_percentage: f64,
}

impl TaskPayload for SkillGapReport {
    const REQUIRED_FIELDS: &'static [&'static str] =
        &["missingSkills", "recommendations", "matchPercentage"];
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
