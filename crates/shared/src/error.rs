use thiserror::Error;

use crate::protocol::TaskTag;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvelopeError {
    #[error("response document is not valid JSON: {0}")]
    Malformed(String),
    #[error("response envelope nested deeper than {0} layers")]
    TooDeep(usize),
}

/// Why a task submission did not yield a usable result.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskFailure {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("{0}")]
    Rejected(String),
    #[error("response is missing `{field}`")]
    MissingField { field: &'static str },
    #[error("response payload has an unexpected shape: {0}")]
    Invalid(String),
    #[error(transparent)]
    Envelope(#[from] EnvelopeError),
}

impl TaskFailure {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Alert text shown to the user for a failed `task`.
    pub fn user_message(&self, task: TaskTag) -> String {
        match self {
            Self::Transport(_) => task.transport_failure_message().to_string(),
            Self::Rejected(message) => message.clone(),
            Self::MissingField { .. } | Self::Invalid(_) | Self::Envelope(_) => {
                task.failure_message().to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_failures_use_generic_alert() {
        let err = TaskFailure::Transport("connection refused".into());
        assert!(err.is_transport());
        assert_eq!(
            err.user_message(TaskTag::GenerateQuiz),
            "Error generating quiz. Check the logs for details."
        );
    }

    #[test]
    fn rejected_failures_surface_remote_message() {
        let err = TaskFailure::Rejected("file too large".into());
        assert_eq!(err.user_message(TaskTag::Summarize), "file too large");
    }

    #[test]
    fn missing_fields_fall_back_to_task_message() {
        let err = TaskFailure::MissingField { field: "questions" };
        assert_eq!(
            err.user_message(TaskTag::GenerateQuiz),
            "Failed to generate quiz. Please try again."
        );
    }
}
