//! Backend results fed back into the controller, and user-facing errors.

use shared::{
    domain::{FileEntry, Purpose},
    error::TaskFailure,
    protocol::{TaskRequest, TaskResponse, TaskTag},
};

use crate::session::SessionStatus;

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SessionChecked {
        generation: u64,
        status: SessionStatus,
    },
    SignedOut,
    FilesListed {
        purpose: Purpose,
        prefix: String,
        files: Vec<FileEntry>,
    },
    Uploaded {
        purpose: Purpose,
        key: String,
    },
    UploadFailed {
        purpose: Purpose,
        reason: String,
    },
    FileDeleted {
        purpose: Purpose,
        key: String,
    },
    DeleteFailed {
        key: String,
        reason: String,
    },
    DownloadReady {
        key: String,
        url: String,
    },
    DownloadFailed {
        key: String,
        reason: String,
    },
    TaskCompleted {
        request: TaskRequest,
        outcome: Result<TaskResponse, TaskFailure>,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Remote,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Session,
    Listing,
    Upload,
    Quiz,
    Summary,
    Resume,
    Interview,
    SkillGap,
    Download,
}

impl UiErrorContext {
    pub fn for_task(task: TaskTag) -> Self {
        match task {
            TaskTag::GenerateQuiz => Self::Quiz,
            TaskTag::Summarize => Self::Summary,
            TaskTag::GenerateResume => Self::Resume,
            TaskTag::GenerateInterview | TaskTag::EvaluateAnswer => Self::Interview,
            TaskTag::AnalyzeSkillGap => Self::SkillGap,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn new(
        category: UiErrorCategory,
        context: UiErrorContext,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category,
            context,
            message: message.into(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("notauthorized")
            || lower.contains("forbidden")
            || lower.contains("signed out")
            || lower.contains("invalid token")
        {
            UiErrorCategory::Auth
        } else if lower.contains("timeout")
            || lower.contains("timed out")
            || lower.contains("connection")
            || lower.contains("network")
            || lower.contains("transport")
            || lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("malformed")
            || lower.contains("only pdf")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Local input problem; no remote call was made.
    pub fn validation(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self::new(UiErrorCategory::Validation, context, message)
    }

    pub fn from_task_failure(task: TaskTag, failure: &TaskFailure) -> Self {
        let category = if failure.is_transport() {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Remote
        };
        Self {
            category,
            context: UiErrorContext::for_task(task),
            message: failure.user_message(task),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_messages_by_keyword() {
        let cases = [
            ("identity service returned 400: NotAuthorizedException", UiErrorCategory::Auth),
            ("S3 list failed: 403 Forbidden", UiErrorCategory::Auth),
            ("connection refused", UiErrorCategory::Transport),
            ("request timed out", UiErrorCategory::Transport),
            ("missing file name", UiErrorCategory::Validation),
            ("something odd", UiErrorCategory::Unknown),
        ];
        for (message, expected) in cases {
            let err = UiError::from_message(UiErrorContext::Upload, message);
            assert_eq!(err.category(), expected, "{message}");
        }
    }

    #[test]
    fn task_failures_map_to_context_and_alert_text() {
        let err = UiError::from_task_failure(
            TaskTag::EvaluateAnswer,
            &TaskFailure::Rejected("Answer too short".into()),
        );
        assert_eq!(err.context(), UiErrorContext::Interview);
        assert_eq!(err.category(), UiErrorCategory::Remote);
        assert_eq!(err.message(), "Answer too short");
        assert!(!err.requires_reauth());
    }
}
