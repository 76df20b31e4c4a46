//! User intents fed into the controller by the front end.

use std::path::PathBuf;

use shared::domain::{Purpose, QuestionId};

use super::screens::Tool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    /// Resolve the session and, if authenticated, load file listings.
    Load,
    SignOut,
    RefreshFiles(Purpose),
    UploadDocument {
        purpose: Purpose,
        path: PathBuf,
    },
    DeleteFile {
        purpose: Purpose,
        key: String,
    },
    Download {
        key: String,
    },
    GenerateQuiz {
        file_key: String,
    },
    SelectAnswer {
        question: QuestionId,
        option: usize,
    },
    SubmitQuiz,
    Summarize,
    OpenTool(Tool),
    Back,
    SetResumeField {
        field: String,
        value: String,
    },
    GenerateResume,
    StartInterview {
        role: String,
        level: String,
    },
    SetInterviewAnswer(String),
    SubmitInterviewAnswer,
    NextQuestion,
    AnalyzeSkillGap {
        current_skills: String,
        target_role: String,
    },
    DismissAlert,
}
