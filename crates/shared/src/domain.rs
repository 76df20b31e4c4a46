use std::{collections::HashMap, fmt};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Separator between namespace segments in object-store keys.
pub const NAMESPACE_SEPARATOR: char = '/';

/// Score ratio at or above which a non-perfect quiz counts as "great".
const GREAT_SCORE_RATIO: f64 = 0.7;

const QUIZ_TITLE_EXTENSIONS: [&str; 3] = [".pptx", ".ppt", ".pdf"];

/// Identity id issued for the signed-in user; scopes every storage prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NamespaceId(pub String);

impl NamespaceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<visibility>/<namespace>/<purpose>/` using the purpose's default visibility.
    pub fn prefix(&self, purpose: Purpose) -> String {
        self.prefix_with(purpose.default_visibility(), purpose)
    }

    pub fn prefix_with(&self, visibility: Visibility, purpose: Purpose) -> String {
        format!(
            "{}{sep}{}{sep}{}{sep}",
            visibility.as_str(),
            self.0,
            purpose.as_str(),
            sep = NAMESPACE_SEPARATOR
        )
    }

    pub fn object_key(&self, purpose: Purpose, file_name: &str) -> String {
        format!("{}{}", self.prefix(purpose), file_name)
    }
}

impl fmt::Display for NamespaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Purpose {
    Quizzes,
    MyFiles,
    Summaries,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Quizzes, Purpose::MyFiles, Purpose::Summaries];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quizzes => "quizzes",
            Self::MyFiles => "myfiles",
            Self::Summaries => "summaries",
        }
    }

    pub fn default_visibility(self) -> Visibility {
        match self {
            Self::Quizzes | Self::Summaries => Visibility::Protected,
            Self::MyFiles => Visibility::Private,
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
    pub size: u64,
}

impl FileEntry {
    pub fn file_name(&self) -> &str {
        self.key
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(self.key.as_str())
    }

    pub fn last_modified_label(&self) -> String {
        self.last_modified
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }
}

/// Question ids come back from the model as either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Number(i64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: QuestionId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
}

pub type QuizAnswers = HashMap<QuestionId, usize>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub title: String,
    pub file_key: String,
    pub questions: Vec<QuizQuestion>,
}

impl Quiz {
    pub fn new(file_key: impl Into<String>, questions: Vec<QuizQuestion>) -> Self {
        let file_key = file_key.into();
        Self {
            title: quiz_title_from_key(&file_key),
            file_key,
            questions,
        }
    }

    pub fn question(&self, id: &QuestionId) -> Option<&QuizQuestion> {
        self.questions.iter().find(|q| &q.id == id)
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn answered_count(&self, answers: &QuizAnswers) -> usize {
        self.questions
            .iter()
            .filter(|q| answers.contains_key(&q.id))
            .count()
    }

    pub fn is_fully_answered(&self, answers: &QuizAnswers) -> bool {
        self.answered_count(answers) >= self.total()
    }

    pub fn score(&self, answers: &QuizAnswers) -> usize {
        self.questions
            .iter()
            .filter(|q| answers.get(&q.id) == Some(&q.correct_answer))
            .count()
    }
}

/// Display title: last key segment without a slide-deck or PDF extension.
pub fn quiz_title_from_key(file_key: &str) -> String {
    let name = file_key
        .rsplit(NAMESPACE_SEPARATOR)
        .next()
        .unwrap_or(file_key);
    let lower = name.to_ascii_lowercase();
    for ext in QUIZ_TITLE_EXTENSIONS {
        if lower.ends_with(ext) {
            return name[..name.len() - ext.len()].to_string();
        }
    }
    name.to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Perfect,
    Great,
    KeepPracticing,
}

impl ScoreBand {
    pub fn classify(score: usize, total: usize) -> Self {
        if score == total {
            Self::Perfect
        } else if score as f64 >= total as f64 * GREAT_SCORE_RATIO {
            Self::Great
        } else {
            Self::KeepPracticing
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect score! Excellent work!",
            Self::Great => "Great job! You did well!",
            Self::KeepPracticing => "Keep practicing, you can do better!",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub education: String,
    pub experience: String,
    pub skills: String,
    pub target_job: String,
}

impl ResumeData {
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("fullName", &self.full_name),
            ("email", &self.email),
            ("targetJob", &self.target_job),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> bool {
        let slot = match field {
            "fullName" | "full_name" => &mut self.full_name,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "education" => &mut self.education,
            "experience" => &mut self.experience,
            "skills" => &mut self.skills,
            "targetJob" | "target_job" => &mut self.target_job,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}
