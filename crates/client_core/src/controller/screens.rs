//! Screen state machine: one tagged union over every view.

use shared::{
    domain::{QuestionId, Quiz, QuizAnswers, ResumeData, ScoreBand},
    protocol::{GeneratedResume, SkillGapReport},
};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    Resume,
    Interview,
    SkillGap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenKind {
    Dashboard,
    Quiz,
    Resume,
    Interview,
    SkillGap,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Screen {
    #[default]
    Dashboard,
    Quiz(QuizScreen),
    Resume(ResumeScreen),
    Interview(InterviewScreen),
    SkillGap(SkillGapScreen),
}

impl Screen {
    pub fn kind(&self) -> ScreenKind {
        match self {
            Self::Dashboard => ScreenKind::Dashboard,
            Self::Quiz(_) => ScreenKind::Quiz,
            Self::Resume(_) => ScreenKind::Resume,
            Self::Interview(_) => ScreenKind::Interview,
            Self::SkillGap(_) => ScreenKind::SkillGap,
        }
    }

    pub fn for_tool(tool: Tool) -> Self {
        match tool {
            Tool::Resume => Self::Resume(ResumeScreen::default()),
            Tool::Interview => Self::Interview(InterviewScreen::default()),
            Tool::SkillGap => Self::SkillGap(SkillGapScreen::default()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuizInputError {
    #[error("Please answer all questions before submitting!")]
    Incomplete { answered: usize, total: usize },
    #[error("quiz has no question with id {0}")]
    UnknownQuestion(QuestionId),
    #[error("option {option} is out of range for question {question} ({available} options)")]
    OptionOutOfRange {
        question: QuestionId,
        option: usize,
        available: usize,
    },
    #[error("answers are locked once results are shown")]
    ResultsShown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    Answering,
    ShowingResults,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizScreen {
    quiz: Quiz,
    answers: QuizAnswers,
    phase: QuizPhase,
}

impl QuizScreen {
    pub fn new(quiz: Quiz) -> Self {
        Self {
            quiz,
            answers: QuizAnswers::new(),
            phase: QuizPhase::Answering,
        }
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn answers(&self) -> &QuizAnswers {
        &self.answers
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn results_shown(&self) -> bool {
        self.phase == QuizPhase::ShowingResults
    }

    pub fn select_answer(&mut self, id: QuestionId, option: usize) -> Result<(), QuizInputError> {
        if self.results_shown() {
            return Err(QuizInputError::ResultsShown);
        }
        let question = self
            .quiz
            .question(&id)
            .ok_or_else(|| QuizInputError::UnknownQuestion(id.clone()))?;
        if option >= question.options.len() {
            return Err(QuizInputError::OptionOutOfRange {
                question: id,
                option,
                available: question.options.len(),
            });
        }
        self.answers.insert(id, option);
        Ok(())
    }

    /// Moves to results once every question has an answer. One-way.
    pub fn submit(&mut self) -> Result<usize, QuizInputError> {
        if self.results_shown() {
            return Err(QuizInputError::ResultsShown);
        }
        if !self.quiz.is_fully_answered(&self.answers) {
            return Err(QuizInputError::Incomplete {
                answered: self.quiz.answered_count(&self.answers),
                total: self.quiz.total(),
            });
        }
        self.phase = QuizPhase::ShowingResults;
        Ok(self.calculate_score())
    }

    pub fn calculate_score(&self) -> usize {
        self.quiz.score(&self.answers)
    }

    pub fn score_band(&self) -> ScoreBand {
        ScoreBand::classify(self.calculate_score(), self.quiz.total())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResumeScreen {
    pub data: ResumeData,
    pub generated: Option<GeneratedResume>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterviewStep {
    Advanced(usize),
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterviewScreen {
    pub role: String,
    pub level: String,
    questions: Vec<String>,
    index: usize,
    pub answer: String,
    pub feedback: Option<String>,
}

impl InterviewScreen {
    pub fn start(&mut self, role: String, level: String, questions: Vec<String>) {
        self.role = role;
        self.level = level;
        self.questions = questions;
        self.index = 0;
        self.answer.clear();
        self.feedback = None;
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_active(&self) -> bool {
        !self.questions.is_empty()
    }

    pub fn current_question(&self) -> Option<&str> {
        self.questions.get(self.index).map(String::as_str)
    }

    /// Forward-only: advances while another question remains, otherwise
    /// ends the interview and clears its state.
    pub fn next_question(&mut self) -> InterviewStep {
        if self.index + 1 < self.questions.len() {
            self.index += 1;
            self.answer.clear();
            self.feedback = None;
            InterviewStep::Advanced(self.index)
        } else {
            self.finish();
            InterviewStep::Finished
        }
    }

    pub fn finish(&mut self) {
        self.questions.clear();
        self.index = 0;
        self.answer.clear();
        self.feedback = None;
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkillGapScreen {
    pub current_skills: String,
    pub target_role: String,
    pub report: Option<SkillGapReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interview_with(n: usize) -> InterviewScreen {
        let mut screen = InterviewScreen::default();
        screen.start(
            "Backend Engineer".into(),
            "junior".into(),
            (1..=n).map(|i| format!("Question {i}?")).collect(),
        );
        screen
    }

    #[test]
    fn interview_advances_then_finishes() {
        let mut screen = interview_with(3);
        screen.answer = "my answer".into();
        screen.feedback = Some("good".into());

        assert_eq!(screen.next_question(), InterviewStep::Advanced(1));
        assert!(screen.answer.is_empty());
        assert!(screen.feedback.is_none());
        assert_eq!(screen.next_question(), InterviewStep::Advanced(2));
        assert_eq!(screen.current_question(), Some("Question 3?"));

        screen.answer = "last".into();
        assert_eq!(screen.next_question(), InterviewStep::Finished);
        assert!(screen.questions().is_empty());
        assert_eq!(screen.index(), 0);
        assert!(screen.answer.is_empty());
        assert!(!screen.is_active());
    }

    #[test]
    fn single_question_interview_finishes_on_first_next() {
        let mut screen = interview_with(1);
        assert_eq!(screen.next_question(), InterviewStep::Finished);
        assert_eq!(screen.index(), 0);
    }

    #[test]
    fn tool_screens_start_empty() {
        assert_eq!(Screen::for_tool(Tool::Interview).kind(), ScreenKind::Interview);
        match Screen::for_tool(Tool::Resume) {
            Screen::Resume(resume) => assert!(resume.generated.is_none()),
            other => panic!("unexpected screen {other:?}"),
        }
    }
}
