//! Dashboard view-state controller.
//!
//! A reducer over [`UiAction`]s and [`UiEvent`]s. It performs no I/O: every
//! remote effect is returned as a [`BackendCommand`] for the worker to run,
//! and the worker's result comes back as a [`UiEvent`].

pub mod actions;
pub mod commands;
pub mod events;
pub mod screens;

use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::Duration,
};

use shared::{
    domain::{FileEntry, NamespaceId, Purpose, Quiz},
    error::TaskFailure,
    protocol::{
        FeedbackPayload, GeneratedResume, InterviewPayload, QuizPayload, SkillGapReport,
        SummaryPayload, TaskRequest, TaskResponse, TaskTag,
    },
};
use storage::prepare_document_upload;
use tracing::{debug, info, warn};

pub use actions::UiAction;
pub use commands::BackendCommand;
pub use events::{UiError, UiErrorCategory, UiErrorContext, UiEvent};
pub use screens::{
    InterviewScreen, InterviewStep, QuizInputError, QuizPhase, QuizScreen, ResumeScreen, Screen,
    ScreenKind, SkillGapScreen, Tool,
};

use crate::session::SessionStatus;

/// Purposes whose listings are shown on the dashboard.
pub const LISTED_PURPOSES: [Purpose; 2] = [Purpose::Quizzes, Purpose::MyFiles];

/// One pending-flag-gated async action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingSlot {
    Task(TaskTag),
    Listing(Purpose),
    Upload(Purpose),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    files: HashMap<Purpose, Vec<FileEntry>>,
    /// Key of the uploaded document the summarizer targets.
    pub summary_file: Option<String>,
    pub summary_text: Option<String>,
    pub download_link: Option<DownloadLink>,
}

impl DashboardState {
    pub fn files(&self, purpose: Purpose) -> &[FileEntry] {
        self.files.get(&purpose).map(Vec::as_slice).unwrap_or(&[])
    }
}

pub struct DashboardController {
    session: SessionStatus,
    screen: Screen,
    dashboard: DashboardState,
    pending: HashSet<PendingSlot>,
    /// Listings to re-issue once the in-flight one for that purpose lands.
    queued_refresh: HashSet<Purpose>,
    /// Bumped on sign-out; session checks from an older generation are stale.
    session_generation: u64,
    alerts: VecDeque<UiError>,
    upload_refresh_delay: Duration,
}

impl DashboardController {
    pub fn new(upload_refresh_delay: Duration) -> Self {
        Self {
            session: SessionStatus::Unauthenticated,
            screen: Screen::Dashboard,
            dashboard: DashboardState::default(),
            pending: HashSet::new(),
            queued_refresh: HashSet::new(),
            session_generation: 0,
            alerts: VecDeque::new(),
            upload_refresh_delay,
        }
    }

    pub fn session(&self) -> &SessionStatus {
        &self.session
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn dashboard(&self) -> &DashboardState {
        &self.dashboard
    }

    pub fn is_pending(&self, slot: PendingSlot) -> bool {
        self.pending.contains(&slot)
    }

    pub fn alerts(&self) -> impl Iterator<Item = &UiError> {
        self.alerts.iter()
    }

    pub fn current_alert(&self) -> Option<&UiError> {
        self.alerts.front()
    }

    pub fn handle_action(&mut self, action: UiAction) -> Vec<BackendCommand> {
        match action {
            UiAction::Load => vec![BackendCommand::CheckSession {
                generation: self.session_generation,
            }],
            UiAction::SignOut => {
                self.session_generation += 1;
                self.clear_namespace_state();
                info!("sign-out requested; namespace state cleared");
                vec![BackendCommand::SignOut]
            }
            UiAction::DismissAlert => {
                self.alerts.pop_front();
                Vec::new()
            }
            UiAction::Back => self.leave_screen(),
            action => match self.session.namespace_id().cloned() {
                Some(namespace) => self.handle_authenticated(namespace, action),
                None => {
                    self.alert(UiError::new(
                        UiErrorCategory::Auth,
                        UiErrorContext::Session,
                        "Sign in to continue.",
                    ));
                    Vec::new()
                }
            },
        }
    }

    fn handle_authenticated(
        &mut self,
        namespace: NamespaceId,
        action: UiAction,
    ) -> Vec<BackendCommand> {
        match action {
            UiAction::RefreshFiles(purpose) => self
                .list_command(&namespace, purpose, Duration::ZERO)
                .into_iter()
                .collect(),
            UiAction::UploadDocument { purpose, path } => {
                let slot = PendingSlot::Upload(purpose);
                if self.pending.contains(&slot) {
                    debug!(?slot, "upload already in flight; ignored");
                    return Vec::new();
                }
                match prepare_document_upload(&namespace.prefix(purpose), &path) {
                    Ok(prepared) => {
                        self.pending.insert(slot);
                        vec![BackendCommand::Upload {
                            purpose,
                            local_path: path,
                            key: prepared.key,
                            content_type: prepared.content_type,
                        }]
                    }
                    Err(err) => {
                        self.alert(UiError::validation(UiErrorContext::Upload, err.to_string()));
                        Vec::new()
                    }
                }
            }
            UiAction::DeleteFile { purpose, key } => {
                if !key.starts_with(&namespace.prefix(purpose)) {
                    self.alert(UiError::validation(
                        UiErrorContext::Listing,
                        format!("'{key}' is not one of your {purpose} files"),
                    ));
                    return Vec::new();
                }
                vec![BackendCommand::DeleteFile { purpose, key }]
            }
            UiAction::Download { key } => vec![BackendCommand::PresignDownload { key }],
            UiAction::GenerateQuiz { file_key } => {
                if self.screen.kind() != ScreenKind::Dashboard {
                    return self.ignored("generate_quiz");
                }
                self.submit(TaskRequest::GenerateQuiz { file_key })
            }
            UiAction::SelectAnswer { question, option } => {
                let Screen::Quiz(quiz) = &mut self.screen else {
                    return self.ignored("select_answer");
                };
                if let Err(err) = quiz.select_answer(question, option) {
                    self.alert(UiError::validation(UiErrorContext::Quiz, err.to_string()));
                }
                Vec::new()
            }
            UiAction::SubmitQuiz => {
                let Screen::Quiz(quiz) = &mut self.screen else {
                    return self.ignored("submit_quiz");
                };
                match quiz.submit() {
                    Ok(score) => info!(score, total = quiz.quiz().total(), "quiz submitted"),
                    Err(err) => {
                        self.alert(UiError::validation(UiErrorContext::Quiz, err.to_string()))
                    }
                }
                Vec::new()
            }
            UiAction::Summarize => {
                let Some(file_key) = self.dashboard.summary_file.clone() else {
                    self.alert(UiError::validation(
                        UiErrorContext::Summary,
                        "Upload a document to summarize first.",
                    ));
                    return Vec::new();
                };
                let commands = self.submit(TaskRequest::Summarize { file_key });
                if !commands.is_empty() {
                    self.dashboard.summary_text = None;
                }
                commands
            }
            UiAction::OpenTool(tool) => {
                if self.screen.kind() != ScreenKind::Dashboard {
                    return self.ignored("open_tool");
                }
                self.screen = Screen::for_tool(tool);
                Vec::new()
            }
            UiAction::SetResumeField { field, value } => {
                let Screen::Resume(resume) = &mut self.screen else {
                    return self.ignored("set_resume_field");
                };
                if !resume.data.set_field(&field, value) {
                    self.alert(UiError::validation(
                        UiErrorContext::Resume,
                        format!("unknown resume field '{field}'"),
                    ));
                }
                Vec::new()
            }
            UiAction::GenerateResume => {
                let Screen::Resume(resume) = &self.screen else {
                    return self.ignored("generate_resume");
                };
                let missing = resume.data.missing_required_fields();
                if !missing.is_empty() {
                    self.alert(UiError::validation(
                        UiErrorContext::Resume,
                        format!("Please fill in: {}", missing.join(", ")),
                    ));
                    return Vec::new();
                }
                let resume_data = resume.data.clone();
                self.submit(TaskRequest::GenerateResume { resume_data })
            }
            UiAction::StartInterview { role, level } => {
                if self.screen.kind() != ScreenKind::Interview {
                    return self.ignored("start_interview");
                }
                if role.trim().is_empty() {
                    self.alert(UiError::validation(
                        UiErrorContext::Interview,
                        "Enter a role to practice for.",
                    ));
                    return Vec::new();
                }
                let commands = self.submit(TaskRequest::GenerateInterview {
                    role: role.clone(),
                    level: level.clone(),
                });
                if let (false, Screen::Interview(interview)) =
                    (commands.is_empty(), &mut self.screen)
                {
                    interview.role = role;
                    interview.level = level;
                }
                commands
            }
            UiAction::SetInterviewAnswer(answer) => {
                if let Screen::Interview(interview) = &mut self.screen {
                    interview.answer = answer;
                }
                Vec::new()
            }
            UiAction::SubmitInterviewAnswer => {
                let Screen::Interview(interview) = &self.screen else {
                    return self.ignored("submit_interview_answer");
                };
                let Some(question) = interview.current_question().map(str::to_string) else {
                    return self.ignored("submit_interview_answer");
                };
                if interview.answer.trim().is_empty() {
                    self.alert(UiError::validation(
                        UiErrorContext::Interview,
                        "Write an answer before submitting.",
                    ));
                    return Vec::new();
                }
                let request = TaskRequest::EvaluateAnswer {
                    question,
                    answer: interview.answer.clone(),
                    role: interview.role.clone(),
                    level: interview.level.clone(),
                };
                self.submit(request)
            }
            UiAction::NextQuestion => {
                if let Screen::Interview(interview) = &mut self.screen {
                    if interview.is_active()
                        && interview.next_question() == InterviewStep::Finished
                    {
                        info!("interview completed");
                    }
                }
                Vec::new()
            }
            UiAction::AnalyzeSkillGap {
                current_skills,
                target_role,
            } => {
                let Screen::SkillGap(skill_gap) = &mut self.screen else {
                    return self.ignored("analyze_skill_gap");
                };
                if current_skills.trim().is_empty() || target_role.trim().is_empty() {
                    self.alert(UiError::validation(
                        UiErrorContext::SkillGap,
                        "Enter your current skills and a target role.",
                    ));
                    return Vec::new();
                }
                skill_gap.current_skills = current_skills.clone();
                skill_gap.target_role = target_role.clone();
                self.submit(TaskRequest::AnalyzeSkillGap {
                    current_skills,
                    target_role,
                })
            }
            UiAction::Load | UiAction::SignOut | UiAction::Back | UiAction::DismissAlert => {
                Vec::new()
            }
        }
    }

    pub fn apply_event(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::SessionChecked { generation, status } => {
                if generation != self.session_generation {
                    debug!(
                        generation,
                        current = self.session_generation,
                        "stale session check dropped"
                    );
                    return Vec::new();
                }
                self.session = status;
                match self.session.namespace_id().cloned() {
                    Some(namespace) => LISTED_PURPOSES
                        .into_iter()
                        .filter_map(|purpose| {
                            self.refresh_listing(&namespace, purpose, Duration::ZERO)
                        })
                        .collect(),
                    None => {
                        self.clear_namespace_state();
                        Vec::new()
                    }
                }
            }
            UiEvent::SignedOut => {
                debug!("identity provider signed out");
                Vec::new()
            }
            UiEvent::FilesListed {
                purpose,
                prefix,
                files,
            } => {
                self.pending.remove(&PendingSlot::Listing(purpose));
                let Some(namespace) = self.session.namespace_id().cloned() else {
                    debug!(%purpose, %prefix, "listing dropped after sign-out");
                    return Vec::new();
                };
                if namespace.prefix(purpose) == prefix {
                    self.dashboard.files.insert(purpose, files);
                } else {
                    debug!(%purpose, %prefix, "stale listing dropped");
                }
                if self.queued_refresh.remove(&purpose) {
                    debug!(%purpose, "re-issuing queued listing");
                    return self
                        .list_command(&namespace, purpose, Duration::ZERO)
                        .into_iter()
                        .collect();
                }
                Vec::new()
            }
            UiEvent::Uploaded { purpose, key } => {
                self.pending.remove(&PendingSlot::Upload(purpose));
                let Some(namespace) = self.session.namespace_id().cloned() else {
                    return Vec::new();
                };
                info!(%purpose, %key, "upload complete");
                match purpose {
                    Purpose::Summaries => {
                        self.dashboard.summary_file = Some(key);
                        self.dashboard.summary_text = None;
                        Vec::new()
                    }
                    Purpose::Quizzes => self
                        .refresh_listing(&namespace, purpose, self.upload_refresh_delay)
                        .into_iter()
                        .collect(),
                    Purpose::MyFiles => self
                        .refresh_listing(&namespace, purpose, Duration::ZERO)
                        .into_iter()
                        .collect(),
                }
            }
            UiEvent::UploadFailed { purpose, reason } => {
                self.pending.remove(&PendingSlot::Upload(purpose));
                self.alert(UiError::from_message(UiErrorContext::Upload, reason));
                Vec::new()
            }
            UiEvent::FileDeleted { purpose, key } => {
                let Some(namespace) = self.session.namespace_id().cloned() else {
                    return Vec::new();
                };
                if let Some(files) = self.dashboard.files.get_mut(&purpose) {
                    files.retain(|file| file.key != key);
                }
                self.refresh_listing(&namespace, purpose, Duration::ZERO)
                    .into_iter()
                    .collect()
            }
            UiEvent::DeleteFailed { key, reason } => {
                warn!(%key, "file delete failed: {reason}");
                Vec::new()
            }
            UiEvent::DownloadReady { key, url } => {
                if self.is_authenticated() {
                    self.dashboard.download_link = Some(DownloadLink { key, url });
                }
                Vec::new()
            }
            UiEvent::DownloadFailed { key, reason } => {
                self.alert(UiError::from_message(
                    UiErrorContext::Download,
                    format!("Could not prepare download for {key}: {reason}"),
                ));
                Vec::new()
            }
            UiEvent::TaskCompleted { request, outcome } => {
                self.apply_task_outcome(request, outcome);
                Vec::new()
            }
            UiEvent::Error(err) => {
                self.alert(err);
                Vec::new()
            }
        }
    }

    fn apply_task_outcome(
        &mut self,
        request: TaskRequest,
        outcome: Result<TaskResponse, TaskFailure>,
    ) {
        let task = request.tag();
        self.pending.remove(&PendingSlot::Task(task));
        if !self.is_authenticated() {
            debug!(%task, "task result dropped after sign-out");
            return;
        }

        let response = match outcome {
            Ok(response) => response,
            Err(failure) => return self.task_failed(&request, failure),
        };

        let result = match &request {
            TaskRequest::GenerateQuiz { file_key } => response
                .into_success::<QuizPayload>(task)
                .map(|payload| self.show_quiz(file_key.clone(), payload)),
            TaskRequest::Summarize { file_key } => {
                if self.dashboard.summary_file.as_deref() != Some(file_key.as_str()) {
                    debug!(%file_key, "stale summary dropped");
                    return;
                }
                response
                    .into_success::<SummaryPayload>(task)
                    .map(|payload| self.dashboard.summary_text = Some(payload.summary))
            }
            TaskRequest::GenerateResume { .. } => response
                .into_success::<GeneratedResume>(task)
                .map(|generated| match &mut self.screen {
                    Screen::Resume(resume) => resume.generated = Some(generated),
                    _ => debug!("resume result dropped; screen changed"),
                }),
            TaskRequest::GenerateInterview { role, level } => response
                .into_success::<InterviewPayload>(task)
                .map(|payload| match &mut self.screen {
                    Screen::Interview(interview) if interview.role == *role => {
                        interview.start(role.clone(), level.clone(), payload.questions)
                    }
                    _ => debug!("interview questions dropped; screen changed"),
                }),
            TaskRequest::EvaluateAnswer { question, .. } => response
                .into_success::<FeedbackPayload>(task)
                .map(|payload| match &mut self.screen {
                    Screen::Interview(interview)
                        if interview.current_question() == Some(question.as_str()) =>
                    {
                        interview.feedback = Some(payload.feedback)
                    }
                    _ => debug!("feedback dropped; question changed"),
                }),
            TaskRequest::AnalyzeSkillGap { .. } => response
                .into_success::<SkillGapReport>(task)
                .map(|report| match &mut self.screen {
                    Screen::SkillGap(skill_gap) => skill_gap.report = Some(report),
                    _ => debug!("skill-gap report dropped; screen changed"),
                }),
        };

        if let Err(failure) = result {
            self.task_failed(&request, failure);
        }
    }

    fn show_quiz(&mut self, file_key: String, payload: QuizPayload) {
        if self.screen.kind() != ScreenKind::Dashboard {
            debug!(%file_key, "quiz result dropped; dashboard no longer active");
            return;
        }
        let quiz = Quiz::new(file_key, payload.questions);
        info!(title = %quiz.title, questions = quiz.total(), "quiz ready");
        self.screen = Screen::Quiz(QuizScreen::new(quiz));
    }

    fn task_failed(&mut self, request: &TaskRequest, failure: TaskFailure) {
        let task = request.tag();
        warn!(%task, "task failed: {failure}");
        if let TaskRequest::Summarize { file_key } = request {
            if self.dashboard.summary_file.as_deref() == Some(file_key.as_str()) {
                self.dashboard.summary_text = Some(failure.user_message(task));
            }
        }
        self.alert(UiError::from_task_failure(task, &failure));
    }

    fn leave_screen(&mut self) -> Vec<BackendCommand> {
        let previous = std::mem::take(&mut self.screen);
        match previous {
            Screen::Quiz(quiz) if quiz.results_shown() && self.is_authenticated() => {
                vec![BackendCommand::DeleteFile {
                    purpose: Purpose::Quizzes,
                    key: quiz.quiz().file_key.clone(),
                }]
            }
            _ => Vec::new(),
        }
    }

    fn submit(&mut self, request: TaskRequest) -> Vec<BackendCommand> {
        let slot = PendingSlot::Task(request.tag());
        if !self.pending.insert(slot) {
            debug!(?slot, "action already pending; ignored");
            return Vec::new();
        }
        vec![BackendCommand::SubmitTask { request }]
    }

    fn list_command(
        &mut self,
        namespace: &NamespaceId,
        purpose: Purpose,
        delay: Duration,
    ) -> Option<BackendCommand> {
        let slot = PendingSlot::Listing(purpose);
        if !self.pending.insert(slot) {
            debug!(?slot, "listing already pending; ignored");
            return None;
        }
        Some(BackendCommand::ListFiles {
            purpose,
            prefix: namespace.prefix(purpose),
            delay,
        })
    }

    /// Listing after the stored objects changed. When a listing for the
    /// purpose is already in flight it may predate the change, so another one
    /// is queued behind it instead of being dropped.
    fn refresh_listing(
        &mut self,
        namespace: &NamespaceId,
        purpose: Purpose,
        delay: Duration,
    ) -> Option<BackendCommand> {
        if self.pending.contains(&PendingSlot::Listing(purpose)) {
            debug!(%purpose, "listing in flight; refresh queued");
            self.queued_refresh.insert(purpose);
            return None;
        }
        self.list_command(namespace, purpose, delay)
    }

    fn ignored(&self, action: &'static str) -> Vec<BackendCommand> {
        debug!(action, screen = ?self.screen.kind(), "action not valid on this screen");
        Vec::new()
    }

    fn alert(&mut self, err: UiError) {
        warn!(
            category = ?err.category(),
            context = ?err.context(),
            "{}",
            err.message()
        );
        self.alerts.push_back(err);
    }

    fn clear_namespace_state(&mut self) {
        self.session = SessionStatus::Unauthenticated;
        self.screen = Screen::Dashboard;
        self.dashboard = DashboardState::default();
        self.pending.clear();
        self.queued_refresh.clear();
    }
}

#[cfg(test)]
#[path = "../tests/controller_tests.rs"]
mod tests;
