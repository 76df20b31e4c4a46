//! Plain-text rendering of the active screen.

use std::fmt::Write as _;

use client_core::{
    controller::{InterviewScreen, QuizScreen, ResumeScreen, SkillGapScreen},
    DashboardController, PendingSlot, Screen,
};
use shared::{
    domain::{FileEntry, Purpose},
    protocol::TaskTag,
};

pub fn render(controller: &DashboardController, status: &str) -> String {
    let mut out = String::new();
    match controller.screen() {
        Screen::Dashboard => render_dashboard(&mut out, controller),
        Screen::Quiz(quiz) => render_quiz(&mut out, quiz),
        Screen::Resume(resume) => render_resume(&mut out, resume, controller),
        Screen::Interview(interview) => render_interview(&mut out, interview, controller),
        Screen::SkillGap(skill_gap) => render_skill_gap(&mut out, skill_gap, controller),
    }
    if let Some(alert) = controller.current_alert() {
        let _ = writeln!(out, "\n! {}  (type `dismiss`)", alert.message());
        if alert.requires_reauth() {
            let _ = writeln!(out, "  sign in again, then type `refresh`");
        }
        let queued = controller.alerts().count() - 1;
        if queued > 0 {
            let _ = writeln!(out, "  ({queued} more)");
        }
    }
    if !status.is_empty() {
        let _ = writeln!(out, "\n{status}");
    }
    out
}

fn busy(controller: &DashboardController, slot: PendingSlot) -> &'static str {
    if controller.is_pending(slot) {
        " [working...]"
    } else {
        ""
    }
}

fn render_dashboard(out: &mut String, controller: &DashboardController) {
    let Some(namespace) = controller.session().namespace_id() else {
        let _ = writeln!(out, "== EduCloud ==\nNot signed in. Type `refresh` to retry.");
        return;
    };
    let _ = writeln!(out, "== EduCloud dashboard ({namespace}) ==");
    let dashboard = controller.dashboard();

    let _ = writeln!(
        out,
        "\n-- Document summarizer{}{}",
        busy(controller, PendingSlot::Upload(Purpose::Summaries)),
        busy(controller, PendingSlot::Task(TaskTag::Summarize)),
    );
    match &dashboard.summary_file {
        Some(key) => {
            let _ = writeln!(out, "document: {key}  (type `summarize`)");
        }
        None => {
            let _ = writeln!(out, "upload a document with `upload summaries <path>`");
        }
    }
    if let Some(summary) = &dashboard.summary_text {
        let _ = writeln!(out, "summary:\n{summary}");
    }

    let _ = writeln!(
        out,
        "\n-- Quiz generator{}{}",
        busy(controller, PendingSlot::Listing(Purpose::Quizzes)),
        busy(controller, PendingSlot::Task(TaskTag::GenerateQuiz)),
    );
    render_files(
        out,
        dashboard.files(Purpose::Quizzes),
        "Upload a document using `upload quizzes <path>`.",
    );

    let _ = writeln!(
        out,
        "\n-- My files{}",
        busy(controller, PendingSlot::Listing(Purpose::MyFiles))
    );
    render_files(out, dashboard.files(Purpose::MyFiles), "No files yet.");
    if let Some(link) = &dashboard.download_link {
        let _ = writeln!(out, "download {}:\n{}", link.key, link.url);
    }

    let _ = writeln!(out, "\ntools: resume | interview | skillgap");
}

fn render_files(out: &mut String, files: &[FileEntry], empty: &str) {
    if files.is_empty() {
        let _ = writeln!(out, "{empty}");
        return;
    }
    for (i, file) in files.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3}. {}  ({} bytes, {})",
            i + 1,
            file.file_name(),
            file.size,
            file.last_modified_label()
        );
    }
}

fn render_quiz(out: &mut String, screen: &QuizScreen) {
    let quiz = screen.quiz();
    let _ = writeln!(out, "== Quiz: {} ==", quiz.title);
    let shown = screen.results_shown();
    if shown {
        let _ = writeln!(
            out,
            "Your Score: {} / {}\n{}",
            screen.calculate_score(),
            quiz.total(),
            screen.score_band().message()
        );
    }
    for (n, question) in quiz.questions.iter().enumerate() {
        let chosen = screen.answers().get(&question.id).copied();
        let verdict = match (shown, chosen == Some(question.correct_answer)) {
            (false, _) => "",
            (true, true) => "  [correct]",
            (true, false) => "  [incorrect]",
        };
        let _ = writeln!(
            out,
            "\nQuestion {} (id {}){verdict}\n{}",
            n + 1,
            question.id,
            question.question
        );
        for (i, option) in question.options.iter().enumerate() {
            let marker = match (shown, chosen == Some(i), i == question.correct_answer) {
                (true, _, true) => "+",
                (true, true, false) => "x",
                (false, true, _) => "*",
                _ => " ",
            };
            let _ = writeln!(out, "  {marker} {}. {option}", i + 1);
        }
    }
    let hint = if shown {
        "\n`back` returns to the dashboard and removes the quiz document"
    } else {
        "\n`answer <id> <option>`, then `submit`"
    };
    let _ = writeln!(out, "{hint}");
}

fn render_resume(out: &mut String, screen: &ResumeScreen, controller: &DashboardController) {
    let _ = writeln!(
        out,
        "== Resume builder{} ==",
        busy(controller, PendingSlot::Task(TaskTag::GenerateResume))
    );
    let data = &screen.data;
    for (field, value) in [
        ("fullName", &data.full_name),
        ("email", &data.email),
        ("phone", &data.phone),
        ("education", &data.education),
        ("experience", &data.experience),
        ("skills", &data.skills),
        ("targetJob", &data.target_job),
    ] {
        let _ = writeln!(out, "{field:>11}: {value}");
    }
    if let Some(generated) = &screen.generated {
        let _ = writeln!(
            out,
            "\n-- Resume\n{}\n\n-- Cover letter\n{}",
            generated.resume, generated.cover_letter
        );
    }
}

fn render_interview(out: &mut String, screen: &InterviewScreen, controller: &DashboardController) {
    let pending = if controller.is_pending(PendingSlot::Task(TaskTag::GenerateInterview))
        || controller.is_pending(PendingSlot::Task(TaskTag::EvaluateAnswer))
    {
        " [working...]"
    } else {
        ""
    };
    let _ = writeln!(out, "== Mock interview{pending} ==");
    let Some(question) = screen.current_question() else {
        let _ = writeln!(out, "Type `start <role> | <level>` to begin.");
        return;
    };
    let _ = writeln!(
        out,
        "{} ({})  question {} of {}\n\n{question}",
        screen.role,
        screen.level,
        screen.index() + 1,
        screen.questions().len()
    );
    if !screen.answer.is_empty() {
        let _ = writeln!(out, "\nyour answer: {}", screen.answer);
    }
    if let Some(feedback) = &screen.feedback {
        let _ = writeln!(out, "\nfeedback:\n{feedback}");
    }
}

fn render_skill_gap(out: &mut String, screen: &SkillGapScreen, controller: &DashboardController) {
    let _ = writeln!(
        out,
        "== Skill-gap analysis{} ==",
        busy(controller, PendingSlot::Task(TaskTag::AnalyzeSkillGap))
    );
    let Some(report) = &screen.report else {
        let _ = writeln!(out, "Type `analyze <skills> | <target role>`.");
        return;
    };
    let _ = writeln!(
        out,
        "{} for {}: {:.0}% match",
        screen.current_skills, screen.target_role, report.match_percentage
    );
    let _ = writeln!(out, "\nmissing skills:");
    for skill in &report.missing_skills {
        let _ = writeln!(out, "  - {skill}");
    }
    let _ = writeln!(out, "\nrecommendations:");
    for recommendation in &report.recommendations {
        let _ = writeln!(out, "  - {recommendation}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use client_core::{SessionStatus, UiAction, UiEvent};
    use shared::{
        domain::NamespaceId,
        protocol::{TaskRequest, TaskResponse},
    };

    #[test]
    fn signed_out_dashboard_says_so() {
        let controller = DashboardController::new(Duration::ZERO);
        assert!(render(&controller, "").contains("Not signed in"));
    }

    #[test]
    fn auth_alert_suggests_signing_in_and_counts_the_queue() {
        let mut controller = DashboardController::new(Duration::ZERO);
        controller.handle_action(UiAction::Summarize);
        controller.handle_action(UiAction::GenerateResume);

        let text = render(&controller, "");
        assert!(text.contains("! Sign in to continue."), "{text}");
        assert!(text.contains("sign in again, then type `refresh`"), "{text}");
        assert!(text.contains("(1 more)"), "{text}");
    }

    #[test]
    fn quiz_results_show_score_and_marks() {
        let namespace = NamespaceId::new("us-east-1:u1");
        let mut controller = DashboardController::new(Duration::ZERO);
        controller.apply_event(UiEvent::SessionChecked {
            generation: 0,
            status: SessionStatus::Authenticated {
                namespace_id: namespace.clone(),
            },
        });
        let file_key = namespace.object_key(Purpose::Quizzes, "biology.pdf");
        controller.handle_action(UiAction::GenerateQuiz {
            file_key: file_key.clone(),
        });
        controller.apply_event(UiEvent::TaskCompleted {
            request: TaskRequest::GenerateQuiz { file_key },
            outcome: Ok(TaskResponse::from_payload(serde_json::json!({
                "success": true,
                "questions": [
                    {"id": 1, "question": "Cell powerhouse?", "options": ["Nucleus", "Mitochondria"], "correctAnswer": 1}
                ]
            }))),
        });
        controller.handle_action(UiAction::SelectAnswer {
            question: shared::domain::QuestionId::Number(1),
            option: 1,
        });
        controller.handle_action(UiAction::SubmitQuiz);

        let text = render(&controller, "");
        assert!(text.contains("== Quiz: biology =="), "{text}");
        assert!(text.contains("Your Score: 1 / 1"), "{text}");
        assert!(text.contains("Perfect score!"), "{text}");
        assert!(text.contains("+ 2. Mitochondria"), "{text}");
    }
}
