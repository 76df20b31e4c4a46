//! Line commands typed at the prompt, mapped onto controller actions.

use std::{io::BufRead, path::PathBuf, thread};

use client_core::{DashboardState, ScreenKind, Tool, UiAction};
use crossbeam_channel::Sender;
use shared::domain::{Purpose, QuestionId};

pub const HELP: &str = "\
commands:
  refresh [quizzes|myfiles]         reload file listings
  upload <quizzes|myfiles|summaries> <path>
  quiz <n>                          generate a quiz from quiz file n
  download <n> | delete <n>         act on \"my files\" entry n
  summarize                         summarize the uploaded summary document
  answer <question-id> <option>     choose an option (1-based) in the quiz
  submit                            submit quiz answers
  resume | interview | skillgap     open a tool
  set <field> <value>               resume field (fullName, email, phone,
                                    education, experience, skills, targetJob)
  generate                          generate resume and cover letter
  start <role> | <level>            start a mock interview
  say <text>                        draft an interview answer
  evaluate                          evaluate the drafted answer
  next                              next interview question
  analyze <skills> | <target role>  run a skill-gap analysis
  back | dismiss | signout | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Action(UiAction),
    Help,
    Quit,
    Nothing,
}

/// Parses one prompt line against the current dashboard state.
pub fn parse_line(
    line: &str,
    screen: ScreenKind,
    dashboard: &DashboardState,
) -> Result<Input, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let action = match word.to_ascii_lowercase().as_str() {
        "" => return Ok(Input::Nothing),
        "help" | "?" => return Ok(Input::Help),
        "quit" | "exit" => return Ok(Input::Quit),
        "refresh" => match rest {
            "" => UiAction::Load,
            purpose => UiAction::RefreshFiles(parse_purpose(purpose)?),
        },
        "upload" => {
            let (purpose, path) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: upload <quizzes|myfiles|summaries> <path>")?;
            UiAction::UploadDocument {
                purpose: parse_purpose(purpose)?,
                path: PathBuf::from(path.trim()),
            }
        }
        "quiz" => UiAction::GenerateQuiz {
            file_key: nth_key(dashboard, Purpose::Quizzes, rest)?,
        },
        "download" => UiAction::Download {
            key: nth_key(dashboard, Purpose::MyFiles, rest)?,
        },
        "delete" => UiAction::DeleteFile {
            purpose: Purpose::MyFiles,
            key: nth_key(dashboard, Purpose::MyFiles, rest)?,
        },
        "summarize" => UiAction::Summarize,
        "answer" => {
            let (id, option) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: answer <question-id> <option>")?;
            let option: usize = option
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not an option number", option.trim()))?;
            if option == 0 {
                return Err("options are numbered from 1".to_string());
            }
            UiAction::SelectAnswer {
                question: parse_question_id(id),
                option: option - 1,
            }
        }
        "submit" => UiAction::SubmitQuiz,
        "resume" => UiAction::OpenTool(Tool::Resume),
        "interview" => UiAction::OpenTool(Tool::Interview),
        "skillgap" => UiAction::OpenTool(Tool::SkillGap),
        "set" => {
            let (field, value) = rest
                .split_once(char::is_whitespace)
                .ok_or("usage: set <field> <value>")?;
            UiAction::SetResumeField {
                field: field.to_string(),
                value: value.trim().to_string(),
            }
        }
        "generate" => UiAction::GenerateResume,
        "start" => {
            let (role, level) = split_pair(rest);
            UiAction::StartInterview {
                role: role.to_string(),
                level: if level.is_empty() { "mid" } else { level }.to_string(),
            }
        }
        "say" => UiAction::SetInterviewAnswer(rest.to_string()),
        "evaluate" => UiAction::SubmitInterviewAnswer,
        "next" => UiAction::NextQuestion,
        "analyze" => {
            let (skills, role) = split_pair(rest);
            UiAction::AnalyzeSkillGap {
                current_skills: skills.to_string(),
                target_role: role.to_string(),
            }
        }
        "back" => UiAction::Back,
        "dismiss" => UiAction::DismissAlert,
        "signout" | "logout" => UiAction::SignOut,
        other => {
            return Err(format!(
                "unknown command '{other}' on {screen:?} screen; type `help`"
            ))
        }
    };
    Ok(Input::Action(action))
}

fn parse_purpose(raw: &str) -> Result<Purpose, String> {
    Purpose::ALL
        .into_iter()
        .find(|purpose| purpose.as_str().eq_ignore_ascii_case(raw.trim()))
        .ok_or_else(|| format!("unknown file area '{raw}' (quizzes, myfiles, summaries)"))
}

fn parse_question_id(raw: &str) -> QuestionId {
    match raw.trim().parse::<i64>() {
        Ok(n) => QuestionId::Number(n),
        Err(_) => QuestionId::Text(raw.trim().to_string()),
    }
}

fn nth_key(dashboard: &DashboardState, purpose: Purpose, raw: &str) -> Result<String, String> {
    let index: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("expected a file number, got '{raw}'"))?;
    index
        .checked_sub(1)
        .and_then(|i| dashboard.files(purpose).get(i))
        .map(|file| file.key.clone())
        .ok_or_else(|| format!("no {purpose} file numbered {index}"))
}

fn split_pair(rest: &str) -> (&str, &str) {
    match rest.split_once('|') {
        Some((left, right)) => (left.trim(), right.trim()),
        None => (rest.trim(), ""),
    }
}

/// Forwards stdin lines to the UI loop; the channel closes at end of input.
pub fn spawn_stdin_reader(line_tx: Sender<String>) {
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::warn!("stdin read failed: {err}");
                    break;
                }
            }
        }
    });
}

#[cfg(test)]
#[path = "../tests/input_tests.rs"]
mod tests;
