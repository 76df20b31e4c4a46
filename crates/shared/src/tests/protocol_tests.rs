use super::*;
use crate::domain::QuestionId;
use serde_json::json;

#[test]
fn serializes_task_tag_and_camel_case_fields() {
    let request = TaskRequest::GenerateQuiz {
        file_key: "protected/abc/quizzes/bio.pdf".into(),
    };
    assert_eq!(
        serde_json::to_value(&request).expect("serialize"),
        json!({"task": "generateQuiz", "fileKey": "protected/abc/quizzes/bio.pdf"})
    );

    let request = TaskRequest::AnalyzeSkillGap {
        current_skills: "rust, sql".into(),
        target_role: "backend engineer".into(),
    };
    assert_eq!(
        serde_json::to_value(&request).expect("serialize"),
        json!({
            "task": "analyzeSkillGap",
            "currentSkills": "rust, sql",
            "targetRole": "backend engineer"
        })
    );
}

#[test]
fn serializes_nested_resume_data() {
    let request = TaskRequest::GenerateResume {
        resume_data: ResumeData {
            full_name: "Ada".into(),
            email: "ada@example.com".into(),
            target_job: "Analyst".into(),
            ..ResumeData::default()
        },
    };
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["task"], "generateResume");
    assert_eq!(value["resumeData"]["fullName"], "Ada");
    assert_eq!(value["resumeData"]["targetJob"], "Analyst");
    assert_eq!(value["resumeData"]["phone"], "");
}

#[test]
fn request_tag_matches_wire_discriminator() {
    let request = TaskRequest::EvaluateAnswer {
        question: "q".into(),
        answer: "a".into(),
        role: "r".into(),
        level: "l".into(),
    };
    let value = serde_json::to_value(&request).expect("serialize");
    assert_eq!(value["task"], request.tag().as_str());
}

#[test]
fn wrapped_and_flat_payloads_normalize_identically() {
    let inner = json!({"success": true, "summary": "X", "extra": [1, 2]});
    let wrapped = json!({"statusCode": 200, "body": inner.to_string()});

    assert_eq!(
        normalize_envelope(wrapped).expect("wrapped"),
        normalize_envelope(inner.clone()).expect("flat")
    );
    assert_eq!(normalize_envelope(inner.clone()).expect("flat"), inner);
}

#[test]
fn unwraps_multiple_encoding_layers() {
    let inner = json!({"success": true, "feedback": "solid answer"});
    let once = json!({"body": inner.to_string()});
    let twice = json!({"body": once.to_string()});
    let as_string = Value::String(twice.to_string());

    assert_eq!(normalize_envelope(as_string).expect("normalize"), inner);
}

#[test]
fn non_string_body_is_left_in_place() {
    let payload = json!({"success": true, "body": {"nested": true}});
    assert_eq!(normalize_envelope(payload.clone()).expect("normalize"), payload);
}

#[test]
fn malformed_inner_document_is_an_envelope_error() {
    let err = normalize_envelope(json!({"body": "{not json"})).expect_err("malformed");
    assert!(matches!(err, EnvelopeError::Malformed(_)));
}

#[test]
fn bounds_envelope_depth() {
    let mut value = json!({"success": true});
    for _ in 0..=MAX_ENVELOPE_DEPTH {
        value = json!({"body": value.to_string()});
    }
    assert_eq!(
        normalize_envelope(value),
        Err(EnvelopeError::TooDeep(MAX_ENVELOPE_DEPTH))
    );
}

#[test]
fn summarize_scenario_yields_summary_text() {
    let raw = serde_json::from_str(r#"{"body":"{\"success\":true,\"summary\":\"X\"}"}"#)
        .expect("json");
    let response = TaskResponse::from_raw(raw).expect("normalize");
    let payload: SummaryPayload = response
        .into_success(TaskTag::Summarize)
        .expect("summary");
    assert_eq!(payload.summary, "X");
}

#[test]
fn success_false_surfaces_remote_error() {
    let response = TaskResponse::from_raw(json!({"success": false, "error": "quota exceeded"}))
        .expect("normalize");
    let err = response
        .into_success::<QuizPayload>(TaskTag::GenerateQuiz)
        .expect_err("rejected");
    assert_eq!(err, TaskFailure::Rejected("quota exceeded".into()));
}

#[test]
fn absent_success_flag_is_failure_with_default_message() {
    let response = TaskResponse::from_raw(json!({"summary": "ignored"})).expect("normalize");
    assert!(!response.success);
    let err = response
        .into_success::<SummaryPayload>(TaskTag::Summarize)
        .expect_err("rejected");
    assert_eq!(err, TaskFailure::Rejected("No summary returned.".into()));
}

#[test]
fn truthy_non_boolean_success_is_not_success() {
    let response =
        TaskResponse::from_raw(json!({"success": "true", "summary": "X"})).expect("normalize");
    assert!(!response.success);
}

#[test]
fn missing_expected_field_is_logical_failure() {
    let response = TaskResponse::from_raw(json!({"success": true, "resume": "r"})).expect("ok");
    let err = response
        .into_success::<GeneratedResume>(TaskTag::GenerateResume)
        .expect_err("missing");
    assert_eq!(err, TaskFailure::MissingField { field: "coverLetter" });
}

#[test]
fn parses_quiz_questions() {
    let response = TaskResponse::from_raw(json!({
        "success": true,
        "questions": [
            {"id": 1, "question": "2+2?", "options": ["3", "4"], "correctAnswer": 1},
            {"id": "b", "question": "Sky?", "options": ["blue", "green"], "correctAnswer": 0}
        ]
    }))
    .expect("normalize");
    let payload: QuizPayload = response.into_success(TaskTag::GenerateQuiz).expect("quiz");

    assert_eq!(payload.questions.len(), 2);
    assert_eq!(payload.questions[0].id, QuestionId::Number(1));
    assert_eq!(payload.questions[1].id, QuestionId::Text("b".into()));
    assert_eq!(payload.questions[0].correct_answer, 1);
}

#[test]
fn rejects_quiz_with_out_of_range_correct_answer() {
    let response = TaskResponse::from_raw(json!({
        "success": true,
        "questions": [{"id": 1, "question": "?", "options": ["a"], "correctAnswer": 3}]
    }))
    .expect("normalize");
    let err = response
        .into_success::<QuizPayload>(TaskTag::GenerateQuiz)
        .expect_err("invalid");
    assert!(matches!(err, TaskFailure::Invalid(_)));
}

#[test]
fn rejects_empty_interview_question_list() {
    let response =
        TaskResponse::from_raw(json!({"success": true, "questions": []})).expect("normalize");
    let err = response
        .into_success::<InterviewPayload>(TaskTag::GenerateInterview)
        .expect_err("empty");
    assert_eq!(err, TaskFailure::MissingField { field: "questions" });
}

#[test]
fn parses_skill_gap_report() {
    let response = TaskResponse::from_raw(json!({
        "body": json!({
            "success": true,
            "missingSkills": ["kubernetes"],
            "recommendations": ["take the CKA course"],
            "matchPercentage": 62.5
        }).to_string()
    }))
    .expect("normalize");
    let report: SkillGapReport = response
        .into_success(TaskTag::AnalyzeSkillGap)
        .expect("report");

    assert_eq!(report.missing_skills, vec!["kubernetes".to_string()]);
    assert_eq!(report.match_percentage, 62.5);
}
