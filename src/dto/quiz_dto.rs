use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::session::{QuizSession, SessionStatus};
use crate::services::timer_service::TimerService;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(min = 1, max = 200))]
    pub candidate_name: String,
    #[validate(length(min = 1, max = 100))]
    pub candidate_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StartSessionRequest {
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[validate(range(min = 1, max = 100))]
    pub question_count: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NavigateRequest {
    #[validate(range(min = -1, max = 1))]
    pub delta: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SaveAnswerRequest {
    #[validate(length(max = 50000))]
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionView {
    pub index: usize,
    pub position: usize,
    pub total: usize,
    pub text: String,
    pub difficulty: String,
    pub topics: Vec<String>,
    pub expected_output_example: String,
    pub saved_answer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub candidate_id: String,
    pub status: SessionStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    pub time_remaining_seconds: u64,
    pub time_remaining_display: String,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub current_index: usize,
    pub current_question: Option<QuestionView>,
    pub progress: f64,
    pub can_go_previous: bool,
    pub can_go_next: bool,
    pub can_submit: bool,
    pub archived: bool,
    pub archive_location: Option<String>,
}

impl SessionView {
    pub fn from_session(session: &QuizSession, now: DateTime<Utc>) -> Self {
        let active = session.status() == SessionStatus::Active;
        let total = session.selected_questions().len();
        let index = session.current_index();
        let remaining = session.time_remaining(now);

        let current_question = session.current_question().map(|q| QuestionView {
            index,
            position: index + 1,
            total,
            text: q.text.clone(),
            difficulty: q.difficulty.clone(),
            topics: q.topics.iter().cloned().collect(),
            expected_output_example: q.expected_output_example.clone(),
            saved_answer: session.answer(index).map(str::to_string),
        });

        Self {
            session_id: session.id(),
            candidate_name: session.candidate_name().to_string(),
            candidate_id: session.candidate_id().to_string(),
            status: session.status(),
            started_at: session.started_at(),
            completed_at: session.completed_at(),
            duration_seconds: session.duration_seconds(),
            time_remaining_seconds: remaining,
            time_remaining_display: TimerService::format_countdown(remaining),
            total_questions: total,
            answered_questions: session.answered_count(),
            current_index: index,
            current_question,
            progress: session.progress(),
            can_go_previous: active && index > 0,
            can_go_next: active && index + 1 < total,
            can_submit: active,
            archived: session.archived_at().is_some(),
            archive_location: session.archived_at().map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveAnswerResponse {
    pub saved: bool,
    pub index: usize,
    pub progress: f64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub completed_at: DateTime<Utc>,
    pub answered_questions: usize,
    pub total_questions: usize,
    pub auto_submitted: bool,
    pub archive_location: String,
    pub message: String,
}
