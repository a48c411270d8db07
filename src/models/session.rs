use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::answer::AnswerTracker;
use crate::models::question::Question;
use crate::models::submission::SubmissionRecord;
use crate::services::submission_service::SubmissionBuilder;
use crate::services::timer_service::TimerService;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    Active,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl TryFrom<i32> for Direction {
    type Error = Error;

    fn try_from(delta: i32) -> Result<Self> {
        match delta {
            -1 => Ok(Direction::Previous),
            1 => Ok(Direction::Next),
            other => Err(Error::BadRequest(format!(
                "navigation delta must be -1 or 1, got {}",
                other
            ))),
        }
    }
}

/// One candidate's attempt. Every command validates status and bounds before
/// touching any field, so a rejected command leaves the session unchanged.
#[derive(Debug, Clone)]
pub struct QuizSession {
    id: Uuid,
    candidate_name: String,
    candidate_id: String,
    selected_questions: Vec<Question>,
    current_index: usize,
    answers: AnswerTracker,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    duration_seconds: u64,
    status: SessionStatus,
    record: Option<SubmissionRecord>,
    archived_at: Option<String>,
}

impl QuizSession {
    pub fn new(candidate_name: &str, candidate_id: &str, duration_seconds: u64) -> Result<Self> {
        let candidate_name = candidate_name.trim();
        let candidate_id = candidate_id.trim();
        if candidate_name.is_empty() || candidate_id.is_empty() {
            return Err(Error::BadRequest(
                "Please provide both name and candidate ID".to_string(),
            ));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            candidate_name: candidate_name.to_string(),
            candidate_id: candidate_id.to_string(),
            selected_questions: Vec::new(),
            current_index: 0,
            answers: AnswerTracker::default(),
            started_at: None,
            completed_at: None,
            duration_seconds,
            status: SessionStatus::NotStarted,
            record: None,
            archived_at: None,
        })
    }

    pub fn start(&mut self, selected: Vec<Question>, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::NotStarted {
            return Err(self.rejected("start"));
        }
        if selected.is_empty() {
            return Err(Error::EmptySelection);
        }

        self.selected_questions = selected;
        self.current_index = 0;
        self.started_at = Some(now);
        self.status = SessionStatus::Active;
        Ok(())
    }

    pub fn navigate(&mut self, direction: Direction) -> Result<usize> {
        self.ensure_active("navigate")?;
        let last = self.selected_questions.len() - 1;
        let target = match direction {
            Direction::Previous if self.current_index > 0 => self.current_index - 1,
            Direction::Next if self.current_index < last => self.current_index + 1,
            _ => {
                return Err(Error::InvalidTransition(format!(
                    "cannot move {:?} from question {} of {}",
                    direction,
                    self.current_index + 1,
                    self.selected_questions.len()
                )))
            }
        };
        self.current_index = target;
        Ok(target)
    }

    /// Saves the answer for any index in the selection, not only the current one.
    pub fn save_answer(&mut self, index: usize, text: String) -> Result<f64> {
        self.ensure_active("save an answer")?;
        if index >= self.selected_questions.len() {
            return Err(Error::InvalidTransition(format!(
                "question index {} is outside the selection of {}",
                index,
                self.selected_questions.len()
            )));
        }
        self.answers.record(index, text);
        Ok(self.progress())
    }

    pub fn submit(&mut self, now: DateTime<Utc>, auto_submitted: bool) -> Result<&SubmissionRecord> {
        self.ensure_active("submit")?;
        let record = SubmissionBuilder::build(self, now, auto_submitted);
        self.completed_at = Some(now);
        self.status = SessionStatus::Submitted;
        let record = &*self.record.insert(record);
        Ok(record)
    }

    pub fn mark_archived(&mut self, location: String) {
        self.archived_at = Some(location);
    }

    pub fn progress(&self) -> f64 {
        self.answers.progress(self.selected_questions.len())
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    pub fn time_remaining(&self, now: DateTime<Utc>) -> u64 {
        match self.started_at {
            None => self.duration_seconds,
            Some(started) => {
                let reference = match self.completed_at {
                    Some(completed) if completed < now => completed,
                    _ => now,
                };
                TimerService::remaining(started, self.duration_seconds, reference)
            }
        }
    }

    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|started| TimerService::deadline(started, self.duration_seconds))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == SessionStatus::Active && self.time_remaining(now) == 0
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self.status {
            SessionStatus::NotStarted => None,
            _ => self.selected_questions.get(self.current_index),
        }
    }

    pub fn answer(&self, index: usize) -> Option<&str> {
        self.answers.get(index)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn selected_questions(&self) -> &[Question] {
        &self.selected_questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn duration_seconds(&self) -> u64 {
        self.duration_seconds
    }

    pub fn record(&self) -> Option<&SubmissionRecord> {
        self.record.as_ref()
    }

    pub fn archived_at(&self) -> Option<&str> {
        self.archived_at.as_deref()
    }

    fn ensure_active(&self, action: &str) -> Result<()> {
        if self.status == SessionStatus::Active {
            Ok(())
        } else {
            Err(self.rejected(action))
        }
    }

    fn rejected(&self, action: &str) -> Error {
        Error::InvalidTransition(format!("cannot {} while session is {:?}", action, self.status))
    }
}
