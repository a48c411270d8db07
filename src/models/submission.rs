use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NO_RESPONSE: &str = "No response";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub session_id: Uuid,
    pub candidate_name: String,
    pub candidate_id: String,
    pub completed_at: DateTime<Utc>,
    pub auto_submitted: bool,
    pub entries: Vec<SubmissionEntry>,
}

/// One selected question as it appeared to the candidate, with their answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionEntry {
    /// 1-based position in the selection.
    pub position: usize,
    pub question: String,
    pub difficulty: String,
    pub topics: Vec<String>,
    pub expected_output_example: String,
    pub answer: String,
    pub answered: bool,
}

impl SubmissionRecord {
    pub fn answered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.answered).count()
    }
}
