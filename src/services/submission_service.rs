use chrono::{DateTime, Utc};

use crate::models::session::QuizSession;
use crate::models::submission::{SubmissionEntry, SubmissionRecord, NO_RESPONSE};
use crate::utils::time::completion_stamp;

pub struct SubmissionBuilder;

impl SubmissionBuilder {
    pub fn build(
        session: &QuizSession,
        completed_at: DateTime<Utc>,
        auto_submitted: bool,
    ) -> SubmissionRecord {
        let entries = session
            .selected_questions()
            .iter()
            .enumerate()
            .map(|(idx, q)| {
                let answer = session.answer(idx);
                SubmissionEntry {
                    position: idx + 1,
                    question: q.text.clone(),
                    difficulty: q.difficulty.clone(),
                    topics: q.topics.iter().cloned().collect(),
                    expected_output_example: q.expected_output_example.clone(),
                    answer: answer.unwrap_or(NO_RESPONSE).to_string(),
                    answered: answer.is_some(),
                }
            })
            .collect();

        SubmissionRecord {
            session_id: session.id(),
            candidate_name: session.candidate_name().to_string(),
            candidate_id: session.candidate_id().to_string(),
            completed_at,
            auto_submitted,
            entries,
        }
    }

    /// Flattens a record into a single wide row of `(header, value)` pairs.
    /// Every question gets its own `Q{n} ...` columns.
    pub fn columns(record: &SubmissionRecord) -> Vec<(String, String)> {
        let mut columns = vec![
            ("Candidate".to_string(), record.candidate_name.clone()),
            ("UserID".to_string(), record.candidate_id.clone()),
            ("CompletionTime".to_string(), completion_stamp(record.completed_at)),
        ];

        for entry in &record.entries {
            let n = entry.position;
            columns.push((format!("Q{}", n), entry.question.clone()));
            columns.push((format!("Q{} Difficulty", n), entry.difficulty.clone()));
            columns.push((format!("Q{} Topics", n), entry.topics.join(", ")));
            columns.push((
                format!("Q{} Expected Output", n),
                entry.expected_output_example.clone(),
            ));
            columns.push((format!("Q{} Answer", n), entry.answer.clone()));
        }

        columns
    }
}
