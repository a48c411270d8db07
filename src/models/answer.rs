use std::collections::BTreeMap;

/// Saved answers keyed by 0-based question index.
///
/// Bounds are enforced by the owning session; the tracker only records and
/// derives progress.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerTracker {
    answers: BTreeMap<usize, String>,
}

impl AnswerTracker {
    /// Stores or overwrites the answer at `index`. Returns true the first time
    /// the index is answered.
    pub fn record(&mut self, index: usize, text: String) -> bool {
        self.answers.insert(index, text).is_none()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.answers.get(&index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn progress(&self, total: usize) -> f64 {
        if total == 0 {
            return 0.0;
        }
        self.answered_count() as f64 / total as f64 * 100.0
    }
}
