use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ALL_LEVELS: &str = "All Levels";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub difficulty: String,
    pub topics: BTreeSet<String>,
    pub expected_output_example: String,
}

impl Question {
    pub fn new(
        text: impl Into<String>,
        difficulty: impl Into<String>,
        topics: &str,
        expected_output_example: impl Into<String>,
    ) -> Self {
        Self {
            text: text.into(),
            difficulty: difficulty.into(),
            topics: split_topics(topics),
            expected_output_example: expected_output_example.into(),
        }
    }

    pub fn has_any_topic(&self, wanted: &BTreeSet<String>) -> bool {
        !self.topics.is_disjoint(wanted)
    }

    pub fn topics_display(&self) -> String {
        self.topics.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

/// Splits a comma-delimited topics cell into a trimmed set, dropping blanks.
pub fn split_topics(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DifficultyFilter {
    #[default]
    All,
    Level(String),
}

impl DifficultyFilter {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == ALL_LEVELS {
            DifficultyFilter::All
        } else {
            DifficultyFilter::Level(trimmed.to_string())
        }
    }

    pub fn matches(&self, question: &Question) -> bool {
        match self {
            DifficultyFilter::All => true,
            DifficultyFilter::Level(level) => &question.difficulty == level,
        }
    }
}
