use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::models::question::{DifficultyFilter, Question, ALL_LEVELS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuizOptions {
    pub topics: Vec<String>,
    pub difficulties: Vec<String>,
}

pub struct QuestionSelector;

impl QuestionSelector {
    /// Filters the bank and draws up to `count` questions without replacement.
    /// The returned order is the draw order.
    pub fn select<R: Rng + ?Sized>(
        bank: &[Question],
        difficulty: &DifficultyFilter,
        topics: &BTreeSet<String>,
        count: usize,
        rng: &mut R,
    ) -> Vec<Question> {
        let wanted: BTreeSet<String> = topics
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        let mut eligible: Vec<&Question> = bank
            .iter()
            .filter(|q| difficulty.matches(q))
            .filter(|q| wanted.is_empty() || q.has_any_topic(&wanted))
            .collect();

        let take = count.min(eligible.len());
        let (picked, _) = eligible.partial_shuffle(rng, take);
        picked.iter().map(|q| (*q).clone()).collect()
    }

    pub fn options(bank: &[Question]) -> QuizOptions {
        let topics: BTreeSet<&String> = bank.iter().flat_map(|q| q.topics.iter()).collect();
        let levels: BTreeSet<&String> = bank.iter().map(|q| &q.difficulty).collect();

        QuizOptions {
            topics: topics.into_iter().cloned().collect(),
            difficulties: std::iter::once(ALL_LEVELS.to_string())
                .chain(levels.into_iter().cloned())
                .collect(),
        }
    }
}
