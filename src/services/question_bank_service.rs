use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::models::question::Question;

pub const REQUIRED_COLUMNS: [&str; 4] = ["Question", "Difficulty", "Topics", "Expected Output Example"];

pub trait QuestionBankProvider: Send + Sync {
    fn load(&self) -> Result<Vec<Question>>;
}

/// Question bank stored as a CSV file with a header row.
#[derive(Debug, Clone)]
pub struct CsvQuestionBank {
    path: PathBuf,
}

impl CsvQuestionBank {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parse<R: Read>(reader: R) -> Result<Vec<Question>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| Error::Load(format!("Unreadable header row: {}", e)))?
            .clone();

        let mut positions = [0usize; 4];
        for (slot, name) in positions.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = headers.iter().position(|h| h == name).ok_or_else(|| {
                Error::Load(format!("Missing required column '{}' in the question bank", name))
            })?;
        }

        let mut questions = Vec::new();
        let mut dropped = 0usize;
        for row in csv_reader.records() {
            let row = row.map_err(|e| Error::Load(format!("Malformed row: {}", e)))?;
            let cell = |i: usize| row.get(positions[i]).map(str::trim).filter(|v| !v.is_empty());

            match (cell(0), cell(1), cell(2), cell(3)) {
                (Some(text), Some(difficulty), Some(topics), Some(expected)) => {
                    let question = Question::new(text, difficulty, topics, expected);
                    if question.topics.is_empty() {
                        dropped += 1;
                    } else {
                        questions.push(question);
                    }
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            tracing::warn!(dropped, kept = questions.len(), "Skipped incomplete question rows");
        }
        Ok(questions)
    }
}

impl QuestionBankProvider for CsvQuestionBank {
    fn load(&self) -> Result<Vec<Question>> {
        let file = File::open(&self.path).map_err(|e| {
            Error::Load(format!("Error loading questions from {}: {}", self.path.display(), e))
        })?;
        Self::parse(file)
    }
}

/// Fixed in-memory bank.
#[derive(Debug, Clone, Default)]
pub struct StaticQuestionBank {
    questions: Vec<Question>,
}

impl StaticQuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }
}

impl QuestionBankProvider for StaticQuestionBank {
    fn load(&self) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_required_columns_in_any_order() {
        let data = "\
Topics,Expected Output Example,Question,Difficulty,Notes
\"Algorithms, Search\",3,Find the index,Beginner,ignored
ML,0.5,Compute the mean,Expert,
";
        let questions = CsvQuestionBank::parse(data.as_bytes()).unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "Find the index");
        assert_eq!(questions[0].difficulty, "Beginner");
        assert!(questions[0].topics.contains("Search"));
        assert_eq!(questions[1].expected_output_example, "0.5");
    }

    #[test]
    fn drops_incomplete_rows() {
        let data = "\
Question,Difficulty,Topics,Expected Output Example
Complete,Easy,Algorithms,out
No topics,Easy,,out
Blank difficulty,  ,ML,out
Short row,Easy
Only commas,Easy, , ,out
";
        let questions = CsvQuestionBank::parse(data.as_bytes()).unwrap();
        let texts: Vec<&str> = questions.iter().map(|q| q.text.as_str()).collect();
        assert_eq!(texts, vec!["Complete"]);
    }

    #[test]
    fn topics_of_only_delimiters_count_as_missing() {
        let data = "\
Question,Difficulty,Topics,Expected Output Example
Delimiters only,Easy,\" , \",out
Trailing comma,Easy,\"Rust,\",out
";
        let questions = CsvQuestionBank::parse(data.as_bytes()).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].text, "Trailing comma");
        assert_eq!(questions[0].topics_display(), "Rust");
    }

    #[test]
    fn missing_column_is_a_load_error() {
        let data = "Question,Difficulty,Topics\nQ,Easy,ML\n";
        let err = CsvQuestionBank::parse(data.as_bytes()).unwrap_err();
        match err {
            Error::Load(msg) => assert!(msg.contains("Expected Output Example")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn unreadable_file_is_a_load_error() {
        let bank = CsvQuestionBank::new("/definitely/not/here/questions.csv");
        assert!(matches!(bank.load(), Err(Error::Load(_))));
    }
}
