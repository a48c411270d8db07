pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    question_bank_service::CsvQuestionBank,
    quiz_service::{QuizService, QuizSettings},
    results_service::XlsxResultSink,
    timer_service::SystemClock,
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_service: QuizService,
}

impl AppState {
    pub fn new(quiz_service: QuizService) -> Self {
        Self { quiz_service }
    }

    /// Wires the CSV question bank, the workbook sink and the wall clock.
    pub fn from_config(config: &Config) -> Self {
        let quiz_service = QuizService::new(
            Arc::new(CsvQuestionBank::new(&config.question_bank_path)),
            Arc::new(XlsxResultSink::new(&config.results_dir)),
            Arc::new(SystemClock),
            QuizSettings::from_config(config),
        );
        Self { quiz_service }
    }
}
