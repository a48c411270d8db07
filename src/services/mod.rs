pub mod question_bank_service;
pub mod quiz_service;
pub mod results_service;
pub mod selector_service;
pub mod session_store;
pub mod submission_service;
pub mod timer_service;
