use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{Config, ExpiryPolicy};
use crate::dto::quiz_dto::{SaveAnswerResponse, SessionView, StartSessionRequest, SubmitResponse};
use crate::error::{Error, Result};
use crate::models::question::DifficultyFilter;
use crate::models::session::{Direction, QuizSession, SessionStatus};
use crate::models::submission::SubmissionRecord;
use crate::services::question_bank_service::QuestionBankProvider;
use crate::services::results_service::PersistenceSink;
use crate::services::selector_service::{QuestionSelector, QuizOptions};
use crate::services::session_store::{lock, SessionStore};
use crate::services::timer_service::Clock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizSettings {
    pub duration_seconds: u64,
    pub question_count: usize,
    pub expiry_policy: ExpiryPolicy,
}

impl QuizSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            duration_seconds: config.quiz_duration_seconds,
            question_count: config.question_count,
            expiry_policy: config.expiry_policy,
        }
    }
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            duration_seconds: 60 * 60,
            question_count: 15,
            expiry_policy: ExpiryPolicy::AllowContinue,
        }
    }
}

#[derive(Clone)]
pub struct QuizService {
    bank: Arc<dyn QuestionBankProvider>,
    sink: Arc<dyn PersistenceSink>,
    clock: Arc<dyn Clock>,
    store: SessionStore,
    settings: QuizSettings,
}

impl QuizService {
    pub fn new(
        bank: Arc<dyn QuestionBankProvider>,
        sink: Arc<dyn PersistenceSink>,
        clock: Arc<dyn Clock>,
        settings: QuizSettings,
    ) -> Self {
        Self {
            bank,
            sink,
            clock,
            store: SessionStore::new(),
            settings,
        }
    }

    pub fn settings(&self) -> QuizSettings {
        self.settings
    }

    pub fn options(&self) -> Result<QuizOptions> {
        let bank = self.bank.load()?;
        Ok(QuestionSelector::options(&bank))
    }

    pub fn create_session(&self, candidate_name: &str, candidate_id: &str) -> Result<SessionView> {
        let session = QuizSession::new(candidate_name, candidate_id, self.settings.duration_seconds)?;
        let view = SessionView::from_session(&session, self.clock.now());
        let id = self.store.insert(session)?;
        tracing::info!(session_id = %id, candidate_id = %view.candidate_id, "Session created");
        Ok(view)
    }

    pub fn start_session(&self, id: Uuid, req: &StartSessionRequest) -> Result<SessionView> {
        let handle = self.store.get(id)?;
        let mut session = lock(&handle)?;
        if session.status() != SessionStatus::NotStarted {
            tracing::warn!(session_id = %id, status = ?session.status(), "Rejected repeated start");
            return Err(Error::InvalidTransition(
                "session has already been started".to_string(),
            ));
        }

        let bank = self.bank.load()?;
        let difficulty = DifficultyFilter::parse(req.difficulty.as_deref().unwrap_or_default());
        let topics: BTreeSet<String> = req.topics.iter().cloned().collect();
        let count = req.question_count.unwrap_or(self.settings.question_count);
        let selected =
            QuestionSelector::select(&bank, &difficulty, &topics, count, &mut rand::thread_rng());

        let now = self.clock.now();
        session.start(selected, now).inspect_err(|e| {
            tracing::warn!(session_id = %id, ?difficulty, ?topics, error = %e, "Session not started");
        })?;

        tracing::info!(
            session_id = %id,
            questions = session.selected_questions().len(),
            bank_size = bank.len(),
            "Session started"
        );
        Ok(SessionView::from_session(&session, now))
    }

    pub fn session(&self, id: Uuid) -> Result<SessionView> {
        self.with_session(id, |session, now| Ok(SessionView::from_session(session, now)))
    }

    pub fn navigate(&self, id: Uuid, delta: i32) -> Result<SessionView> {
        let direction = Direction::try_from(delta)?;
        self.with_session(id, |session, now| {
            session
                .navigate(direction)
                .inspect_err(|e| tracing::warn!(session_id = %id, error = %e, "Navigation rejected"))?;
            Ok(SessionView::from_session(session, now))
        })
    }

    pub fn save_answer(&self, id: Uuid, index: usize, text: String) -> Result<SaveAnswerResponse> {
        self.with_session(id, |session, now| {
            let progress = session
                .save_answer(index, text)
                .inspect_err(|e| tracing::warn!(session_id = %id, index, error = %e, "Answer rejected"))?;
            Ok(SaveAnswerResponse {
                saved: true,
                index,
                progress,
                timestamp: now,
            })
        })
    }

    pub fn submit(&self, id: Uuid) -> Result<SubmitResponse> {
        let handle = self.store.get(id)?;
        let mut session = lock(&handle)?;
        let now = self.clock.now();
        // A submit that arrives after the deadline gets the auto-submit receipt.
        if let Some(location) = self.expire_if_due(&mut session, now)? {
            return receipt(&session, location);
        }

        session
            .submit(now, false)
            .inspect_err(|e| tracing::warn!(session_id = %id, error = %e, "Submission rejected"))?;
        tracing::info!(session_id = %id, answered = session.answered_count(), "Session submitted");
        let location = self.archive(&mut session)?;
        receipt(&session, location)
    }

    /// Writes a retained record whose earlier archive attempt failed.
    pub fn retry_archive(&self, id: Uuid) -> Result<SubmitResponse> {
        self.with_session(id, |session, _now| {
            if session.status() != SessionStatus::Submitted {
                return Err(Error::InvalidTransition(
                    "only submitted sessions can be archived".to_string(),
                ));
            }
            if session.archived_at().is_some() {
                return Err(Error::InvalidTransition(
                    "submission has already been archived".to_string(),
                ));
            }
            let location = self.archive(session)?;
            receipt(session, location)
        })
    }

    pub fn record(&self, id: Uuid) -> Result<SubmissionRecord> {
        self.with_session(id, |session, _now| {
            session.record().cloned().ok_or_else(|| {
                Error::InvalidTransition("session has not been submitted yet".to_string())
            })
        })
    }

    /// Submits every active session whose countdown has run out. Only acts
    /// under the auto-submit policy.
    pub fn sweep_expired(&self) -> Result<usize> {
        if self.settings.expiry_policy != ExpiryPolicy::AutoSubmit {
            return Ok(0);
        }

        let mut submitted = 0;
        for id in self.store.ids()? {
            let handle = self.store.get(id)?;
            let mut session = lock(&handle)?;
            let now = self.clock.now();
            if !session.is_expired(now) {
                continue;
            }
            submitted += 1;
            if let Err(e) = self.expire(&mut session, now) {
                tracing::error!(session_id = %id, error = %e, "Expired session not archived");
            }
        }
        Ok(submitted)
    }

    fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut QuizSession, DateTime<Utc>) -> Result<T>,
    ) -> Result<T> {
        let handle = self.store.get(id)?;
        let mut session = lock(&handle)?;
        let now = self.clock.now();
        self.expire_if_due(&mut session, now)?;
        f(&mut session, now)
    }

    /// Under the auto-submit policy, submits an expired session and returns
    /// its archive location.
    fn expire_if_due(&self, session: &mut QuizSession, now: DateTime<Utc>) -> Result<Option<String>> {
        if self.settings.expiry_policy == ExpiryPolicy::AutoSubmit && session.is_expired(now) {
            return self.expire(session, now).map(Some);
        }
        Ok(None)
    }

    fn expire(&self, session: &mut QuizSession, now: DateTime<Utc>) -> Result<String> {
        let deadline = session.deadline().unwrap_or(now);
        session.submit(deadline, true)?;
        tracing::info!(session_id = %session.id(), "Session auto-submitted at deadline");
        self.archive(session)
    }

    fn archive(&self, session: &mut QuizSession) -> Result<String> {
        let record = session
            .record()
            .ok_or_else(|| Error::Internal("submitted session has no record".to_string()))?;

        match self.sink.save(record) {
            Ok(location) => {
                session.mark_archived(location.clone());
                Ok(location)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session.id(),
                    candidate_id = %session.candidate_id(),
                    error = %e,
                    "Failed to archive submission"
                );
                Err(match e {
                    Error::Submission(_) => e,
                    other => Error::Submission(other.to_string()),
                })
            }
        }
    }
}

fn receipt(session: &QuizSession, archive_location: String) -> Result<SubmitResponse> {
    let record = session
        .record()
        .ok_or_else(|| Error::Internal("submitted session has no record".to_string()))?;
    Ok(SubmitResponse {
        session_id: session.id(),
        status: session.status(),
        completed_at: record.completed_at,
        answered_questions: record.answered_count(),
        total_questions: record.entries.len(),
        auto_submitted: record.auto_submitted,
        archive_location,
        message: "Answers submitted successfully! Results saved.".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;
    use crate::services::question_bank_service::StaticQuestionBank;
    use crate::services::results_service::MockPersistenceSink;
    use crate::services::timer_service::ManualClock;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bank() -> Arc<StaticQuestionBank> {
        Arc::new(StaticQuestionBank::new(vec![
            Question::new("Reverse a list", "Beginner", "Algorithms", "[3, 2, 1]"),
            Question::new("Explain overfitting", "Expert", "ML", "text"),
            Question::new("Design a cache", "Expert", "Systems", "diagram"),
        ]))
    }

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        ))
    }

    fn service(sink: MockPersistenceSink, clock: Arc<ManualClock>, policy: ExpiryPolicy) -> QuizService {
        QuizService::new(
            bank(),
            Arc::new(sink),
            clock,
            QuizSettings {
                duration_seconds: 600,
                question_count: 15,
                expiry_policy: policy,
            },
        )
    }

    fn started(service: &QuizService) -> Uuid {
        let view = service.create_session("Ada", "cand-1").unwrap();
        service
            .start_session(view.session_id, &StartSessionRequest::default())
            .unwrap();
        view.session_id
    }

    #[test]
    fn empty_selection_keeps_session_not_started() {
        let service = service(MockPersistenceSink::new(), clock(), ExpiryPolicy::AllowContinue);
        let id = service.create_session("Ada", "cand-1").unwrap().session_id;
        let req = StartSessionRequest {
            difficulty: Some("Beginner".into()),
            topics: vec!["ML".into()],
            question_count: None,
        };
        assert!(matches!(service.start_session(id, &req), Err(Error::EmptySelection)));
        assert_eq!(service.session(id).unwrap().status, SessionStatus::NotStarted);

        let view = service
            .start_session(
                id,
                &StartSessionRequest {
                    topics: vec!["ML".into()],
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(view.status, SessionStatus::Active);
        assert_eq!(view.total_questions, 1);
    }

    #[test]
    fn failed_archive_keeps_record_for_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let mut sink = MockPersistenceSink::new();
        sink.expect_save().times(2).returning(move |record| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Submission("disk full".into()))
            } else {
                Ok(format!("memory://{}", record.candidate_id))
            }
        });

        let service = service(sink, clock(), ExpiryPolicy::AllowContinue);
        let id = started(&service);
        service.save_answer(id, 0, "answer".into()).unwrap();

        assert!(matches!(service.submit(id), Err(Error::Submission(_))));
        let view = service.session(id).unwrap();
        assert_eq!(view.status, SessionStatus::Submitted);
        assert!(!view.archived);
        assert_eq!(service.record(id).unwrap().answered_count(), 1);

        assert!(matches!(service.submit(id), Err(Error::InvalidTransition(_))));

        let receipt = service.retry_archive(id).unwrap();
        assert_eq!(receipt.archive_location, "memory://cand-1");
        assert!(matches!(service.retry_archive(id), Err(Error::InvalidTransition(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn double_submit_archives_once() {
        let mut sink = MockPersistenceSink::new();
        sink.expect_save()
            .times(1)
            .returning(|_| Ok("memory://one".to_string()));
        let service = service(sink, clock(), ExpiryPolicy::AllowContinue);
        let id = started(&service);

        let receipt = service.submit(id).unwrap();
        assert_eq!(receipt.total_questions, 3);
        assert_eq!(receipt.answered_questions, 0);
        assert!(matches!(service.submit(id), Err(Error::InvalidTransition(_))));
    }

    #[test]
    fn allow_continue_keeps_answering_after_deadline() {
        let clock = clock();
        let service = service(MockPersistenceSink::new(), clock.clone(), ExpiryPolicy::AllowContinue);
        let id = started(&service);

        clock.advance(3600);
        let view = service.session(id).unwrap();
        assert_eq!(view.time_remaining_seconds, 0);
        assert_eq!(view.status, SessionStatus::Active);
        assert!(service.save_answer(id, 1, "late".into()).is_ok());
        assert_eq!(service.sweep_expired().unwrap(), 0);
    }

    #[test]
    fn auto_submit_closes_expired_sessions_on_next_command() {
        let mut sink = MockPersistenceSink::new();
        sink.expect_save()
            .times(1)
            .returning(|_| Ok("memory://auto".to_string()));
        let clock = clock();
        let service = service(sink, clock.clone(), ExpiryPolicy::AutoSubmit);
        let id = started(&service);
        service.save_answer(id, 0, "in time".into()).unwrap();

        clock.advance(601);
        assert!(matches!(
            service.save_answer(id, 1, "late".into()),
            Err(Error::InvalidTransition(_))
        ));

        let record = service.record(id).unwrap();
        assert!(record.auto_submitted);
        assert_eq!(record.answered_count(), 1);
        let deadline = service.session(id).unwrap().started_at.unwrap() + chrono::Duration::seconds(600);
        assert_eq!(record.completed_at, deadline);
    }

    #[test]
    fn late_submit_returns_the_auto_submit_receipt() {
        let mut sink = MockPersistenceSink::new();
        sink.expect_save()
            .times(1)
            .returning(|_| Ok("memory://late".to_string()));
        let clock = clock();
        let service = service(sink, clock.clone(), ExpiryPolicy::AutoSubmit);
        let id = started(&service);
        let started_at = service.session(id).unwrap().started_at.unwrap();
        service.save_answer(id, 2, "before the bell".into()).unwrap();

        clock.advance(900);
        let receipt = service.submit(id).unwrap();
        assert!(receipt.auto_submitted);
        assert_eq!(receipt.status, SessionStatus::Submitted);
        assert_eq!(receipt.archive_location, "memory://late");
        assert_eq!(receipt.answered_questions, 1);
        assert_eq!(receipt.completed_at, started_at + chrono::Duration::seconds(600));

        assert!(matches!(service.submit(id), Err(Error::InvalidTransition(_))));
    }

    #[test]
    fn sweeper_submits_only_expired_sessions() {
        let mut sink = MockPersistenceSink::new();
        sink.expect_save()
            .times(1)
            .returning(|_| Ok("memory://swept".to_string()));
        let clock = clock();
        let service = service(sink, clock.clone(), ExpiryPolicy::AutoSubmit);

        let early = started(&service);
        clock.advance(300);
        let late = started(&service);
        let idle = service.create_session("Bob", "cand-2").unwrap().session_id;

        clock.advance(301);
        assert_eq!(service.sweep_expired().unwrap(), 1);
        assert_eq!(service.session(early).unwrap().status, SessionStatus::Submitted);
        assert_eq!(service.session(late).unwrap().status, SessionStatus::Active);
        assert_eq!(service.session(idle).unwrap().status, SessionStatus::NotStarted);
    }

    #[test]
    fn navigation_delta_is_validated() {
        let service = service(MockPersistenceSink::new(), clock(), ExpiryPolicy::AllowContinue);
        let id = started(&service);
        assert!(matches!(service.navigate(id, 0), Err(Error::BadRequest(_))));
        assert!(matches!(service.navigate(id, -1), Err(Error::InvalidTransition(_))));
        assert_eq!(service.navigate(id, 1).unwrap().current_index, 1);
    }
}
