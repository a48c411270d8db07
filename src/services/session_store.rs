use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::session::QuizSession;

pub type SessionHandle = Arc<Mutex<QuizSession>>;

/// Sessions keyed by id. The map lock only guards lookup and insertion;
/// each session is mutated under its own mutex.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: QuizSession) -> Result<Uuid> {
        let id = session.id();
        let mut sessions = self
            .sessions
            .write()
            .map_err(|_| Error::Internal("session store lock poisoned".to_string()))?;
        sessions.insert(id, Arc::new(Mutex::new(session)));
        Ok(id)
    }

    pub fn get(&self, id: Uuid) -> Result<SessionHandle> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| Error::Internal("session store lock poisoned".to_string()))?;
        sessions
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Session {} not found", id)))
    }

    pub fn ids(&self) -> Result<Vec<Uuid>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|_| Error::Internal("session store lock poisoned".to_string()))?;
        Ok(sessions.keys().copied().collect())
    }
}

pub fn lock(handle: &SessionHandle) -> Result<MutexGuard<'_, QuizSession>> {
    handle
        .lock()
        .map_err(|_| Error::Internal("session lock poisoned".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::Question;
    use chrono::Utc;

    #[test]
    fn sessions_are_isolated_by_id() {
        let store = SessionStore::new();
        let a = store.insert(QuizSession::new("Ada", "a-1", 60).unwrap()).unwrap();
        let b = store.insert(QuizSession::new("Bob", "b-1", 60).unwrap()).unwrap();
        assert_ne!(a, b);

        let questions = vec![Question::new("Q", "Easy", "ML", "out")];
        {
            let handle = store.get(a).unwrap();
            let mut session = lock(&handle).unwrap();
            session.start(questions, Utc::now()).unwrap();
            session.save_answer(0, "mine".into()).unwrap();
        }

        let handle = store.get(b).unwrap();
        let other = lock(&handle).unwrap();
        assert_eq!(other.candidate_name(), "Bob");
        assert!(other.selected_questions().is_empty());
        assert_eq!(other.answer(0), None);

        let mut ids = store.ids().unwrap();
        ids.sort();
        let mut expected = vec![a, b];
        expected.sort();
        assert_eq!(ids, expected);
    }

    #[test]
    fn unknown_id_is_not_found() {
        let store = SessionStore::new();
        assert!(matches!(store.get(Uuid::new_v4()), Err(Error::NotFound(_))));
    }
}
