//! Session repository abstraction.
//!
//! The engine and the history aggregator only ever talk to a
//! [`SessionRepository`]; [`Database`](super::Database) is the durable
//! implementation and [`MemoryRepository`] keeps everything in a `Vec`.

use std::cell::{Cell, RefCell};

use chrono::NaiveDate;

use crate::error::DatabaseError;
use crate::session::{Session, SessionId, SessionPatch, SessionStatus};

/// CRUD over one session record per calendar day.
///
/// Saving over a date whose record is `completed` must fail with
/// [`DatabaseError::DateCompleted`]; saving over an `interrupted` record
/// replaces it.
pub trait SessionRepository {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Session>, DatabaseError>;

    /// Store a new record and return its identity.
    fn save(&self, session: &Session) -> Result<SessionId, DatabaseError>;

    fn update(&self, id: SessionId, patch: &SessionPatch) -> Result<(), DatabaseError>;

    /// Every completed record, in no particular order.
    fn get_all_completed(&self) -> Result<Vec<Session>, DatabaseError>;

    /// Every record, newest date first.
    fn get_all(&self) -> Result<Vec<Session>, DatabaseError>;
}

impl<R: SessionRepository + ?Sized> SessionRepository for &R {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Session>, DatabaseError> {
        (**self).get_by_date(date)
    }

    fn save(&self, session: &Session) -> Result<SessionId, DatabaseError> {
        (**self).save(session)
    }

    fn update(&self, id: SessionId, patch: &SessionPatch) -> Result<(), DatabaseError> {
        (**self).update(id, patch)
    }

    fn get_all_completed(&self) -> Result<Vec<Session>, DatabaseError> {
        (**self).get_all_completed()
    }

    fn get_all(&self) -> Result<Vec<Session>, DatabaseError> {
        (**self).get_all()
    }
}

/// In-memory repository.
///
/// `fail_writes` makes every `save`/`update` fail, for exercising the
/// persistence failure paths.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    sessions: RefCell<Vec<Session>>,
    next_id: Cell<i64>,
    fail_writes: Cell<bool>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-filled with `sessions` (ids are assigned).
    pub fn with_sessions(sessions: impl IntoIterator<Item = Session>) -> Self {
        let repo = Self::new();
        for session in sessions {
            // Seed data bypasses the completed-date guard.
            let id = repo.allocate_id();
            repo.sessions.borrow_mut().push(Session {
                id: Some(id),
                ..session
            });
        }
        repo
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn len(&self) -> usize {
        self.sessions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.borrow().is_empty()
    }

    fn allocate_id(&self) -> SessionId {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        SessionId(id)
    }

    fn check_writable(&self) -> Result<(), DatabaseError> {
        if self.fail_writes.get() {
            Err(DatabaseError::QueryFailed("writes disabled".into()))
        } else {
            Ok(())
        }
    }
}

impl SessionRepository for MemoryRepository {
    fn get_by_date(&self, date: NaiveDate) -> Result<Option<Session>, DatabaseError> {
        Ok(self
            .sessions
            .borrow()
            .iter()
            .find(|s| s.date == date)
            .cloned())
    }

    fn save(&self, session: &Session) -> Result<SessionId, DatabaseError> {
        self.check_writable()?;
        let mut sessions = self.sessions.borrow_mut();
        if let Some(pos) = sessions.iter().position(|s| s.date == session.date) {
            if sessions[pos].status == SessionStatus::Completed {
                return Err(DatabaseError::DateCompleted(session.date));
            }
            sessions.remove(pos);
        }
        let id = self.allocate_id();
        sessions.push(Session {
            id: Some(id),
            ..session.clone()
        });
        Ok(id)
    }

    fn update(&self, id: SessionId, patch: &SessionPatch) -> Result<(), DatabaseError> {
        self.check_writable()?;
        let mut sessions = self.sessions.borrow_mut();
        let session = sessions
            .iter_mut()
            .find(|s| s.id == Some(id))
            .ok_or(DatabaseError::NotFound(id.0))?;
        if let Some(mood) = patch.mood {
            session.mood = Some(mood);
        }
        if let Some(note) = &patch.mood_note {
            session.mood_note = Some(note.clone());
        }
        Ok(())
    }

    fn get_all_completed(&self) -> Result<Vec<Session>, DatabaseError> {
        Ok(self
            .sessions
            .borrow()
            .iter()
            .filter(|s| s.is_completed())
            .cloned()
            .collect())
    }

    fn get_all(&self) -> Result<Vec<Session>, DatabaseError> {
        let mut all = self.sessions.borrow().clone();
        all.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(all)
    }
}
