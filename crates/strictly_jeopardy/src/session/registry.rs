//! Live sessions keyed by channel.

use super::error::SessionError;
use super::game::JeopardySession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Tracks at most one live session per channel.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<HashMap<String, JeopardySession>>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session registry");
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, JeopardySession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a session under its id.
    ///
    /// A finished session with the same id is replaced.
    ///
    /// # Errors
    ///
    /// [`SessionError::AlreadyRunning`] if a live session holds the id.
    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    pub fn try_insert(&self, session: JeopardySession) -> Result<(), SessionError> {
        let mut sessions = self.lock();
        if let Some(existing) = sessions.get(session.id())
            && !existing.state().is_over()
        {
            warn!("Session already running in channel");
            return Err(SessionError::AlreadyRunning(session.id().to_string()));
        }
        info!(active = sessions.len() + 1, "Session registered");
        sessions.insert(session.id().to_string(), session);
        Ok(())
    }

    /// Looks up a session.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<JeopardySession> {
        let session = self.lock().get(id).cloned();
        debug!(found = session.is_some(), "Session lookup");
        session
    }

    /// Removes a session, returning it if present.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &str) -> Option<JeopardySession> {
        let removed = self.lock().remove(id);
        if removed.is_some() {
            info!("Session removed");
        }
        removed
    }

    /// Ids of all registered sessions, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.lock().keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Clue, ClueBoard};

    fn session(id: &str) -> JeopardySession {
        let mut board = ClueBoard::new();
        board
            .add_category("SCIENCE", vec![Clue::new("", "H2O", "water", 200)])
            .unwrap();
        JeopardySession::new(id, board)
    }

    #[test]
    fn test_one_live_session_per_channel() {
        let registry = SessionRegistry::new();
        registry.try_insert(session("general")).unwrap();
        let err = registry.try_insert(session("general")).unwrap_err();
        assert_eq!(err, SessionError::AlreadyRunning("general".to_string()));
        registry.try_insert(session("random")).unwrap();
        assert_eq!(registry.list(), vec!["general", "random"]);
    }

    #[tokio::test]
    async fn test_finished_session_is_replaced() {
        let registry = SessionRegistry::new();
        let first = session("general");
        registry.try_insert(first.clone()).unwrap();
        first.stop().await.unwrap();
        registry.try_insert(session("general")).unwrap();
        assert!(!registry.get("general").unwrap().state().is_over());
    }

    #[test]
    fn test_remove() {
        let registry = SessionRegistry::new();
        registry.try_insert(session("general")).unwrap();
        assert!(registry.remove("general").is_some());
        assert!(registry.get("general").is_none());
        assert!(registry.remove("general").is_none());
    }
}
