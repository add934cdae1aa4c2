//! In-memory session store.
//!
//! A session holds the ordered event log of one conversation. Nothing is
//! persisted; sessions live as long as the service does.

pub mod event;

pub use event::{Event, EventActions};

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session '{session_id}' already exists for app '{app_name}', user '{user_id}'")]
    AlreadyExists {
        app_name: String,
        user_id: String,
        session_id: String,
    },

    #[error("session '{session_id}' not found for app '{app_name}', user '{user_id}'")]
    NotFound {
        app_name: String,
        user_id: String,
        session_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(app_name: &str, user_id: &str, session_id: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
        }
    }

    fn not_found(&self) -> SessionError {
        SessionError::NotFound {
            app_name: self.app_name.clone(),
            user_id: self.user_id.clone(),
            session_id: self.session_id.clone(),
        }
    }
}

/// A single conversation's state.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: SessionKey,
    pub events: Vec<Event>,
    pub created_at: DateTime<Utc>,
}

/// Session service backed by a map in process memory.
#[derive(Debug, Default)]
pub struct InMemorySessionService {
    sessions: Mutex<HashMap<SessionKey, Session>>,
}

impl InMemorySessionService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session. Fails if the key is already taken.
    pub async fn create_session(
        &self,
        app_name: &str,
        user_id: &str,
        session_id: &str,
    ) -> Result<Session, SessionError> {
        let key = SessionKey::new(app_name, user_id, session_id);
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&key) {
            return Err(SessionError::AlreadyExists {
                app_name: key.app_name,
                user_id: key.user_id,
                session_id: key.session_id,
            });
        }

        let session = Session {
            key: key.clone(),
            events: Vec::new(),
            created_at: Utc::now(),
        };
        sessions.insert(key, session.clone());
        info!(
            "Session created: App='{}', User='{}', Session='{}'",
            app_name, user_id, session_id
        );
        Ok(session)
    }

    /// Snapshot of a session.
    pub async fn get_session(&self, key: &SessionKey) -> Option<Session> {
        self.sessions.lock().await.get(key).cloned()
    }

    /// Snapshot of a session's events.
    pub async fn events(&self, key: &SessionKey) -> Result<Vec<Event>, SessionError> {
        self.sessions
            .lock()
            .await
            .get(key)
            .map(|s| s.events.clone())
            .ok_or_else(|| key.not_found())
    }

    /// Append an event to the end of a session's log.
    pub async fn append_event(&self, key: &SessionKey, event: Event) -> Result<(), SessionError> {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_mut(key).ok_or_else(|| key.not_found())?;
        debug!(
            "Session '{}': event {} by '{}'",
            key.session_id, event.id, event.author
        );
        session.events.push(event);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_append() {
        let service = InMemorySessionService::new();
        let session = service.create_session("app", "user_1", "s1").await.unwrap();
        assert!(session.events.is_empty());

        let key = SessionKey::new("app", "user_1", "s1");
        service.append_event(&key, Event::user("inv", "first")).await.unwrap();
        service.append_event(&key, Event::user("inv", "second")).await.unwrap();

        let events = service.events(&key).await.unwrap();
        let texts: Vec<_> = events.iter().filter_map(|e| e.content.as_deref()).collect();
        assert_eq!(texts, vec!["first", "second"]);
        assert_eq!(service.get_session(&key).await.unwrap().events.len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_session_rejected() {
        let service = InMemorySessionService::new();
        service.create_session("app", "user_1", "s1").await.unwrap();
        let err = service.create_session("app", "user_1", "s1").await.unwrap_err();
        assert!(matches!(err, SessionError::AlreadyExists { .. }));

        // Same id under a different user is a different session.
        assert!(service.create_session("app", "user_2", "s1").await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_session() {
        let service = InMemorySessionService::new();
        let key = SessionKey::new("app", "nobody", "s1");
        assert!(service.get_session(&key).await.is_none());
        assert!(matches!(
            service.append_event(&key, Event::user("inv", "hi")).await,
            Err(SessionError::NotFound { .. })
        ));
        assert!(service.events(&key).await.is_err());
    }
}
