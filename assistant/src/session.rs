//! Chat Session Store.
//!
//! Sessions live in process memory. Each one owns its model-facing
//! [`Conversation`] and a display transcript, and sits behind its own async
//! mutex so turns on one session are serialized while different sessions run
//! independently.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

use crate::conversation::Conversation;
use crate::error::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

/// One line of what the user saw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: Speaker,
    pub content: String,
}

#[derive(Debug)]
pub struct ChatSession {
    pub id: String,
    pub created_at: DateTime<Local>,
    pub conversation: Conversation,
    pub transcript: Vec<TranscriptEntry>,
}

impl ChatSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            created_at: Local::now(),
            conversation: Conversation::new(),
            transcript: Vec::new(),
        }
    }

    /// Adds a question/answer pair to the display transcript.
    pub fn record(&mut self, question: &str, answer: &str) {
        self.transcript.push(TranscriptEntry {
            role: Speaker::User,
            content: question.to_string(),
        });
        self.transcript.push(TranscriptEntry {
            role: Speaker::Assistant,
            content: answer.to_string(),
        });
    }
}

pub type SessionHandle = Arc<Mutex<ChatSession>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionList {
    /// Oldest first.
    pub sessions: Vec<String>,
    pub current: Option<String>,
}

#[derive(Default)]
struct Inner {
    order: Vec<String>,
    sessions: HashMap<String, SessionHandle>,
    current: Option<String>,
}

#[derive(Default)]
pub struct SessionStore {
    inner: RwLock<Inner>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new session and makes it current. Ids look like
    /// `chat_20250101_093000`, with `_2`, `_3`, ... on collisions.
    pub async fn create(&self) -> String {
        self.create_at(Local::now().naive_local()).await
    }

    pub(crate) async fn create_at(&self, now: NaiveDateTime) -> String {
        let base = format!("chat_{}", now.format("%Y%m%d_%H%M%S"));
        let mut g = self.inner.write().await;
        let mut id = base.clone();
        let mut n = 1;
        while g.sessions.contains_key(&id) {
            n += 1;
            id = format!("{base}_{n}");
        }
        g.sessions
            .insert(id.clone(), Arc::new(Mutex::new(ChatSession::new(id.clone()))));
        g.order.push(id.clone());
        g.current = Some(id.clone());
        info!(session = %id, "session created");
        id
    }

    pub async fn list(&self) -> SessionList {
        let g = self.inner.read().await;
        SessionList {
            sessions: g.order.clone(),
            current: g.current.clone(),
        }
    }

    pub async fn get(&self, id: &str) -> Result<SessionHandle, SessionError> {
        self.inner
            .read()
            .await
            .sessions
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub async fn select(&self, id: &str) -> Result<(), SessionError> {
        let mut g = self.inner.write().await;
        if !g.sessions.contains_key(id) {
            return Err(SessionError::NotFound(id.to_string()));
        }
        g.current = Some(id.to_string());
        Ok(())
    }

    pub async fn current(&self) -> Option<SessionHandle> {
        let g = self.inner.read().await;
        g.current.as_ref().and_then(|id| g.sessions.get(id).cloned())
    }

    /// Transcript snapshot of a session.
    pub async fn transcript(&self, id: &str) -> Result<Vec<TranscriptEntry>, SessionError> {
        let handle = self.get(id).await?;
        let s = handle.lock().await;
        Ok(s.transcript.clone())
    }

    /// Removes a session and its history. If it was current, the newest
    /// remaining session becomes current.
    pub async fn close(&self, id: &str) -> Result<(), SessionError> {
        let mut g = self.inner.write().await;
        if g.sessions.remove(id).is_none() {
            return Err(SessionError::NotFound(id.to_string()));
        }
        g.order.retain(|s| s != id);
        if g.current.as_deref() == Some(id) {
            g.current = g.order.last().cloned();
        }
        info!(session = %id, "session closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[tokio::test]
    async fn ids_are_timestamped_and_unique() {
        let store = SessionStore::new();
        let a = store.create_at(at(9, 30, 0)).await;
        let b = store.create_at(at(9, 30, 0)).await;
        let c = store.create_at(at(9, 30, 0)).await;
        assert_eq!(a, "chat_20250314_093000");
        assert_eq!(b, "chat_20250314_093000_2");
        assert_eq!(c, "chat_20250314_093000_3");

        let list = store.list().await;
        assert_eq!(list.sessions, vec![a, b, c.clone()]);
        assert_eq!(list.current, Some(c));
    }

    #[tokio::test]
    async fn select_and_close() {
        let store = SessionStore::new();
        let a = store.create_at(at(8, 0, 0)).await;
        let b = store.create_at(at(8, 0, 1)).await;

        store.select(&a).await.unwrap();
        assert_eq!(store.list().await.current.as_deref(), Some(a.as_str()));

        store.close(&a).await.unwrap();
        assert_eq!(store.list().await.current.as_deref(), Some(b.as_str()));
        assert_eq!(store.get(&a).await.unwrap_err(), SessionError::NotFound(a.clone()));
        assert!(store.select(&a).await.is_err());
        assert!(store.close(&a).await.is_err());
    }

    #[tokio::test]
    async fn transcript_records_pairs() {
        let store = SessionStore::new();
        let id = store.create().await;
        {
            let h = store.current().await.unwrap();
            h.lock().await.record("What is a SIP?", "A systematic investment plan.");
        }
        let t = store.transcript(&id).await.unwrap();
        assert_eq!(t.len(), 2);
        assert_eq!(t[0].role, Speaker::User);
        assert_eq!(t[1].content, "A systematic investment plan.");
    }
}
