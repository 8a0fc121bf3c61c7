use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;
use crate::constants::{MAX_SESSIONS, SESSION_IDLE_TTL_MINUTES};
use crate::map_view::MapView;

pub type SessionId = u64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("unknown session {0}")]
    Unknown(SessionId),

    #[error("event {seq} for session {id} arrived after event {last}")]
    Stale { id: SessionId, seq: u64, last: u64 },
}

#[derive(Debug)]
struct Session {
    view: MapView,
    last_seen: DateTime<Utc>,
    // Highest client sequence number applied so far
    last_seq: u64,
}

/// One `MapView` per open browser tab.
///
/// When full, the session that was used least recently is dropped.
#[derive(Debug)]
pub struct SessionRegistry {
    next_id: SessionId,
    sessions: BTreeMap<SessionId, Session>,
    capacity: usize,
    idle_ttl: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(MAX_SESSIONS, Duration::minutes(SESSION_IDLE_TTL_MINUTES))
    }
}

impl SessionRegistry {
    pub fn new(capacity: usize, idle_ttl: Duration) -> Self {
        Self {
            next_id: 1,
            sessions: BTreeMap::new(),
            capacity: capacity.max(1),
            idle_ttl,
        }
    }

    pub fn create(&mut self, catalog: Catalog, now: DateTime<Utc>) -> (SessionId, &MapView) {
        self.evict_idle(now);
        while self.sessions.len() >= self.capacity {
            let Some(stalest) = self
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            self.sessions.remove(&stalest);
            debug!(session = stalest, "evicting least recently used session");
        }

        let id = self.next_id;
        self.next_id += 1;
        let session = self.sessions.entry(id).or_insert(Session {
            view: MapView::new(catalog),
            last_seen: now,
            last_seq: 0,
        });
        (id, &session.view)
    }

    pub fn get_mut(&mut self, id: SessionId, now: DateTime<Utc>) -> Option<&mut MapView> {
        let session = self.sessions.get_mut(&id)?;
        session.last_seen = now;
        Some(&mut session.view)
    }

    /// Like `get_mut`, but admits an event only if its sequence number is
    /// newer than every event already applied to the session. Events without
    /// a sequence number are always admitted.
    pub fn ordered(
        &mut self,
        id: SessionId,
        seq: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<&mut MapView, SessionError> {
        let session = self.sessions.get_mut(&id).ok_or(SessionError::Unknown(id))?;
        if let Some(seq) = seq {
            if seq <= session.last_seq {
                return Err(SessionError::Stale {
                    id,
                    seq,
                    last: session.last_seq,
                });
            }
            session.last_seq = seq;
        }
        session.last_seen = now;
        Ok(&mut session.view)
    }

    pub fn remove(&mut self, id: SessionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    pub fn evict_idle(&mut self, now: DateTime<Utc>) {
        let ttl = self.idle_ttl;
        let before = self.sessions.len();
        self.sessions.retain(|_, s| now - s.last_seen < ttl);
        let evicted = before - self.sessions.len();
        if evicted > 0 {
            debug!(evicted, "idle sessions evicted");
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
