//! In-memory session log
//!
//! Voting sessions are append-only: once tallied they are never mutated,
//! which keeps concurrent readers trivial. The log is the single owner of
//! session history and the lookup target for override reviews.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::types::{SessionId, VotingSession};

/// Shared reference to a SessionLog
pub type SharedSessionLog = Arc<SessionLog>;

/// Append-only log of voting sessions with by-id lookup
pub struct SessionLog {
    inner: RwLock<LogInner>,
}

struct LogInner {
    sessions: Vec<VotingSession>,
    by_id: HashMap<SessionId, usize>,
}

impl SessionLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LogInner {
                sessions: Vec::new(),
                by_id: HashMap::new(),
            }),
        }
    }

    /// Create a shared reference to this log
    pub fn shared(self) -> SharedSessionLog {
        Arc::new(self)
    }

    /// Append a session to the history
    pub fn append(&self, session: VotingSession) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let index = inner.sessions.len();
        inner.by_id.insert(session.id.clone(), index);
        inner.sessions.push(session);
    }

    /// Look up a session by id
    pub fn get(&self, session_id: &str) -> Option<VotingSession> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner
            .by_id
            .get(session_id)
            .map(|&index| inner.sessions[index].clone())
    }

    /// The most recently appended session
    pub fn latest(&self) -> Option<VotingSession> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.sessions.last().cloned()
    }

    /// Number of recorded sessions
    pub fn len(&self) -> usize {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::types::new_id;
    use chrono::Utc;

    fn session(decision_type: &str) -> VotingSession {
        VotingSession {
            id: new_id(),
            timestamp: Utc::now(),
            decision_type: decision_type.to_string(),
            decisions: vec![],
            tally: vec![],
            winning_recommendation: "HOLD".to_string(),
            consensus_strength: 0.0,
            total_weight: 0.0,
            participants: vec![],
            exclusions: vec![],
        }
    }

    #[test]
    fn test_append_and_get() {
        let log = SessionLog::new();
        assert!(log.is_empty());

        let first = session("trading");
        let second = session("rebalance");
        log.append(first.clone());
        log.append(second.clone());

        assert_eq!(log.len(), 2);
        assert_eq!(log.get(&first.id).unwrap().decision_type, "trading");
        assert_eq!(log.latest().unwrap().id, second.id);
        assert!(log.get("missing").is_none());
    }
}
