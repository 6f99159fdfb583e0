//! Bounded per-session conversation history.
//!
//! Sessions are keyed by an opaque identifier and live only in memory: an
//! identifier reused after a restart simply starts with fresh empty history.
//! Mutation is serialized per identifier (outer map lock, then a per-session
//! lock), so concurrent queries on distinct sessions never interfere and
//! appends to the same session never interleave.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Author of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationRole {
    User,
    Assistant,
}

impl ConversationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationRole::User => "User",
            ConversationRole::Assistant => "Assistant",
        }
    }
}

/// One turn of a session's history.
#[derive(Debug, Clone)]
pub struct ConversationTurn {
    pub role: ConversationRole,
    pub content: String,
}

type Turns = Arc<Mutex<VecDeque<ConversationTurn>>>;

/// In-memory store of bounded conversation histories.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Turns>>,

    /// Maximum turns kept per session; oldest evicted first
    max_turns: usize,
}

impl SessionStore {
    /// Create a store keeping at most `max_exchanges` user/assistant pairs
    /// per session.
    pub fn new(max_exchanges: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_turns: max_exchanges * 2,
        }
    }

    /// Mint a fresh session identifier.
    pub fn create_session(&self) -> String {
        let id = Uuid::new_v4().to_string();
        tracing::debug!(session = %id, "Created session");
        id
    }

    /// Current history for a session, oldest turn first.
    ///
    /// Unknown identifiers yield empty history; the session itself is only
    /// materialized when a turn is appended.
    pub fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        let sessions = self.sessions.lock().unwrap();
        match sessions.get(session_id) {
            Some(turns) => turns.lock().unwrap().iter().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Append one completed exchange (user turn then assistant turn).
    ///
    /// Turns beyond the cap are evicted oldest-first.
    pub fn append_exchange(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        let turns = self.entry(session_id);
        let mut turns = turns.lock().unwrap();

        turns.push_back(ConversationTurn {
            role: ConversationRole::User,
            content: user_text.to_string(),
        });
        turns.push_back(ConversationTurn {
            role: ConversationRole::Assistant,
            content: assistant_text.to_string(),
        });

        while turns.len() > self.max_turns {
            turns.pop_front();
        }
    }

    /// Number of materialized sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    /// Drop every session. The only way histories are destroyed.
    pub fn reset_all(&self) {
        let mut sessions = self.sessions.lock().unwrap();
        let dropped = sessions.len();
        sessions.clear();
        tracing::info!(sessions = dropped, "Reset all sessions");
    }

    /// Per-session handle, creating the session on first use. The map lock
    /// is released before the caller locks the session itself.
    fn entry(&self, session_id: &str) -> Turns {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(VecDeque::new())))
            .clone()
    }
}

/// Render history as the text block injected into the system instruction.
pub fn format_history(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role.as_str(), turn.content))
        .collect::<Vec<_>>()
        .join("\n")
}
