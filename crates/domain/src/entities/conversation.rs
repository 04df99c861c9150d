//! Conversation entity - The append-only transcript of one session

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{ConversationTurn, Originator};

/// Ordered sequence of turns for the duration of a session
///
/// Turns are only ever appended. "Clear chat" swaps the whole sequence for an
/// empty one; nothing is edited or removed individually.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<ConversationTurn>,
    started_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a new empty conversation
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            started_at: Utc::now(),
        }
    }

    /// Rebuild a conversation from turns loaded out of a store
    pub fn from_turns(turns: Vec<ConversationTurn>) -> Self {
        let started_at = turns
            .first()
            .map_or_else(Utc::now, ConversationTurn::created_at);
        Self { turns, started_at }
    }

    /// Append a turn
    pub fn append(&mut self, turn: ConversationTurn) -> &ConversationTurn {
        self.turns.push(turn);
        &self.turns[self.turns.len() - 1]
    }

    /// Append a user turn
    pub fn append_user(&mut self, content: impl Into<String>) -> &ConversationTurn {
        self.append(ConversationTurn::user(content))
    }

    /// Append an assistant turn
    pub fn append_assistant(&mut self, content: impl Into<String>) -> &ConversationTurn {
        self.append(ConversationTurn::assistant(content))
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    /// Most recent turn by the given originator
    pub fn last_by(&self, originator: Originator) -> Option<&ConversationTurn> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.originator() == originator)
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Replace the transcript wholesale with an empty one
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}
