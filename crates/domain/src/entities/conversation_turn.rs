//! Conversation turn entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::TurnId;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Originator {
    /// Typed or dictated by the user
    User,
    /// Generated by the AI provider
    Assistant,
}

/// One message in a conversation
///
/// Turns are immutable once created; the fields are only reachable through
/// accessors so a stored transcript cannot be edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    id: TurnId,
    content: String,
    originator: Originator,
    created_at: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time
    pub fn new(originator: Originator, content: impl Into<String>) -> Self {
        Self {
            id: TurnId::new(),
            content: content.into(),
            originator,
            created_at: Utc::now(),
        }
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Originator::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Originator::Assistant, content)
    }

    /// Rebuild a turn from stored parts
    pub fn restore(
        id: TurnId,
        originator: Originator,
        content: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content: content.into(),
            originator,
            created_at,
        }
    }

    pub const fn id(&self) -> TurnId {
        self.id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub const fn originator(&self) -> Originator {
        self.originator
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Whether the user produced this turn
    pub fn is_user(&self) -> bool {
        self.originator == Originator::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_turn_has_user_originator() {
        let turn = ConversationTurn::user("Dear diary");
        assert_eq!(turn.originator(), Originator::User);
        assert_eq!(turn.content(), "Dear diary");
        assert!(turn.is_user());
    }

    #[test]
    fn assistant_turn_has_assistant_originator() {
        let turn = ConversationTurn::assistant("How did that feel?");
        assert_eq!(turn.originator(), Originator::Assistant);
        assert!(!turn.is_user());
    }

    #[test]
    fn restore_keeps_stored_parts() {
        let id = TurnId::new();
        let at = Utc::now();
        let turn = ConversationTurn::restore(id, Originator::Assistant, "stored", at);
        assert_eq!(turn.id(), id);
        assert_eq!(turn.created_at(), at);
        assert_eq!(turn.content(), "stored");
    }

    #[test]
    fn originator_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Originator::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Originator::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn turn_roundtrips_through_json() {
        let turn = ConversationTurn::user("Hello");
        let json = serde_json::to_string(&turn).unwrap();
        let parsed: ConversationTurn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, turn);
    }
}
