//! Domain entities - Objects with identity and lifecycle

mod conversation;
mod conversation_turn;

pub use conversation::Conversation;
pub use conversation_turn::{ConversationTurn, Originator};
