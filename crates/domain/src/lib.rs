//! Domain layer for Journal Voice
//!
//! Conversation turns and the append-only session transcript that the
//! gateway and the chat flow operate on. No I/O lives here.

pub mod entities;
pub mod value_objects;

pub use entities::*;
pub use value_objects::*;
