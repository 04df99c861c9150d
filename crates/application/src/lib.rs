//! Application layer - Use cases and orchestration
//!
//! Ties the journal transcript, the completion gateway and speech output
//! together into the voice chat use case.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
