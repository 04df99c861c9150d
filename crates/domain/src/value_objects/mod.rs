//! Value objects - Immutable, identity-less domain values

mod turn_id;

pub use turn_id::TurnId;
