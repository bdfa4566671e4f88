//! `authcore-core` — shared primitives for the authorization core.
//!
//! This crate contains **pure** building blocks (no IO, no global state).

pub mod clock;
pub mod error;
pub mod value_object;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{DomainError, DomainResult};
pub use value_object::ValueObject;
