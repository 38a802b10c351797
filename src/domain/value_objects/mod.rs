//! # Value Objects
//!
//! - [`Timestamp`]: UTC instant with nanosecond precision

pub mod timestamp;

pub use timestamp::Timestamp;
