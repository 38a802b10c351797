//! # Domain Layer
//!
//! Trade records and the value types they are built from. Nothing here
//! performs I/O.

pub mod entities;
pub mod value_objects;
