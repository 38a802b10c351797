//! # Application Layer
//!
//! The engine's long-running loops, their pluggable policies and the
//! supervisor that starts and stops them.

pub mod error;
pub mod services;
