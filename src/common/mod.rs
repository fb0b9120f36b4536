//! Common Utilities
//!
//! Shared error types used across modules.

pub mod error;

pub use error::{BloomError, Result};
