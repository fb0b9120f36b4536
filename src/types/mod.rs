//! Shared Types
//!
//! Intent and statistics types for the redemption engine.

pub mod intent;

pub use intent::{EngineStats, IntentStatus, RedeemIntent};
