//! BLOOM Redemption Engine
//!
//! Converts the synthetic BLOOM token back into its pegged BTC reserve
//! through an HTLC settlement flow, while enforcing a hard supply invariant
//! against an append-only mint/burn ledger.
//!
//! ## Components
//!
//! 1. **Peg Quoting** - fixed-ratio BLOOM -> satoshi conversion (10 BLOOM = 1 BTC)
//! 2. **Supply Ledger** - authoritative circulating-supply record (mint/burn)
//! 3. **HTLC Bridge** - creates/claims/refunds hash-time-locked outputs
//! 4. **Rate Limiter** - per-address fixed-window abuse mitigation
//! 5. **Redemption Engine** - orchestrates the intent lifecycle:
//!    `pending -> {completed, expired, failed}`
//!
//! The consuming layer (HTTP API, CLI, ...) is deliberately out of scope;
//! the engine is the programmatic boundary.

pub mod bridge;
pub mod common;
pub mod config;
pub mod engine;
pub mod ledger;
pub mod logging;
pub mod peg;
pub mod ratelimit;
pub mod types;

// Re-exports: engine
pub use engine::{EngineError, RedemptionEngine};

// Re-exports: intent types
pub use types::{EngineStats, IntentStatus, RedeemIntent};

// Re-exports: collaborators
pub use bridge::{
    BridgeError, HtlcBridge, HtlcHandle, HtlcRequest, IntentSigner, LiveBridge, SimulatedBridge,
};
pub use ledger::{InMemorySupplyLedger, LedgerError, LedgerTotals, SupplyLedger};
pub use ratelimit::RateLimiter;

// Re-exports: configuration and errors
pub use common::error::{BloomError, Result};
pub use config::{ConfigError, EngineConfig, Network};

// Re-exports: peg constants
pub use peg::{BLOOM_PER_BTC, SATS_PER_BLOOM, SATS_PER_BTC};
