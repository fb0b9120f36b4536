//! HTLC Bridge
//!
//! Creates, claims and refunds hash-time-locked Bitcoin outputs backing a
//! redemption. Two implementations share one capability set:
//!
//! - `SimulatedBridge` - in-memory contracts for local/dev flows and tests
//! - `LiveBridge` - HTTP client against a real bridge API with secret-based
//!   claims and timeout-based refunds
//!
//! Mode selection is a construction-time choice, never per-call.

pub mod live;
pub mod secrets;
pub mod simulated;

use async_trait::async_trait;
use thiserror::Error;

pub use live::LiveBridge;
pub use secrets::{generate_secret, hash_secret, IntentSigner, SignerError};
pub use simulated::SimulatedBridge;

/// Parameters for creating a hash-time-locked output
#[derive(Debug, Clone)]
pub struct HtlcRequest {
    /// Destination Bitcoin address
    pub recipient: String,
    /// Locked amount in satoshis
    pub amount_sats: u64,
    /// Absolute unix timestamp after which the contract is refundable
    pub timeout: u64,
}

/// Handle to a created contract, returned by `HtlcBridge::create`
#[derive(Debug, Clone)]
pub struct HtlcHandle {
    /// Funding transaction / contract identifier
    pub txid: String,
    /// Hex-encoded sha256 of the claim preimage (live bridge only)
    pub secret_hash: Option<String>,
    /// Hex-encoded authorizing signature over the intent (live bridge only)
    pub signature: Option<String>,
}

/// Bridge errors
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid destination address: {0}")]
    InvalidAddress(String),

    #[error("contract creation failed: {0}")]
    CreateFailed(String),

    #[error("contract not found: {0}")]
    ContractNotFound(String),

    #[error("contract already settled: {0}")]
    AlreadySettled(String),

    #[error("claim failed: {0}")]
    ClaimFailed(String),

    #[error("refund failed: {0}")]
    RefundFailed(String),

    #[error("timeout not reached for contract {0}")]
    TimeoutNotReached(String),

    #[error("no claim secret held for contract {0}")]
    MissingSecret(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Bridge interface consumed by the redemption engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HtlcBridge: Send + Sync {
    /// Create a hash-time-locked output for the request.
    ///
    /// All-or-nothing from the caller's perspective: on error no contract
    /// exists and nothing needs cleanup.
    async fn create(&self, request: &HtlcRequest) -> Result<HtlcHandle, BridgeError>;

    /// Claim/settle a contract, returning the claim txid.
    ///
    /// Safe to call at most meaningfully once: settling an already-settled
    /// or refunded contract reports an error, never a double-pay.
    async fn settle(&self, handle: &HtlcHandle) -> Result<String, BridgeError>;

    /// Refund a contract after its timeout, returning the refund txid
    async fn refund(&self, handle: &HtlcHandle) -> Result<String, BridgeError>;

    /// Bridge mode description ("simulated" or "live")
    fn mode(&self) -> &'static str;
}
