//! Redemption Intent Types
//!
//! The central entity of the engine: a uniquely identified redemption
//! request moving from `pending` to exactly one terminal state.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a redemption intent
///
/// `Pending` is the only non-terminal state; no transitions leave
/// `Completed`, `Expired` or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntentStatus {
    /// HTLC created, waiting for completion or expiry
    Pending,
    /// HTLC claimed and tokens burned
    Completed,
    /// Deadline passed before completion
    Expired,
    /// Bridge settlement or burn failed
    Failed,
}

impl Default for IntentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Completed => write!(f, "completed"),
            Self::Expired => write!(f, "expired"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

impl IntentStatus {
    /// Whether this is a terminal state
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A redemption intent
///
/// `quoted_sats` is captured once at creation and never re-quoted;
/// settlement happens at the quote of request time. Intents are kept
/// forever in the registry as an audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemIntent {
    /// Unique intent ID
    pub id: String,
    /// BLOOM amount requested for redemption
    pub bloom_amount: u64,
    /// Destination Bitcoin address
    pub btc_address: String,
    /// Satoshi amount quoted at creation (bloom_amount * SATS_PER_BLOOM)
    pub quoted_sats: u64,
    /// Unix timestamp after which the intent can no longer be completed
    pub deadline: u64,
    /// Current status
    pub status: IntentStatus,
    /// HTLC funding transaction / contract identifier
    pub btc_txid: String,
    /// Claim transaction ID (set on completion)
    pub claim_txid: Option<String>,
    /// Hex-encoded sha256 of the claim preimage (live bridge only)
    pub secret_hash: Option<String>,
    /// Hex-encoded authorizing signature over the intent (live bridge only)
    pub signature: Option<String>,
    /// Timestamp when the intent was created
    pub created_at: u64,
    /// Timestamp of last update
    pub updated_at: u64,
    /// Error message if failed
    pub error: Option<String>,
}

impl RedeemIntent {
    /// Create a new pending intent
    pub fn new(bloom_amount: u64, btc_address: String, quoted_sats: u64, deadline: u64) -> Self {
        let now = chrono::Utc::now().timestamp() as u64;

        Self {
            id: format!("rdm_{}", uuid::Uuid::new_v4().simple()),
            bloom_amount,
            btc_address,
            quoted_sats,
            deadline,
            status: IntentStatus::Pending,
            btc_txid: String::new(),
            claim_txid: None,
            secret_hash: None,
            signature: None,
            created_at: now,
            updated_at: now,
            error: None,
        }
    }

    /// Mark as completed with the claim txid
    pub fn mark_completed(&mut self, claim_txid: String) {
        self.claim_txid = Some(claim_txid);
        self.status = IntentStatus::Completed;
        self.touch();
    }

    /// Mark as expired
    pub fn mark_expired(&mut self) {
        self.status = IntentStatus::Expired;
        self.touch();
    }

    /// Mark as failed
    pub fn mark_failed(&mut self, error: String) {
        self.error = Some(error);
        self.status = IntentStatus::Failed;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp() as u64;
    }
}

/// Engine statistics snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineStats {
    pub total_intents: u64,
    pub pending: u64,
    pub completed: u64,
    pub expired: u64,
    pub failed: u64,
    /// Total BLOOM burned through completed redemptions
    pub total_bloom_burned: u64,
    /// Total satoshis quoted across completed redemptions
    pub total_sats_settled: u64,
}

impl std::fmt::Display for EngineStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Intents: {} total | {} pending | {} completed | {} expired | {} failed",
            self.total_intents, self.pending, self.completed, self.expired, self.failed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_intent_is_pending() {
        let intent = RedeemIntent::new(5, "tb1qaddr".to_string(), 50_000_000, 1_800_000_000);

        assert!(intent.id.starts_with("rdm_"));
        assert_eq!(intent.status, IntentStatus::Pending);
        assert!(!intent.status.is_terminal());
        assert_eq!(intent.quoted_sats, 50_000_000);
        assert!(intent.claim_txid.is_none());
        assert!(intent.error.is_none());
    }

    #[test]
    fn test_terminal_transitions() {
        let mut intent = RedeemIntent::new(5, "tb1qaddr".to_string(), 50_000_000, 0);

        intent.mark_completed("txid_claim".to_string());
        assert_eq!(intent.status, IntentStatus::Completed);
        assert!(intent.status.is_terminal());
        assert_eq!(intent.claim_txid.as_deref(), Some("txid_claim"));

        let mut intent = RedeemIntent::new(5, "tb1qaddr".to_string(), 50_000_000, 0);
        intent.mark_failed("bridge down".to_string());
        assert_eq!(intent.status, IntentStatus::Failed);
        assert_eq!(intent.error.as_deref(), Some("bridge down"));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(IntentStatus::Pending.to_string(), "pending");
        assert_eq!(IntentStatus::Completed.to_string(), "completed");
        assert_eq!(IntentStatus::Expired.to_string(), "expired");
        assert_eq!(IntentStatus::Failed.to_string(), "failed");
    }
}
