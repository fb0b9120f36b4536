//! Redemption Engine
//!
//! Orchestrates the redemption intent lifecycle:
//!
//! ```text
//! request_redeem(amount, address)
//!   -> [rate limit] -> [supply check] -> [peg quote] -> [bridge.create]
//!   -> intent persisted as `pending`
//! complete_redemption(id)
//!   -> [deadline check] -> [bridge.settle] -> [ledger.record_burn]
//!   -> intent `completed`
//! ```
//!
//! The engine is the single logical owner of the intent registry. Operations
//! on the same intent id are serialized by a per-intent lock; the registry
//! lock itself is never held across bridge I/O.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::bridge::{
    BridgeError, HtlcBridge, HtlcHandle, HtlcRequest, IntentSigner, LiveBridge, SimulatedBridge,
};
use crate::config::EngineConfig;
use crate::ledger::{LedgerError, SupplyLedger};
use crate::logging::log_redemption_event;
use crate::peg;
use crate::ratelimit::RateLimiter;
use crate::types::{EngineStats, IntentStatus, RedeemIntent};

/// Engine errors
///
/// Every rejection names the violated invariant so callers can distinguish
/// "try again later" from "needs more supply" from "already settled".
/// Validation errors have no side effects.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid redemption amount: {got}")]
    InvalidAmount { got: u64 },

    #[error("rate limit exceeded for address {address}")]
    RateLimitExceeded { address: String },

    #[error("insufficient supply: requested {requested}, circulating {supply}")]
    InsufficientSupply { requested: u64, supply: u64 },

    #[error("intent not found: {0}")]
    IntentNotFound(String),

    #[error("intent {id} is not pending (status: {status})")]
    IntentNotPending { id: String, status: IntentStatus },

    #[error("bridge error: {0}")]
    Bridge(#[from] BridgeError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

impl EngineError {
    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            EngineError::InvalidAmount { .. } => "INVALID_AMOUNT",
            EngineError::RateLimitExceeded { .. } => "RATE_LIMIT_EXCEEDED",
            EngineError::InsufficientSupply { .. } => "INSUFFICIENT_SUPPLY",
            EngineError::IntentNotFound(_) => "INTENT_NOT_FOUND",
            EngineError::IntentNotPending { .. } => "INTENT_NOT_PENDING",
            EngineError::Bridge(_) => "BRIDGE_ERROR",
            EngineError::Ledger(_) => "LEDGER_ERROR",
        }
    }
}

/// Redemption engine
///
/// Constructor-injected: owns its registry and holds handles to the supply
/// ledger and the HTLC bridge. No process-wide state; callers pass a
/// reference (or clone an `Arc`).
pub struct RedemptionEngine {
    config: EngineConfig,
    ledger: Arc<dyn SupplyLedger>,
    bridge: Arc<dyn HtlcBridge>,
    limiter: RateLimiter,
    /// Intent registry; entries are never deleted (audit trail)
    intents: RwLock<HashMap<String, RedeemIntent>>,
    /// Per-intent critical-section locks
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl RedemptionEngine {
    /// Create an engine with explicit ledger and bridge handles
    pub fn new(
        config: EngineConfig,
        ledger: Arc<dyn SupplyLedger>,
        bridge: Arc<dyn HtlcBridge>,
    ) -> Self {
        let limiter = RateLimiter::new(
            config.rate_limit_max,
            Duration::from_secs(config.rate_limit_window_secs),
        );

        Self {
            config,
            ledger,
            bridge,
            limiter,
            intents: RwLock::new(HashMap::new()),
            locks: RwLock::new(HashMap::new()),
        }
    }

    /// Create an engine against a fresh simulated bridge (dev flows, tests)
    pub fn simulated(config: EngineConfig, ledger: Arc<dyn SupplyLedger>) -> Self {
        Self::new(config, ledger, Arc::new(SimulatedBridge::new()))
    }

    /// Create an engine against the live bridge for the configured network.
    ///
    /// An empty `signer_key` means an ephemeral key (devnet only by
    /// convention; `EngineConfig::from_env` requires the key off-devnet).
    pub fn live(
        config: EngineConfig,
        ledger: Arc<dyn SupplyLedger>,
    ) -> Result<Self, crate::bridge::SignerError> {
        let signer = if config.signer_key.is_empty() {
            IntentSigner::generate()
        } else {
            IntentSigner::from_hex(&config.signer_key)?
        };

        let bridge = LiveBridge::new(
            &config.bridge_api,
            config.network.bitcoin_network(),
            signer,
        );

        Ok(Self::new(config, ledger, Arc::new(bridge)))
    }

    /// Bridge mode description
    pub fn bridge_mode(&self) -> &'static str {
        self.bridge.mode()
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }

    /// Request a redemption of `bloom_amount` BLOOM to `btc_address`.
    ///
    /// Validation is fail-fast in a fixed order: amount, rate limit, supply.
    /// Creation is all-or-nothing: a bridge failure leaves no intent behind.
    /// The returned intent carries the quote and deadline the caller needs
    /// to fund the counter-leg.
    pub async fn request_redeem(
        &self,
        bloom_amount: u64,
        btc_address: &str,
    ) -> Result<RedeemIntent, EngineError> {
        if bloom_amount == 0 {
            return Err(EngineError::InvalidAmount { got: bloom_amount });
        }

        if !self.limiter.check_and_consume(btc_address) {
            return Err(EngineError::RateLimitExceeded {
                address: btc_address.to_string(),
            });
        }

        let supply = self.ledger.current_supply().await;
        if bloom_amount > supply {
            return Err(EngineError::InsufficientSupply {
                requested: bloom_amount,
                supply,
            });
        }

        // Settled at the quote captured now, never re-quoted
        let quoted_sats =
            peg::quote(bloom_amount).ok_or(EngineError::InvalidAmount { got: bloom_amount })?;
        let deadline = Self::now() + self.config.redeem_ttl_secs;

        // The only step that can fail due to an external system; nothing is
        // persisted until it succeeds.
        let handle = self
            .bridge
            .create(&HtlcRequest {
                recipient: btc_address.to_string(),
                amount_sats: quoted_sats,
                timeout: deadline,
            })
            .await?;

        let mut intent =
            RedeemIntent::new(bloom_amount, btc_address.to_string(), quoted_sats, deadline);
        intent.btc_txid = handle.txid;
        intent.secret_hash = handle.secret_hash;
        intent.signature = handle.signature;

        {
            let mut intents = self.intents.write().await;
            let mut locks = self.locks.write().await;
            locks.insert(intent.id.clone(), Arc::new(Mutex::new(())));
            intents.insert(intent.id.clone(), intent.clone());
        }

        log_redemption_event(
            "redeem_requested",
            &intent.id,
            bloom_amount,
            quoted_sats,
            btc_address,
            true,
            None,
        );

        Ok(intent)
    }

    /// Complete a pending redemption.
    ///
    /// Returns `Ok(true)` when the HTLC settled and the tokens were burned.
    /// Returns `Ok(false)` for the two expected non-completions: deadline
    /// expiry (intent becomes `expired`) and bridge settlement failure
    /// (intent becomes `failed`, error recorded on the intent). Both are
    /// terminal; a retry is a new intent.
    pub async fn complete_redemption(&self, id: &str) -> Result<bool, EngineError> {
        let lock = self
            .intent_lock(id)
            .await
            .ok_or_else(|| EngineError::IntentNotFound(id.to_string()))?;

        // Critical section: the status check-then-act below is the sole
        // guard against double completion and double burn.
        let _guard = lock.lock().await;

        let intent = {
            let intents = self.intents.read().await;
            intents
                .get(id)
                .cloned()
                .ok_or_else(|| EngineError::IntentNotFound(id.to_string()))?
        };

        if intent.status != IntentStatus::Pending {
            return Err(EngineError::IntentNotPending {
                id: id.to_string(),
                status: intent.status,
            });
        }

        if Self::now() > intent.deadline {
            self.transition(id, |i| i.mark_expired()).await;
            log_redemption_event(
                "redeem_expired",
                id,
                intent.bloom_amount,
                intent.quoted_sats,
                &intent.btc_address,
                false,
                Some("deadline passed"),
            );
            return Ok(false);
        }

        let handle = HtlcHandle {
            txid: intent.btc_txid.clone(),
            secret_hash: intent.secret_hash.clone(),
            signature: intent.signature.clone(),
        };

        let claim_txid = match self.bridge.settle(&handle).await {
            Ok(txid) => txid,
            Err(e) => {
                let msg = e.to_string();
                self.transition(id, |i| i.mark_failed(msg.clone())).await;
                log_redemption_event(
                    "redeem_failed",
                    id,
                    intent.bloom_amount,
                    intent.quoted_sats,
                    &intent.btc_address,
                    false,
                    Some(&msg),
                );
                return Ok(false);
            }
        };

        // The single point where tokens leave circulation, strictly after
        // bridge confirmation.
        if let Err(e) = self.ledger.record_burn(intent.bloom_amount).await {
            // BTC settled but the burn was refused; terminal and flagged for
            // operator inspection.
            let msg = e.to_string();
            self.transition(id, |i| i.mark_failed(msg.clone())).await;
            tracing::error!(
                target: "bloom::redemption",
                intent_id = %id,
                error = %msg,
                "burn refused after settled HTLC; supply reconciliation required"
            );
            return Err(e.into());
        }

        self.transition(id, |i| i.mark_completed(claim_txid)).await;
        log_redemption_event(
            "redeem_completed",
            id,
            intent.bloom_amount,
            intent.quoted_sats,
            &intent.btc_address,
            true,
            None,
        );

        Ok(true)
    }

    /// Upper bound on the redeemable amount: the lesser of what the locked
    /// BTC reserve covers and the outstanding supply.
    ///
    /// Advisory only; `request_redeem` re-validates against live supply.
    pub async fn calculate_max_redeemable(&self, locked_sats: u64) -> u64 {
        let by_reserve = peg::max_bloom_for_locked(locked_sats);
        let supply = self.ledger.current_supply().await;
        by_reserve.min(supply)
    }

    /// Get an intent by ID
    pub async fn get_intent(&self, id: &str) -> Option<RedeemIntent> {
        self.intents.read().await.get(id).cloned()
    }

    /// Get all intents
    pub async fn intents(&self) -> Vec<RedeemIntent> {
        self.intents.read().await.values().cloned().collect()
    }

    /// Statistics snapshot derived from the registry
    pub async fn stats(&self) -> EngineStats {
        let intents = self.intents.read().await;

        let mut stats = EngineStats {
            total_intents: intents.len() as u64,
            ..EngineStats::default()
        };

        for intent in intents.values() {
            match intent.status {
                IntentStatus::Pending => stats.pending += 1,
                IntentStatus::Completed => {
                    stats.completed += 1;
                    stats.total_bloom_burned += intent.bloom_amount;
                    stats.total_sats_settled += intent.quoted_sats;
                }
                IntentStatus::Expired => stats.expired += 1,
                IntentStatus::Failed => stats.failed += 1,
            }
        }

        stats
    }

    async fn intent_lock(&self, id: &str) -> Option<Arc<Mutex<()>>> {
        self.locks.read().await.get(id).cloned()
    }

    async fn transition(&self, id: &str, f: impl FnOnce(&mut RedeemIntent)) {
        let mut intents = self.intents.write().await;
        if let Some(intent) = intents.get_mut(id) {
            f(intent);
        }
    }
}
