//! Supply Ledger
//!
//! Authoritative record of circulating BLOOM via mint/burn events. The
//! engine only ever burns after a confirmed HTLC settlement; mint events
//! originate elsewhere in the system.
//!
//! Implementations:
//! - `InMemorySupplyLedger` - in-process ledger for dev flows and testing

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

/// Ledger errors
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid ledger amount: {0}")]
    InvalidAmount(u64),

    #[error("burn of {burn} exceeds circulating supply {supply}")]
    BurnExceedsSupply { supply: u64, burn: u64 },

    #[error("supply overflow")]
    SupplyOverflow,
}

/// Append-only mint/burn ledger interface
///
/// `record_burn` must be atomic with respect to the ledger's own concurrency
/// discipline; callers treat it as a single external operation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SupplyLedger: Send + Sync {
    /// Current circulating supply
    async fn current_supply(&self) -> u64;

    /// Record a mint event, increasing circulating supply
    async fn record_mint(&self, amount: u64) -> Result<(), LedgerError>;

    /// Record a burn event, decreasing circulating supply.
    ///
    /// Burning more than the current supply is a ledger-level error; the
    /// engine validates before calling and must never trigger it.
    async fn record_burn(&self, amount: u64) -> Result<(), LedgerError>;
}

/// Running mint/burn totals
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct LedgerTotals {
    pub supply: u64,
    pub total_minted: u64,
    pub total_burned: u64,
}

#[derive(Debug, Default)]
struct LedgerState {
    supply: u64,
    total_minted: u64,
    total_burned: u64,
}

/// In-memory supply ledger
///
/// Thread-safe; uses Arc<RwLock<>> for concurrent access.
#[derive(Clone, Default)]
pub struct InMemorySupplyLedger {
    state: Arc<RwLock<LedgerState>>,
}

impl InMemorySupplyLedger {
    /// Create an empty ledger (supply 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the running totals
    pub async fn totals(&self) -> LedgerTotals {
        let state = self.state.read().await;
        LedgerTotals {
            supply: state.supply,
            total_minted: state.total_minted,
            total_burned: state.total_burned,
        }
    }
}

#[async_trait]
impl SupplyLedger for InMemorySupplyLedger {
    async fn current_supply(&self) -> u64 {
        self.state.read().await.supply
    }

    async fn record_mint(&self, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut state = self.state.write().await;
        state.supply = state
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::SupplyOverflow)?;
        state.total_minted += amount;
        Ok(())
    }

    async fn record_burn(&self, amount: u64) -> Result<(), LedgerError> {
        if amount == 0 {
            return Err(LedgerError::InvalidAmount(amount));
        }

        let mut state = self.state.write().await;
        if amount > state.supply {
            return Err(LedgerError::BurnExceedsSupply {
                supply: state.supply,
                burn: amount,
            });
        }
        state.supply -= amount;
        state.total_burned += amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mint_and_burn() {
        let ledger = InMemorySupplyLedger::new();
        assert_eq!(ledger.current_supply().await, 0);

        ledger.record_mint(10).await.unwrap();
        assert_eq!(ledger.current_supply().await, 10);

        ledger.record_burn(4).await.unwrap();
        assert_eq!(ledger.current_supply().await, 6);

        let totals = ledger.totals().await;
        assert_eq!(totals.total_minted, 10);
        assert_eq!(totals.total_burned, 4);
    }

    #[tokio::test]
    async fn test_burn_exceeding_supply_rejected() {
        let ledger = InMemorySupplyLedger::new();
        ledger.record_mint(5).await.unwrap();

        let result = ledger.record_burn(6).await;
        assert!(matches!(
            result,
            Err(LedgerError::BurnExceedsSupply { supply: 5, burn: 6 })
        ));

        // Supply untouched by the failed burn
        assert_eq!(ledger.current_supply().await, 5);
    }

    #[tokio::test]
    async fn test_zero_amounts_rejected() {
        let ledger = InMemorySupplyLedger::new();
        assert!(matches!(
            ledger.record_mint(0).await,
            Err(LedgerError::InvalidAmount(0))
        ));
        assert!(matches!(
            ledger.record_burn(0).await,
            Err(LedgerError::InvalidAmount(0))
        ));
    }

    #[tokio::test]
    async fn test_supply_never_negative() {
        let ledger = InMemorySupplyLedger::new();
        assert!(ledger.record_burn(1).await.is_err());
        assert_eq!(ledger.current_supply().await, 0);
    }
}
