//! Simulated HTLC Bridge
//!
//! In-memory contract table standing in for the on-chain bridge. Used by
//! local/dev flows and tests; enforces the same at-most-once settlement and
//! refund-after-timeout rules as the live bridge.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use async_trait::async_trait;

use super::{BridgeError, HtlcBridge, HtlcHandle, HtlcRequest};

#[derive(Debug, Clone)]
struct SimContract {
    recipient: String,
    amount_sats: u64,
    timeout: u64,
    settled: bool,
    refunded: bool,
}

/// Simulated bridge
#[derive(Clone, Default)]
pub struct SimulatedBridge {
    contracts: Arc<RwLock<HashMap<String, SimContract>>>,
}

impl SimulatedBridge {
    /// Create an empty simulated bridge
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of contracts ever created
    pub async fn contract_count(&self) -> usize {
        self.contracts.read().await.len()
    }

    /// Recipient of a contract, if it exists
    pub async fn contract_recipient(&self, txid: &str) -> Option<String> {
        self.contracts
            .read()
            .await
            .get(txid)
            .map(|c| c.recipient.clone())
    }

    /// Total satoshis locked in unsettled, unrefunded contracts
    pub async fn locked_sats(&self) -> u64 {
        self.contracts
            .read()
            .await
            .values()
            .filter(|c| !c.settled && !c.refunded)
            .map(|c| c.amount_sats)
            .sum()
    }

    fn now() -> u64 {
        chrono::Utc::now().timestamp() as u64
    }
}

#[async_trait]
impl HtlcBridge for SimulatedBridge {
    async fn create(&self, request: &HtlcRequest) -> Result<HtlcHandle, BridgeError> {
        if request.recipient.is_empty() {
            return Err(BridgeError::InvalidAddress("empty address".to_string()));
        }

        let txid = format!("sim_htlc_{}", uuid::Uuid::new_v4().simple());

        let mut contracts = self.contracts.write().await;
        contracts.insert(
            txid.clone(),
            SimContract {
                recipient: request.recipient.clone(),
                amount_sats: request.amount_sats,
                timeout: request.timeout,
                settled: false,
                refunded: false,
            },
        );

        Ok(HtlcHandle {
            txid,
            secret_hash: None,
            signature: None,
        })
    }

    async fn settle(&self, handle: &HtlcHandle) -> Result<String, BridgeError> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&handle.txid)
            .ok_or_else(|| BridgeError::ContractNotFound(handle.txid.clone()))?;

        if contract.settled || contract.refunded {
            return Err(BridgeError::AlreadySettled(handle.txid.clone()));
        }

        contract.settled = true;
        Ok(format!("{}_claim", handle.txid))
    }

    async fn refund(&self, handle: &HtlcHandle) -> Result<String, BridgeError> {
        let mut contracts = self.contracts.write().await;
        let contract = contracts
            .get_mut(&handle.txid)
            .ok_or_else(|| BridgeError::ContractNotFound(handle.txid.clone()))?;

        if contract.settled || contract.refunded {
            return Err(BridgeError::AlreadySettled(handle.txid.clone()));
        }
        if Self::now() <= contract.timeout {
            return Err(BridgeError::TimeoutNotReached(handle.txid.clone()));
        }

        contract.refunded = true;
        Ok(format!("{}_refund", handle.txid))
    }

    fn mode(&self) -> &'static str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(timeout: u64) -> HtlcRequest {
        HtlcRequest {
            recipient: "tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx".to_string(),
            amount_sats: 50_000_000,
            timeout,
        }
    }

    #[tokio::test]
    async fn test_create_and_settle_once() {
        let bridge = SimulatedBridge::new();
        let handle = bridge.create(&request(u64::MAX)).await.unwrap();

        assert_eq!(bridge.locked_sats().await, 50_000_000);
        assert_eq!(
            bridge.contract_recipient(&handle.txid).await.as_deref(),
            Some("tb1qw508d6qejxtdg4y5r3zarvary0c5xw7kxpjzsx")
        );

        let claim = bridge.settle(&handle).await.unwrap();
        assert!(claim.ends_with("_claim"));
        assert_eq!(bridge.locked_sats().await, 0);

        // Second settle must never double-pay
        assert!(matches!(
            bridge.settle(&handle).await,
            Err(BridgeError::AlreadySettled(_))
        ));
    }

    #[tokio::test]
    async fn test_settle_unknown_contract() {
        let bridge = SimulatedBridge::new();
        let handle = HtlcHandle {
            txid: "sim_htlc_missing".to_string(),
            secret_hash: None,
            signature: None,
        };
        assert!(matches!(
            bridge.settle(&handle).await,
            Err(BridgeError::ContractNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_refund_before_timeout_rejected() {
        let bridge = SimulatedBridge::new();
        let handle = bridge.create(&request(u64::MAX)).await.unwrap();

        assert!(matches!(
            bridge.refund(&handle).await,
            Err(BridgeError::TimeoutNotReached(_))
        ));
    }

    #[tokio::test]
    async fn test_refund_after_timeout() {
        let bridge = SimulatedBridge::new();
        // Timeout already in the past
        let handle = bridge.create(&request(0)).await.unwrap();

        let refund = bridge.refund(&handle).await.unwrap();
        assert!(refund.ends_with("_refund"));

        // Refunded contract can no longer be settled
        assert!(matches!(
            bridge.settle(&handle).await,
            Err(BridgeError::AlreadySettled(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_address_rejected() {
        let bridge = SimulatedBridge::new();
        let result = bridge
            .create(&HtlcRequest {
                recipient: String::new(),
                amount_sats: 1,
                timeout: u64::MAX,
            })
            .await;
        assert!(matches!(result, Err(BridgeError::InvalidAddress(_))));
    }
}
