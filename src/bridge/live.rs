//! Live HTLC Bridge Client
//!
//! HTTP client against a real bridge API (testnet/mainnet). Each created
//! contract gets a fresh claim preimage; the bridge holds the preimage until
//! the claim succeeds, then drops it so a repeated settle cannot double-pay
//! from this side either.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::secrets::{generate_secret, hash_secret, IntentSigner};
use super::{BridgeError, HtlcBridge, HtlcHandle, HtlcRequest};

/// Live bridge client
pub struct LiveBridge {
    client: Client,
    base_url: String,
    network: bitcoin::Network,
    signer: IntentSigner,
    /// Claim preimages by contract txid, dropped after a successful claim
    preimages: Arc<RwLock<HashMap<String, [u8; 32]>>>,
}

#[derive(Debug, Serialize)]
struct CreateHtlcBody<'a> {
    recipient: &'a str,
    amount_sats: u64,
    timeout: u64,
    secret_hash: String,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct CreateHtlcResponse {
    txid: String,
}

#[derive(Debug, Serialize)]
struct ClaimBody {
    preimage: String,
}

#[derive(Debug, Deserialize)]
struct SettleResponse {
    txid: String,
}

impl LiveBridge {
    /// Create a client against a bridge API endpoint
    pub fn new(base_url: &str, network: bitcoin::Network, signer: IntentSigner) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            network,
            signer,
            preimages: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn validate_address(&self, address: &str) -> Result<(), BridgeError> {
        bitcoin::Address::from_str(address)
            .map_err(|e| BridgeError::InvalidAddress(e.to_string()))?
            .require_network(self.network)
            .map_err(|e| BridgeError::InvalidAddress(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl HtlcBridge for LiveBridge {
    async fn create(&self, request: &HtlcRequest) -> Result<HtlcHandle, BridgeError> {
        self.validate_address(&request.recipient)?;

        let secret = generate_secret();
        let secret_hash = hash_secret(&secret);
        let signature =
            self.signer
                .sign_intent(request.amount_sats, &request.recipient, &secret_hash);

        let body = CreateHtlcBody {
            recipient: &request.recipient,
            amount_sats: request.amount_sats,
            timeout: request.timeout,
            secret_hash: hex::encode(secret_hash),
            signature: hex::encode(signature.serialize_compact()),
        };

        let url = format!("{}/htlc", self.base_url);
        let resp = self.client.post(&url).json(&body).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(BridgeError::CreateFailed(error_text));
        }

        let created: CreateHtlcResponse = resp.json().await?;

        self.preimages
            .write()
            .await
            .insert(created.txid.clone(), secret);

        Ok(HtlcHandle {
            txid: created.txid,
            secret_hash: Some(body.secret_hash),
            signature: Some(body.signature),
        })
    }

    async fn settle(&self, handle: &HtlcHandle) -> Result<String, BridgeError> {
        let preimage = {
            let preimages = self.preimages.read().await;
            preimages
                .get(&handle.txid)
                .copied()
                .ok_or_else(|| BridgeError::MissingSecret(handle.txid.clone()))?
        };

        let url = format!("{}/htlc/{}/claim", self.base_url, handle.txid);
        let body = ClaimBody {
            preimage: hex::encode(preimage),
        };
        let resp = self.client.post(&url).json(&body).send().await?;

        if resp.status() == reqwest::StatusCode::CONFLICT {
            return Err(BridgeError::AlreadySettled(handle.txid.clone()));
        }
        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(BridgeError::ClaimFailed(error_text));
        }

        let settled: SettleResponse = resp.json().await?;

        // Preimage is now public on-chain; holding it adds nothing
        self.preimages.write().await.remove(&handle.txid);

        Ok(settled.txid)
    }

    async fn refund(&self, handle: &HtlcHandle) -> Result<String, BridgeError> {
        let url = format!("{}/htlc/{}/refund", self.base_url, handle.txid);
        let resp = self.client.post(&url).send().await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(BridgeError::RefundFailed(error_text));
        }

        let refunded: SettleResponse = resp.json().await?;

        self.preimages.write().await.remove(&handle.txid);

        Ok(refunded.txid)
    }

    fn mode(&self) -> &'static str {
        "live"
    }
}
