//! Claim Secrets and Intent Signing
//!
//! Binds a redemption intent to a specific HTLC preimage and to an
//! authorizing signature over `(bloom_amount, btc_address, secret_hash)`.
//! The preimage hash uses sha256; signing is secp256k1 ECDSA over a
//! domain-separated digest of the intent tuple.

use rand::RngCore;
use secp256k1::ecdsa::Signature;
use secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// Signer errors
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

/// Generate a fresh 32-byte claim preimage
pub fn generate_secret() -> [u8; 32] {
    let mut secret = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut secret);
    secret
}

/// sha256 of a claim preimage
pub fn hash_secret(secret: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    hasher.finalize().into()
}

/// Domain-separated digest of the intent tuple
fn intent_digest(bloom_amount: u64, btc_address: &str, secret_hash: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(b"bloom_redeem_intent_v1");
    hasher.update(bloom_amount.to_le_bytes());
    hasher.update(btc_address.as_bytes());
    hasher.update(secret_hash);
    hasher.finalize().into()
}

/// secp256k1 ECDSA signer authorizing redemption intents
pub struct IntentSigner {
    secret_key: SecretKey,
    secp: Secp256k1<All>,
}

impl IntentSigner {
    /// Create from secret key bytes
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SignerError> {
        let secp = Secp256k1::new();
        let secret_key =
            SecretKey::from_slice(bytes).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        Ok(Self { secret_key, secp })
    }

    /// Create from hex string
    pub fn from_hex(hex_key: &str) -> Result<Self, SignerError> {
        let bytes = hex::decode(hex_key).map_err(|e| SignerError::InvalidKey(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey("key must be 32 bytes".to_string()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Self::from_bytes(&arr)
    }

    /// Generate a new random signer
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::new(&mut rand::thread_rng());
        Self { secret_key, secp }
    }

    /// Get the signer's public key
    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&self.secp, &self.secret_key)
    }

    /// Get secret key hex (for backup)
    pub fn secret_hex(&self) -> String {
        hex::encode(self.secret_key.secret_bytes())
    }

    /// Sign an intent tuple, returning the compact signature
    pub fn sign_intent(
        &self,
        bloom_amount: u64,
        btc_address: &str,
        secret_hash: &[u8; 32],
    ) -> Signature {
        let digest = intent_digest(bloom_amount, btc_address, secret_hash);
        let msg = Message::from_digest(digest);
        self.secp.sign_ecdsa(&msg, &self.secret_key)
    }

    /// Verify a signature over an intent tuple against a public key
    pub fn verify_intent(
        &self,
        bloom_amount: u64,
        btc_address: &str,
        secret_hash: &[u8; 32],
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        let digest = intent_digest(bloom_amount, btc_address, secret_hash);
        let msg = Message::from_digest(digest);
        self.secp.verify_ecdsa(&msg, signature, public_key).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_secret_deterministic() {
        let secret = generate_secret();
        assert_eq!(hash_secret(&secret), hash_secret(&secret));

        let other = generate_secret();
        assert_ne!(secret, other);
        assert_ne!(hash_secret(&secret), hash_secret(&other));
    }

    #[test]
    fn test_sign_and_verify() {
        let signer = IntentSigner::generate();
        let secret_hash = hash_secret(&generate_secret());

        let sig = signer.sign_intent(5, "tb1qaddr", &secret_hash);
        assert!(signer.verify_intent(5, "tb1qaddr", &secret_hash, &sig, &signer.public_key()));

        // Any change to the tuple invalidates the signature
        assert!(!signer.verify_intent(6, "tb1qaddr", &secret_hash, &sig, &signer.public_key()));
        assert!(!signer.verify_intent(5, "tb1qother", &secret_hash, &sig, &signer.public_key()));
    }

    #[test]
    fn test_distinct_tuples_distinct_signatures() {
        let signer = IntentSigner::generate();
        let secret_hash = hash_secret(&generate_secret());

        let a = signer.sign_intent(5, "tb1qaddr", &secret_hash);
        let b = signer.sign_intent(7, "tb1qaddr", &secret_hash);
        assert_ne!(a.serialize_compact(), b.serialize_compact());
    }

    #[test]
    fn test_signer_from_hex_roundtrip() {
        let hex_key = "0000000000000000000000000000000000000000000000000000000000000001";
        let signer = IntentSigner::from_hex(hex_key).unwrap();
        assert_eq!(signer.secret_hex(), hex_key);
    }

    #[test]
    fn test_invalid_key_rejected() {
        assert!(IntentSigner::from_hex("deadbeef").is_err());
        assert!(IntentSigner::from_bytes(&[0u8; 32]).is_err());
    }
}
