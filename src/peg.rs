//! Peg Quoting
//!
//! Pure conversion between BLOOM and satoshis at the fixed protocol ratio.
//! All arithmetic is integer and checked; satoshi and BLOOM quantities are
//! never represented as floating point.

/// Satoshis per Bitcoin
pub const SATS_PER_BTC: u64 = 100_000_000;

/// BLOOM per Bitcoin (the peg: 10 BLOOM = 1 BTC)
pub const BLOOM_PER_BTC: u64 = 10;

/// Satoshis per BLOOM (10,000,000)
pub const SATS_PER_BLOOM: u64 = SATS_PER_BTC / BLOOM_PER_BTC;

/// Quote a BLOOM amount in satoshis at the fixed peg.
///
/// Returns `None` if the multiplication would overflow `u64`. Callers are
/// responsible for rejecting zero amounts before quoting.
pub fn quote(bloom_amount: u64) -> Option<u64> {
    bloom_amount.checked_mul(SATS_PER_BLOOM)
}

/// Maximum BLOOM redeemable against a given satoshi reserve (floor division).
pub fn max_bloom_for_locked(locked_sats: u64) -> u64 {
    locked_sats / SATS_PER_BLOOM
}

/// Human-readable peg statement
pub fn peg_statement() -> String {
    format!("Peg: {} BLOOM = 1 BTC", BLOOM_PER_BTC)
}
