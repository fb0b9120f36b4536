//! Per-Address Rate Limiter
//!
//! Fixed-window counter keyed by originating address. Purely in-memory:
//! state does not survive a restart, which is acceptable for abuse
//! mitigation but not for strict accounting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// A single address's window
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window rate limiter
///
/// Windows are created lazily on first request from an address and reset
/// in place once they expire.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    /// Create a limiter allowing `max_requests` per `window` per address
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Check the address against its window and consume one slot.
    ///
    /// Returns `true` if the request is allowed. Denials are idempotent:
    /// a denied request does not advance the counter.
    pub fn check_and_consume(&self, address: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        match windows.get_mut(address) {
            Some(w) if now < w.reset_at => {
                if w.count >= self.max_requests {
                    return false;
                }
                w.count += 1;
                true
            }
            _ => {
                windows.insert(
                    address.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                true
            }
        }
    }

    /// Remaining slots for an address in the current window
    pub fn remaining(&self, address: &str) -> u32 {
        let now = Instant::now();
        let windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        match windows.get(address) {
            Some(w) if now < w.reset_at => self.max_requests.saturating_sub(w.count),
            _ => self.max_requests,
        }
    }

    /// Number of addresses currently tracked (expired windows included)
    pub fn tracked_addresses(&self) -> usize {
        self.windows.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
