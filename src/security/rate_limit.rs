//! Per-client sliding-window rate limiting.
//!
//! The limiter runs before signature verification so abusive traffic is shed
//! without paying HMAC cost. Keys are network origins, not user identities,
//! because identity is not known yet at this point in the request flow.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Fraction of calls that trigger a sweep of idle client keys.
const SWEEP_PROBABILITY: f64 = 0.1;

/// Admission control for inbound write requests, keyed by client origin.
///
/// Injected behind a trait so handlers are testable with a permissive stub
/// and the implementation is swappable for multi-instance deployments.
pub trait RateLimiter: Send + Sync {
    /// Returns `true` if this request is admitted. A `false` must be
    /// surfaced to the caller as a rate-limit error, never silently dropped.
    fn allow(&self, client_key: &str) -> bool;
}

/// In-memory sliding-window limiter for single-instance deployments.
///
/// Each key holds the timestamps of its requests inside the current window.
/// Entries for a key are pruned lazily on that key's own calls; whole idle
/// keys are reclaimed by a probabilistic sweep (roughly every tenth call),
/// so memory stays bounded without a dedicated timer task.
pub struct SlidingWindowLimiter {
    max_requests: usize,
    window: Duration,
    history: Mutex<HashMap<String, Vec<Instant>>>,
}

impl SlidingWindowLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            history: Mutex::new(HashMap::new()),
        }
    }

    /// Number of client keys currently tracked. Exposed for memory-bound
    /// verification in tests.
    pub fn tracked_keys(&self) -> usize {
        self.history.lock().map(|h| h.len()).unwrap_or(0)
    }

    fn allow_at(&self, client_key: &str, now: Instant) -> bool {
        // Fail-open: if the shared map is poisoned, admit the request.
        // Availability for legitimate users outranks strict limiting when
        // the limiter itself is degraded.
        let mut history = match self.history.lock() {
            Ok(guard) => guard,
            Err(_) => {
                warn!("rate limiter storage unavailable, admitting request");
                return true;
            }
        };

        if rand::random::<f64>() < SWEEP_PROBABILITY {
            let window = self.window;
            history.retain(|_, timestamps| {
                timestamps
                    .last()
                    .is_some_and(|last| now.duration_since(*last) < window)
            });
        }

        let timestamps = history.entry(client_key.to_string()).or_default();
        timestamps.retain(|t| now.duration_since(*t) < self.window);

        if timestamps.len() >= self.max_requests {
            warn!(client_key, "rate limit hit");
            return false;
        }

        timestamps.push(now);
        true
    }
}

impl RateLimiter for SlidingWindowLimiter {
    fn allow(&self, client_key: &str) -> bool {
        self.allow_at(client_key, Instant::now())
    }
}
