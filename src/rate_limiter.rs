use anyhow::Result;
use std::collections::HashSet;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Token bucket pacing requests against the hosted backend
#[derive(Debug, Clone)]
pub struct RateLimiter {
    state: Arc<Mutex<BucketState>>,
    capacity: u32,
    refill_rate: f64, // tokens per second
}

#[derive(Debug)]
struct BucketState {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(capacity: u32, refill_rate: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(BucketState {
                tokens: capacity as f64,
                last_refill: Instant::now(),
            })),
            capacity,
            refill_rate,
        }
    }

    /// Read requests: selects against ledger, operations and balance tables
    pub fn for_read_requests() -> Self {
        Self::new(240, 4.0)
    }

    /// Write requests: inserts, patches and compare-and-swap updates
    pub fn for_write_requests() -> Self {
        Self::new(60, 1.0)
    }

    /// Acquire a token, waiting if necessary
    pub async fn acquire(&self) -> Result<()> {
        loop {
            let mut state = self.state.lock().await;

            let now = Instant::now();
            let elapsed = now.duration_since(state.last_refill).as_secs_f64();
            state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity as f64);
            state.last_refill = now;

            if state.tokens >= 1.0 {
                state.tokens -= 1.0;
                debug!("Rate limiter: token acquired, {:.1} remaining", state.tokens);
                return Ok(());
            }

            let wait_seconds = (1.0 - state.tokens) / self.refill_rate;
            let wait_duration = Duration::from_secs_f64(wait_seconds);
            warn!(
                "Rate limit: waiting {:?} (current: {:.1}, capacity: {})",
                wait_duration, state.tokens, self.capacity
            );

            drop(state);
            sleep(wait_duration).await;
        }
    }

    /// Try to acquire a token without waiting
    pub async fn try_acquire(&self) -> bool {
        let mut state = self.state.lock().await;

        let now = Instant::now();
        let elapsed = now.duration_since(state.last_refill).as_secs_f64();
        state.tokens = (state.tokens + elapsed * self.refill_rate).min(self.capacity as f64);
        state.last_refill = now;

        if state.tokens >= 1.0 {
            state.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Per-class limiters for the backend REST surface, mirroring how the
/// hosted service throttles reads and writes differently.
#[derive(Debug, Clone)]
pub struct BackendRateLimiter {
    read: RateLimiter,
    write: RateLimiter,
}

impl BackendRateLimiter {
    pub fn new() -> Self {
        Self {
            read: RateLimiter::for_read_requests(),
            write: RateLimiter::for_write_requests(),
        }
    }

    pub async fn acquire_for_read(&self) -> Result<()> {
        self.read.acquire().await
    }

    pub async fn acquire_for_write(&self) -> Result<()> {
        self.write.acquire().await
    }
}

impl Default for BackendRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// Debounce guard against duplicate submissions of the same row from this
/// process. Holds the row id while a confirm/settle is in flight; dropping
/// the token releases it. Single-operator protection only: the multi-user
/// guarantee is the backend compare-and-swap.
#[derive(Debug, Clone, Default)]
pub struct SubmitGuard {
    in_flight: Arc<StdMutex<HashSet<i64>>>,
}

/// Releases the guarded id when dropped.
#[derive(Debug)]
pub struct SubmitToken {
    id: i64,
    in_flight: Arc<StdMutex<HashSet<i64>>>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `id` for an in-flight submission; `None` when one is already
    /// running.
    pub fn begin(&self, id: i64) -> Option<SubmitToken> {
        let mut in_flight = self.in_flight.lock().expect("submit guard poisoned");
        if !in_flight.insert(id) {
            return None;
        }
        Some(SubmitToken {
            id,
            in_flight: self.in_flight.clone(),
        })
    }
}

impl Drop for SubmitToken {
    fn drop(&mut self) {
        if let Ok(mut in_flight) = self.in_flight.lock() {
            in_flight.remove(&self.id);
        }
    }
}
