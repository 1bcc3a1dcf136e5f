use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free token bucket: refill rate is derived from requests-per-minute,
/// burst capacity is fixed at 5. Tokens are stored fixed-point (scaled by
/// [`SCALE`]) so refill can be done with a single atomic compare-exchange
/// loop instead of a mutex.
const SCALE: u64 = 1_000_000;
const BURST: f64 = 5.0;

pub struct TokenBucket {
    tokens: AtomicU64,
    last_refill_nanos: AtomicU64,
    refill_per_sec: f64,
    start: Instant,
}

impl TokenBucket {
    pub fn new(rpm: u32) -> Self {
        let refill_per_sec = (rpm.max(1) as f64) / 60.0;
        Self {
            tokens: AtomicU64::new((BURST * SCALE as f64) as u64),
            last_refill_nanos: AtomicU64::new(0),
            refill_per_sec,
            start: Instant::now(),
        }
    }

    fn refill(&self) {
        let now_nanos = self.start.elapsed().as_nanos() as u64;
        let last = self.last_refill_nanos.load(Ordering::Acquire);
        if now_nanos <= last {
            return;
        }
        let elapsed_secs = (now_nanos - last) as f64 / 1_000_000_000.0;
        let added = elapsed_secs * self.refill_per_sec * SCALE as f64;
        if added < 1.0 {
            return;
        }
        if self.last_refill_nanos.compare_exchange(last, now_nanos, Ordering::AcqRel, Ordering::Relaxed).is_err() {
            return;
        }
        let max = (BURST * SCALE as f64) as u64;
        let _ = self.tokens.fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| Some((t + added as u64).min(max)));
    }

    fn try_acquire(&self) -> bool {
        self.refill();
        self.tokens
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |t| if t >= SCALE { Some(t - SCALE) } else { None })
            .is_ok()
    }

    /// Block until a token is available or `deadline` passes.
    pub async fn acquire(&self, deadline: Instant) -> bool {
        loop {
            if self.try_acquire() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }

    pub fn available_tokens(&self) -> f64 {
        self.refill();
        self.tokens.load(Ordering::Acquire) as f64 / SCALE as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_allows_up_to_five_immediate_acquires() {
        let bucket = TokenBucket::new(60);
        for _ in 0..5 {
            assert!(bucket.acquire(Instant::now() + Duration::from_millis(5)).await);
        }
    }

    #[tokio::test]
    async fn exhausted_bucket_times_out_without_refill_window() {
        let bucket = TokenBucket::new(1);
        for _ in 0..5 {
            assert!(bucket.acquire(Instant::now() + Duration::from_millis(5)).await);
        }
        let deadline = Instant::now() + Duration::from_millis(5);
        assert!(!bucket.acquire(deadline).await);
    }

    #[tokio::test]
    async fn refill_eventually_grants_another_token() {
        let bucket = TokenBucket::new(6000); // 100 tokens/sec
        for _ in 0..5 {
            assert!(bucket.acquire(Instant::now() + Duration::from_millis(5)).await);
        }
        let deadline = Instant::now() + Duration::from_millis(200);
        assert!(bucket.acquire(deadline).await);
    }
}
