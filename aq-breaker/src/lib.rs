//! Generic three-state circuit breaker (Closed / Open / HalfOpen).
//!
//! Every external call site in the platform (LLM requests, browser
//! navigation) wraps its attempt in a [`Breaker`] rather than hand-rolling
//! failure counting.

use std::fmt;
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Closed,
    Open,
    HalfOpen,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            State::Closed => write!(f, "closed"),
            State::Open => write!(f, "open"),
            State::HalfOpen => write!(f, "half_open"),
        }
    }
}

/// Rolling counters for the current generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Counts {
    pub requests: u32,
    pub total_successes: u32,
    pub total_failures: u32,
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

impl Counts {
    fn on_success(&mut self) {
        self.requests += 1;
        self.total_successes += 1;
        self.consecutive_successes += 1;
        self.consecutive_failures = 0;
    }

    fn on_failure(&mut self) {
        self.requests += 1;
        self.total_failures += 1;
        self.consecutive_failures += 1;
        self.consecutive_successes = 0;
    }

    /// Default `ReadyToTrip`: failure ratio at least 0.6 with at least five
    /// requests observed in the generation.
    pub fn default_ready_to_trip(&self) -> bool {
        self.requests >= 5 && self.total_failures as f64 / self.requests as f64 >= 0.6
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("circuit breaker {0:?} is open")]
    Open(Option<String>),
    #[error("circuit breaker {0:?} half-open request quota exceeded")]
    TooManyRequests(Option<String>),
}

pub type ReadyToTrip = Box<dyn Fn(&Counts) -> bool + Send + Sync>;
pub type StateChangeCallback = Box<dyn Fn(&str, State, State) + Send + Sync>;

pub struct Config {
    pub name: Option<String>,
    pub max_requests: u32,
    pub interval: Option<Duration>,
    pub timeout: Duration,
    pub ready_to_trip: ReadyToTrip,
    pub on_state_change: Option<StateChangeCallback>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: None,
            max_requests: 3,
            interval: None,
            timeout: Duration::from_secs(60),
            ready_to_trip: Box::new(Counts::default_ready_to_trip),
            on_state_change: None,
        }
    }
}

struct Inner {
    state: State,
    generation: u64,
    counts: Counts,
    expiry: Option<Instant>,
    half_open_in_flight: u32,
}

/// A single breaker instance, generally one per external dependency
/// (one LLM provider, one browser pool).
pub struct Breaker {
    config: Config,
    inner: Mutex<Inner>,
}

/// Snapshot of the generation a call was admitted under; must be handed
/// back to [`Breaker::after_call`] so stale results from a rotated
/// generation are discarded instead of corrupting the new one's counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission(u64);

impl Breaker {
    pub fn new(config: Config) -> Self {
        let now = Instant::now();
        let expiry = config.interval.map(|i| now + i);
        Self { config, inner: Mutex::new(Inner { state: State::Closed, generation: 0, counts: Counts::default(), expiry, half_open_in_flight: 0 }) }
    }

    pub fn name(&self) -> Option<&str> {
        self.config.name.as_deref()
    }

    pub fn state(&self) -> State {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        self.refresh_locked(&mut inner, Instant::now());
        inner.state
    }

    pub fn counts(&self) -> Counts {
        self.inner.lock().expect("breaker mutex poisoned").counts
    }

    /// Transition out of a stale Open/Closed state if time has moved on.
    /// Must be called under the lock.
    fn refresh_locked(&self, inner: &mut Inner, now: Instant) {
        match inner.state {
            State::Closed => {
                if let Some(expiry) = inner.expiry {
                    if now >= expiry {
                        inner.counts = Counts::default();
                        inner.expiry = self.config.interval.map(|i| now + i);
                    }
                }
            }
            State::Open => {
                if let Some(expiry) = inner.expiry {
                    if now >= expiry {
                        self.transition_locked(inner, State::HalfOpen, now);
                    }
                }
            }
            State::HalfOpen => {}
        }
    }

    fn transition_locked(&self, inner: &mut Inner, to: State, now: Instant) {
        let from = inner.state;
        if from == to {
            return;
        }
        inner.state = to;
        inner.generation += 1;
        inner.counts = Counts::default();
        inner.half_open_in_flight = 0;
        inner.expiry = match to {
            State::Closed => self.config.interval.map(|i| now + i),
            State::Open => Some(now + self.config.timeout),
            State::HalfOpen => None,
        };
        if let Some(cb) = &self.config.on_state_change {
            let name = self.config.name.as_deref().unwrap_or("");
            cb(name, from, to);
        }
        tracing::info!(breaker = self.config.name.as_deref().unwrap_or(""), from = %from, to = %to, "circuit breaker transitioned");
    }

    /// Admit a call attempt. Returns the generation to echo back to
    /// [`Breaker::after_call`], or an error if the call should be skipped.
    pub fn before_call(&self) -> Result<Admission, Error> {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        let now = Instant::now();
        self.refresh_locked(&mut inner, now);

        match inner.state {
            State::Open => Err(Error::Open(self.config.name.clone())),
            State::HalfOpen => {
                if inner.half_open_in_flight >= self.config.max_requests {
                    Err(Error::TooManyRequests(self.config.name.clone()))
                } else {
                    inner.half_open_in_flight += 1;
                    Ok(Admission(inner.generation))
                }
            }
            State::Closed => Ok(Admission(inner.generation)),
        }
    }

    /// Record the outcome of a call admitted via `before_call`.
    pub fn after_call(&self, admission: Admission, success: bool) {
        let mut inner = self.inner.lock().expect("breaker mutex poisoned");
        let now = Instant::now();
        if admission.0 != inner.generation {
            return;
        }

        match inner.state {
            State::Closed => {
                if success {
                    inner.counts.on_success();
                } else {
                    inner.counts.on_failure();
                    if (self.config.ready_to_trip)(&inner.counts) {
                        self.transition_locked(&mut inner, State::Open, now);
                    }
                }
            }
            State::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                if success {
                    inner.counts.on_success();
                    if inner.counts.consecutive_successes >= self.config.max_requests {
                        self.transition_locked(&mut inner, State::Closed, now);
                    }
                } else {
                    self.transition_locked(&mut inner, State::Open, now);
                }
            }
            State::Open => {}
        }
    }

    /// Convenience wrapper: admits, runs `f`, records the outcome based on
    /// whether it returned `Ok`, and surfaces the breaker error distinctly
    /// from the wrapped call's own error type.
    pub async fn call<F, Fut, T, E>(&self, f: F) -> Result<T, CallError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let admission = self.before_call().map_err(CallError::Breaker)?;
        let result = f().await;
        self.after_call(admission, result.is_ok());
        result.map_err(CallError::Inner)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Breaker(#[from] Error),
    #[error(transparent)]
    Inner(E),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breaker(max_requests: u32, timeout: Duration) -> Breaker {
        Breaker::new(Config { name: Some("test".into()), max_requests, interval: None, timeout, ..Config::default() })
    }

    #[test]
    fn closed_state_allows_calls_and_tracks_counts() {
        let b = breaker(3, Duration::from_secs(60));
        let a = b.before_call().unwrap();
        b.after_call(a, true);
        assert_eq!(b.state(), State::Closed);
        assert_eq!(b.counts().total_successes, 1);
    }

    #[test]
    fn opens_after_ready_to_trip_fires() {
        let b = breaker(3, Duration::from_secs(60));
        for _ in 0..5 {
            let a = b.before_call().unwrap();
            b.after_call(a, false);
        }
        assert_eq!(b.state(), State::Open);
        assert!(matches!(b.before_call(), Err(Error::Open(_))));
    }

    #[test]
    fn half_open_after_timeout_then_closes_on_successes() {
        let b = breaker(2, Duration::from_millis(20));
        for _ in 0..5 {
            let a = b.before_call().unwrap();
            b.after_call(a, false);
        }
        assert_eq!(b.state(), State::Open);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(b.state(), State::HalfOpen);

        let a1 = b.before_call().unwrap();
        let a2 = b.before_call().unwrap();
        // Third concurrent half-open admission should be rejected.
        assert!(matches!(b.before_call(), Err(Error::TooManyRequests(_))));
        b.after_call(a1, true);
        b.after_call(a2, true);
        assert_eq!(b.state(), State::Closed);
    }

    #[test]
    fn half_open_failure_reopens_immediately() {
        let b = breaker(2, Duration::from_millis(10));
        for _ in 0..5 {
            let a = b.before_call().unwrap();
            b.after_call(a, false);
        }
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(b.state(), State::HalfOpen);
        let a = b.before_call().unwrap();
        b.after_call(a, false);
        assert_eq!(b.state(), State::Open);
    }

    #[test]
    fn stale_generation_outcome_is_dropped() {
        let b = breaker(2, Duration::from_millis(10));
        let stale = b.before_call().unwrap();
        for _ in 0..5 {
            let a = b.before_call().unwrap();
            b.after_call(a, false);
        }
        assert_eq!(b.state(), State::Open);
        // This admission belongs to the closed generation; it must not
        // resurrect closed-state counters now that we're Open.
        b.after_call(stale, true);
        assert_eq!(b.state(), State::Open);
    }

    #[test]
    fn closed_state_interval_resets_counts() {
        let b = Breaker::new(Config { name: None, max_requests: 3, interval: Some(Duration::from_millis(10)), timeout: Duration::from_secs(60), ..Config::default() });
        for _ in 0..3 {
            let a = b.before_call().unwrap();
            b.after_call(a, false);
        }
        assert_eq!(b.counts().total_failures, 3);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(b.state(), State::Closed);
        assert_eq!(b.counts().total_failures, 0);
    }

    #[tokio::test]
    async fn call_wrapper_propagates_inner_error() {
        let b = breaker(3, Duration::from_secs(60));
        let res: Result<(), CallError<&str>> = b.call(|| async { Err("boom") }).await;
        assert!(matches!(res, Err(CallError::Inner("boom"))));
    }
}
