//! Bounded, resilient request/response gateway to an external completion
//! service: LRU+TTL caching, token-bucket rate limiting, circuit breaking,
//! cost tracking, and JSON-mode extraction for structured agent outputs.

pub mod cache;
pub mod config;
pub mod cost;
pub mod error;
pub mod json_extract;
pub mod metrics;
pub mod provider;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::de::DeserializeOwned;

pub use config::{BreakerSettings, LlmConfig};
pub use error::{Error, Result};
pub use metrics::MetricsSnapshot;
pub use provider::{CompletionRequest, CompletionResponse, HttpProvider, Message, Provider};

use cache::ResponseCache;
use cost::{CostTracker, PricingTable};
use metrics::Metrics;
use rate_limiter::TokenBucket;

mod rate_limiter;

#[derive(Debug, Clone, Copy, Default)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cached: bool,
    pub fallback: bool,
}

/// The LLM gateway: one instance per external dependency (one model
/// endpoint). Owns its cache, rate limiter, breaker and cost counters
/// exclusively — nothing outside this type mutates them.
pub struct Gateway {
    config: LlmConfig,
    provider: Arc<dyn Provider>,
    cache: ResponseCache,
    rate_limiter: TokenBucket,
    breaker: aq_breaker::Breaker,
    pricing: PricingTable,
    cost_tracker: CostTracker,
    metrics: Metrics,
}

impl Gateway {
    pub fn new(config: LlmConfig, provider: Arc<dyn Provider>) -> Self {
        let cache = ResponseCache::new(config.cache_size, config.cache_ttl);
        let rate_limiter = TokenBucket::new(config.rate_limit_rpm);
        let breaker = aq_breaker::Breaker::new(config.breaker.to_breaker_config(config.model.clone()));
        let cost_tracker = CostTracker::new(config.daily_budget_usd);
        Self { config, provider, cache, rate_limiter, breaker, pricing: PricingTable::default(), cost_tracker, metrics: Metrics::default() }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn breaker_state(&self) -> aq_breaker::State {
        self.breaker.state()
    }

    /// `Complete(system, user, temperature, use_cache) -> (text, usage)`.
    #[tracing::instrument(skip(self, system, user), fields(model = %self.config.model))]
    pub async fn complete(&self, system: &str, user: &str, temperature: Option<f32>, use_cache: bool) -> Result<(String, Usage)> {
        let key = ResponseCache::key(&self.config.model, system, user);

        if use_cache {
            if let Some(hit) = self.cache.get(&key) {
                self.metrics.record_cache_hit();
                return Ok((hit.text, Usage { input_tokens: hit.input_tokens, output_tokens: hit.output_tokens, cached: true, fallback: false }));
            }
            self.metrics.record_cache_miss();
        }

        let today = Utc::now().date_naive();
        if self.cost_tracker.is_over_budget(today) {
            if use_cache {
                if let Some(hit) = self.cache.get_stale(&key) {
                    self.metrics.record_fallback();
                    return Ok((hit.text, Usage { input_tokens: hit.input_tokens, output_tokens: hit.output_tokens, cached: true, fallback: true }));
                }
            }
            return Err(Error::OverBudget);
        }

        let deadline = Instant::now() + self.config.timeout;
        self.rate_limiter.acquire(deadline).await;

        let admission = match self.breaker.before_call() {
            Ok(admission) => admission,
            Err(aq_breaker::Error::Open(_)) => {
                self.metrics.record_circuit_trip();
                if self.config.fallback_enabled && use_cache {
                    if let Some(hit) = self.cache.get_stale(&key) {
                        self.metrics.record_fallback();
                        return Ok((hit.text, Usage { input_tokens: hit.input_tokens, output_tokens: hit.output_tokens, cached: true, fallback: true }));
                    }
                }
                return Err(Error::CircuitOpen { model: self.config.model.clone() });
            }
            Err(aq_breaker::Error::TooManyRequests(_)) => {
                return Err(Error::TooManyRequests { model: self.config.model.clone() });
            }
        };

        let started = Instant::now();
        let request = CompletionRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: Some(system.to_string()),
            messages: vec![Message { role: "user".to_string(), content: user.to_string() }],
            temperature,
        };

        let outcome = self.provider.complete(request).await;
        let latency_ms = started.elapsed().as_millis() as u64;
        self.breaker.after_call(admission, outcome.is_ok());

        match outcome {
            Ok(response) => {
                self.metrics.record_attempt(true, latency_ms, response.input_tokens, response.output_tokens);
                let cost = self.pricing.cost_usd(&self.config.model, response.input_tokens, response.output_tokens);
                self.cost_tracker.record(today, cost);
                self.cache.put(
                    key,
                    cache::CachedResponse { text: response.text.clone(), input_tokens: response.input_tokens, output_tokens: response.output_tokens },
                );
                Ok((response.text, Usage { input_tokens: response.input_tokens, output_tokens: response.output_tokens, cached: false, fallback: false }))
            }
            Err(err) => {
                self.metrics.record_attempt(false, latency_ms, 0, 0);
                Err(err)
            }
        }
    }

    /// `CompleteJSON(system, user, target) -> (usage, err)`. Up to three
    /// attempts; only the first permits cache reads; each retry backs off
    /// by the attempt count in seconds.
    #[tracing::instrument(skip(self, system, user), fields(model = %self.config.model))]
    pub async fn complete_json<T: DeserializeOwned>(&self, system: &str, user: &str) -> Result<(T, Usage)> {
        let json_system = format!("{system}\n\nRespond with JSON only. Do not include any prose, explanation, or markdown fencing outside the JSON value.");

        let mut last_reason = String::new();
        for attempt in 1..=3u32 {
            let use_cache = attempt == 1;
            let (text, usage) = self.complete(&json_system, user, None, use_cache).await?;

            match json_extract::extract_json(&text) {
                Some(span) => match serde_json::from_str::<T>(span) {
                    Ok(value) => return Ok((value, usage)),
                    Err(e) => last_reason = e.to_string(),
                },
                None => last_reason = "no balanced JSON span found in response".to_string(),
            }

            if attempt < 3 {
                tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
            }
        }

        Err(Error::Json { attempts: 3, reason: last_reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubProvider {
        response_text: String,
        fail_times: AtomicU32,
    }

    #[async_trait]
    impl Provider for StubProvider {
        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse> {
            if self.fail_times.load(Ordering::SeqCst) > 0 {
                self.fail_times.fetch_sub(1, Ordering::SeqCst);
                return Err(Error::Api { status: 500, body: "boom".to_string() });
            }
            Ok(CompletionResponse { text: self.response_text.clone(), input_tokens: 10, output_tokens: 20, stop_reason: Some("end_turn".to_string()) })
        }
    }

    fn test_config() -> LlmConfig {
        let mut config = LlmConfig::default();
        config.cache_size = 10;
        config.rate_limit_rpm = 6000;
        config.breaker.min_requests = 2;
        config.breaker.failure_ratio = 0.5;
        config
    }

    #[tokio::test]
    async fn successful_call_is_cached_for_next_identical_request() {
        let provider = Arc::new(StubProvider { response_text: "hello".to_string(), fail_times: AtomicU32::new(0) });
        let gateway = Gateway::new(test_config(), provider);

        let (text, usage) = gateway.complete("sys", "user", None, true).await.unwrap();
        assert_eq!(text, "hello");
        assert!(!usage.cached);

        let (text2, usage2) = gateway.complete("sys", "user", None, true).await.unwrap();
        assert_eq!(text2, "hello");
        assert!(usage2.cached);
        assert_eq!(gateway.metrics().cache_hits, 1);
    }

    #[tokio::test]
    async fn breaker_opens_and_fallback_serves_cached_response() {
        let provider = Arc::new(StubProvider { response_text: "warm".to_string(), fail_times: AtomicU32::new(0) });
        let mut config = test_config();
        config.cache_ttl = Duration::from_millis(10);
        let gateway = Gateway::new(config, provider.clone());

        gateway.complete("sysA", "userA", None, true).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        provider.fail_times.store(10, Ordering::SeqCst);
        // The cached entry has aged past its TTL, so these two calls miss
        // the primary cache lookup and actually reach the (failing) provider.
        let _ = gateway.complete("sysA", "userA", None, true).await;
        let _ = gateway.complete("sysA", "userA", None, true).await;
        assert_eq!(gateway.breaker_state(), aq_breaker::State::Open);

        let (text, usage) = gateway.complete("sysA", "userA", None, true).await.unwrap();
        assert_eq!(text, "warm");
        assert!(usage.fallback);
        assert_eq!(gateway.metrics().fallbacks_used, 1);
    }

    #[tokio::test]
    async fn complete_json_extracts_and_parses_structured_output() {
        #[derive(serde::Deserialize, PartialEq, Debug)]
        struct Out {
            ok: bool,
        }
        let provider = Arc::new(StubProvider { response_text: r#"here: {"ok": true}"#.to_string(), fail_times: AtomicU32::new(0) });
        let gateway = Gateway::new(test_config(), provider);
        let (value, _usage): (Out, Usage) = gateway.complete_json("sys", "user").await.unwrap();
        assert_eq!(value, Out { ok: true });
    }

    #[tokio::test]
    async fn complete_json_gives_up_after_three_unparseable_attempts() {
        #[derive(serde::Deserialize, Debug)]
        struct Out {
            #[allow(dead_code)]
            ok: bool,
        }
        let provider = Arc::new(StubProvider { response_text: "not json at all".to_string(), fail_times: AtomicU32::new(0) });
        let gateway = Gateway::new(test_config(), provider);
        let result: Result<(Out, Usage)> = gateway.complete_json("sys", "user").await;
        assert!(matches!(result, Err(Error::Json { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn over_budget_falls_back_to_cache_only() {
        let provider = Arc::new(StubProvider { response_text: "cheap".to_string(), fail_times: AtomicU32::new(0) });
        let mut config = test_config();
        config.daily_budget_usd = 0.000_000_001;
        let gateway = Gateway::new(config, provider);

        gateway.complete("s", "u", None, true).await.unwrap();
        let result = gateway.complete("s", "different-user", None, true).await;
        assert!(matches!(result, Err(Error::OverBudget)));

        let (text, usage) = gateway.complete("s", "u", None, true).await.unwrap();
        assert_eq!(text, "cheap");
        assert!(usage.cached);
    }
}
