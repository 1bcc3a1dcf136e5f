use std::time::Duration;

/// Gateway-side breaker tunables, overlaid onto [`aq_breaker::Config`] when
/// the gateway builds its breaker instance.
#[derive(Debug, Clone)]
pub struct BreakerSettings {
    pub max_requests: u32,
    pub timeout: Duration,
    pub min_requests: u32,
    pub failure_ratio: f64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self { max_requests: 3, timeout: Duration::from_secs(60), min_requests: 5, failure_ratio: 0.6 }
    }
}

impl BreakerSettings {
    pub fn to_breaker_config(&self, name: impl Into<String>) -> aq_breaker::Config {
        let min_requests = self.min_requests;
        let failure_ratio = self.failure_ratio;
        aq_breaker::Config {
            name: Some(name.into()),
            max_requests: self.max_requests,
            interval: None,
            timeout: self.timeout,
            ready_to_trip: Box::new(move |counts: &aq_breaker::Counts| {
                counts.requests >= min_requests && counts.total_failures as f64 / counts.requests as f64 >= failure_ratio
            }),
            on_state_change: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub base_url: String,
    pub timeout: Duration,
    pub rate_limit_rpm: u32,
    pub cache_ttl: Duration,
    pub cache_size: usize,
    pub daily_budget_usd: f64,
    pub fallback_enabled: bool,
    pub breaker: BreakerSettings,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "claude-3-5-sonnet".to_string(),
            max_tokens: 4096,
            base_url: "https://api.anthropic.com/v1/messages".to_string(),
            timeout: Duration::from_secs(120),
            rate_limit_rpm: 50,
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            cache_size: 1000,
            daily_budget_usd: 50.0,
            fallback_enabled: true,
            breaker: BreakerSettings::default(),
        }
    }
}

impl LlmConfig {
    /// Overlay `AQ_LLM_*` environment variables onto [`LlmConfig::default`].
    /// `AQ_LLM_API_KEY` is the only variable required by `from_env` to
    /// produce a usable gateway; the rest fall back to documented defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("AQ_LLM_API_KEY") {
            config.api_key = v;
        }
        if let Ok(v) = std::env::var("AQ_LLM_MODEL") {
            config.model = v;
        }
        if let Ok(v) = std::env::var("AQ_LLM_BASE_URL") {
            config.base_url = v;
        }
        if let Ok(v) = std::env::var("AQ_LLM_MAX_TOKENS").ok().and_then(|s| s.parse().ok()) {
            config.max_tokens = v;
        }
        if let Ok(v) = std::env::var("AQ_LLM_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()) {
            config.timeout = Duration::from_secs(v);
        }
        if let Ok(v) = std::env::var("AQ_LLM_RATE_LIMIT_RPM").ok().and_then(|s| s.parse().ok()) {
            config.rate_limit_rpm = v;
        }
        if let Ok(v) = std::env::var("AQ_LLM_DAILY_BUDGET_USD").ok().and_then(|s| s.parse().ok()) {
            config.daily_budget_usd = v;
        }
        config
    }
}
