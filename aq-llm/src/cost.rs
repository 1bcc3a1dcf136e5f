use std::collections::HashMap;
use std::sync::Mutex;

use chrono::NaiveDate;

/// Per-million-token pricing for a model. Unknown models fall back to
/// [`PricingTable::baseline`].
#[derive(Debug, Clone, Copy)]
pub struct ModelPrice {
    pub input_per_million: f64,
    pub output_per_million: f64,
}

pub struct PricingTable {
    prices: HashMap<String, ModelPrice>,
    baseline: ModelPrice,
}

impl Default for PricingTable {
    fn default() -> Self {
        let mut prices = HashMap::new();
        prices.insert("claude-3-5-sonnet".to_string(), ModelPrice { input_per_million: 3.0, output_per_million: 15.0 });
        prices.insert("claude-3-haiku".to_string(), ModelPrice { input_per_million: 0.25, output_per_million: 1.25 });
        prices.insert("gpt-4o".to_string(), ModelPrice { input_per_million: 2.5, output_per_million: 10.0 });
        prices.insert("gpt-4o-mini".to_string(), ModelPrice { input_per_million: 0.15, output_per_million: 0.6 });
        Self { prices, baseline: ModelPrice { input_per_million: 3.0, output_per_million: 15.0 } }
    }
}

impl PricingTable {
    pub fn price_for(&self, model: &str) -> ModelPrice {
        self.prices.get(model).copied().unwrap_or(self.baseline)
    }

    pub fn cost_usd(&self, model: &str, input_tokens: u64, output_tokens: u64) -> f64 {
        let price = self.price_for(model);
        (input_tokens as f64 / 1_000_000.0) * price.input_per_million
            + (output_tokens as f64 / 1_000_000.0) * price.output_per_million
    }
}

/// Per-day spend tracker with a daily budget. An in-process analogue of a
/// Redis-with-TTL design: entries are never proactively expired, so
/// month-to-date aggregation over a long-running process will under-count
/// once entries for days far in the past accumulate unboundedly. Acceptable
/// for the lifetime of a single orchestration run.
pub struct CostTracker {
    daily_budget_usd: f64,
    spend_by_day: Mutex<HashMap<NaiveDate, f64>>,
}

impl CostTracker {
    pub fn new(daily_budget_usd: f64) -> Self {
        Self { daily_budget_usd, spend_by_day: Mutex::new(HashMap::new()) }
    }

    pub fn record(&self, day: NaiveDate, cost_usd: f64) {
        let mut spend = self.spend_by_day.lock().expect("cost tracker mutex poisoned");
        *spend.entry(day).or_insert(0.0) += cost_usd;
    }

    pub fn spend_on(&self, day: NaiveDate) -> f64 {
        self.spend_by_day.lock().expect("cost tracker mutex poisoned").get(&day).copied().unwrap_or(0.0)
    }

    pub fn is_over_budget(&self, day: NaiveDate) -> bool {
        self.spend_on(day) >= self.daily_budget_usd
    }

    /// Sum of every day still present in the tracker. Not a true
    /// month-to-date total once old entries have been pruned by a caller.
    pub fn total_recorded(&self) -> f64 {
        self.spend_by_day.lock().expect("cost tracker mutex poisoned").values().sum()
    }
}
