//! # Ratings Module
//!
//! Per-prompt star ratings kept as two monotonically increasing counters in a
//! shared key-value store. Averages are always derived, never stored.
//!
//! ## Components
//!
//! - **CounterStore**: atomic increment, batch read and prefix enumeration
//! - **RatingsAggregator**: records ratings and computes per-prompt and global averages

pub mod store;

pub use store::{CounterStore, InMemoryCounterStore, RedisCounterStore};

use crate::error::AppError;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

const KEY_PREFIX: &str = "rating:";
const SUM_SUFFIX: &str = ":sum";
const COUNT_SUFFIX: &str = ":count";

pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

/// Rounded average and the number of ratings behind it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    pub average: f64,
    pub count: i64,
}

impl RatingSummary {
    fn from_totals(sum: i64, count: i64) -> Self {
        Self {
            average: round_tenths(sum, count),
            count,
        }
    }
}

/// Records ratings and derives averages from the store's counters.
///
/// Every store operation is bounded by `budget`; a stalled store surfaces as
/// `StoreUnavailable` instead of hanging the request.
#[derive(Clone)]
pub struct RatingsAggregator {
    store: Arc<dyn CounterStore>,
    budget: Duration,
}

impl RatingsAggregator {
    pub fn new(store: Arc<dyn CounterStore>, budget: Duration) -> Self {
        Self { store, budget }
    }

    async fn bounded<T, F>(&self, operation: &str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        timeout(self.budget, call).await.map_err(|_| {
            AppError::StoreUnavailable(format!(
                "{} did not answer within {}ms",
                operation,
                self.budget.as_millis()
            ))
        })?
    }

    /// Adds one rating for `prompt_id` and returns the fresh global summary.
    ///
    /// Sum and count are bumped in one atomic store operation.
    #[instrument(skip(self))]
    pub async fn record_rating(&self, prompt_id: &str, rating: i64) -> Result<RatingSummary, AppError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "Rating must be an integer between {} and {} (got {})",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        let (sum_name, count_name) = (sum_key(prompt_id), count_key(prompt_id));
        let (sum, count) = self
            .bounded(
                "Counter increment",
                self.store.incr_pair((sum_name.as_str(), rating), (count_name.as_str(), 1)),
            )
            .await?;
        debug!(sum, count, "Rating counters updated");

        let global = self.global_average().await?;
        info!(average = global.average, total = global.count, "Rating recorded");
        Ok(global)
    }

    /// Average for one prompt; `0.0` with a zero count when it was never rated.
    pub async fn average(&self, prompt_id: &str) -> Result<RatingSummary, AppError> {
        let keys = [sum_key(prompt_id), count_key(prompt_id)];
        let values = self.bounded("Counter read", self.store.get_many(&keys)).await?;
        let sum = values.first().copied().flatten().unwrap_or(0);
        let count = values.get(1).copied().flatten().unwrap_or(0);
        Ok(RatingSummary::from_totals(sum, count))
    }

    /// Average across every rated prompt, weighted by rating count.
    pub async fn global_average(&self) -> Result<RatingSummary, AppError> {
        let sum_keys: Vec<String> = self
            .bounded("Key scan", self.store.keys_with_prefix(KEY_PREFIX))
            .await?
            .into_iter()
            .filter(|key| key.ends_with(SUM_SUFFIX))
            .collect();
        if sum_keys.is_empty() {
            return Ok(RatingSummary::from_totals(0, 0));
        }

        let count_keys: Vec<String> = sum_keys
            .iter()
            .map(|key| format!("{}{}", &key[..key.len() - SUM_SUFFIX.len()], COUNT_SUFFIX))
            .collect();

        let sums = self.bounded("Counter read", self.store.get_many(&sum_keys)).await?;
        let counts = self.bounded("Counter read", self.store.get_many(&count_keys)).await?;
        let total_sum: i64 = sums.into_iter().flatten().sum();
        let total_count: i64 = counts.into_iter().flatten().sum();

        Ok(RatingSummary::from_totals(total_sum, total_count))
    }

    /// Store reachability, for health reporting.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.bounded("Ping", self.store.ping()).await
    }
}

fn sum_key(prompt_id: &str) -> String {
    format!("{}{}{}", KEY_PREFIX, prompt_id, SUM_SUFFIX)
}

fn count_key(prompt_id: &str) -> String {
    format!("{}{}{}", KEY_PREFIX, prompt_id, COUNT_SUFFIX)
}

/// `sum / count` rounded half up to one decimal; `0.0` when `count` is not positive.
///
/// Works in integer tenths so that 1.25 becomes 1.3 exactly.
pub fn round_tenths(sum: i64, count: i64) -> f64 {
    if count <= 0 {
        return 0.0;
    }
    let tenths = (sum * 20 + count) / (count * 2);
    tenths as f64 / 10.0
}
