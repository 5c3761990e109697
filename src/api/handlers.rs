//! API Handlers
//!
//! HTTP request handlers for each calculator endpoint.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use tracing::debug;

use crate::cache::ExpiringCache;
use crate::calc::{cache_key, Calculation, Operation};
use crate::config::Config;
use crate::error::Result;
use crate::models::{CalcQuery, CalcResponse, HealthResponse, StatsResponse};

/// Application state shared across all handlers.
///
/// The cache is internally synchronized; cloning the state shares it.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Results keyed by canonical request
    pub cache: ExpiringCache<Calculation>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ExpiringCache<Calculation>) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Eviction timers run on the current tokio runtime.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ExpiringCache::with_tokio(config.cache_ttl))
    }
}

/// Raw query pairs, so a repeated parameter can resolve to its first value.
type OperandQuery = std::result::Result<Query<Vec<(String, String)>>, QueryRejection>;

/// Shared body of the four operation handlers.
///
/// Bad operands are rejected before the cache is consulted; the cache entry
/// is committed before the response is serialized.
fn calculate(
    state: &AppState,
    operation: Operation,
    query: OperandQuery,
) -> Result<Json<CalcResponse>> {
    let Query(pairs) = query?;
    let (x, y) = pairs.into_iter().collect::<CalcQuery>().operands()?;
    let key = cache_key(operation, x, y);

    let lookup = state
        .cache
        .get_or_compute(&key, || operation.evaluate(x, y))
        .inspect_err(|err| debug!("{} failed: {}", key, err))?;

    debug!("{} served (cached: {})", key, lookup.hit);
    Ok(Json(CalcResponse::new(lookup.value, lookup.hit)))
}

/// Handler for GET /add
pub async fn add_handler(
    State(state): State<AppState>,
    query: OperandQuery,
) -> Result<Json<CalcResponse>> {
    calculate(&state, Operation::Add, query)
}

/// Handler for GET /subtract
pub async fn subtract_handler(
    State(state): State<AppState>,
    query: OperandQuery,
) -> Result<Json<CalcResponse>> {
    calculate(&state, Operation::Subtract, query)
}

/// Handler for GET /multiply
pub async fn multiply_handler(
    State(state): State<AppState>,
    query: OperandQuery,
) -> Result<Json<CalcResponse>> {
    calculate(&state, Operation::Multiply, query)
}

/// Handler for GET /divide
pub async fn divide_handler(
    State(state): State<AppState>,
    query: OperandQuery,
) -> Result<Json<CalcResponse>> {
    calculate(&state, Operation::Divide, query)
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualScheduler;
    use crate::error::CalcError;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio_test::{assert_err, assert_ok};

    fn test_state() -> (AppState, ManualScheduler) {
        let scheduler = ManualScheduler::new();
        let cache = ExpiringCache::new(Duration::from_secs(60), Arc::new(scheduler.clone()));
        (AppState::new(cache), scheduler)
    }

    fn operands(x: &str, y: &str) -> OperandQuery {
        Ok(Query(vec![
            ("x".to_string(), x.to_string()),
            ("y".to_string(), y.to_string()),
        ]))
    }

    #[tokio::test]
    async fn test_add_miss_then_hit() {
        let (state, _scheduler) = test_state();

        let first = assert_ok!(add_handler(State(state.clone()), operands("4", "2")).await);
        assert_eq!(first.answer, 6.0);
        assert!(!first.cached);

        let second = assert_ok!(add_handler(State(state), operands("4", "2")).await);
        assert_eq!(second.answer, 6.0);
        assert!(second.cached);
    }

    #[tokio::test]
    async fn test_operand_spelling_shares_entry() {
        let (state, _scheduler) = test_state();

        let first = assert_ok!(multiply_handler(State(state.clone()), operands("3", "2.5")).await);
        assert!(!first.cached);
        let again = assert_ok!(multiply_handler(State(state), operands("3.0", "2.50")).await);
        assert!(again.cached);
    }

    #[tokio::test]
    async fn test_operations_do_not_share_entries() {
        let (state, _scheduler) = test_state();

        let sum = assert_ok!(add_handler(State(state.clone()), operands("8", "2")).await);
        assert_eq!(sum.answer, 10.0);
        let diff = assert_ok!(subtract_handler(State(state.clone()), operands("8", "2")).await);
        assert!(!diff.cached);
        assert_eq!(diff.answer, 6.0);
        assert_eq!(state.cache.len(), 2);
    }

    #[tokio::test]
    async fn test_divide_by_zero_not_cached() {
        let (state, _scheduler) = test_state();

        for _ in 0..2 {
            let err = assert_err!(divide_handler(State(state.clone()), operands("6", "0")).await);
            assert!(matches!(err, CalcError::Math(_)));
        }
        assert!(state.cache.is_empty());
        assert_eq!(state.cache.stats().failures, 2);
    }

    #[tokio::test]
    async fn test_malformed_request_skips_cache() {
        let (state, _scheduler) = test_state();

        let err = assert_err!(add_handler(State(state.clone()), operands("", "2")).await);
        assert!(matches!(err, CalcError::Request(_)));
        assert_eq!(state.cache.stats().misses, 0);
    }

    #[tokio::test]
    async fn test_repeated_operand_uses_first_value() {
        let (state, _scheduler) = test_state();
        let query = Ok(Query(vec![
            ("x".to_string(), "4".to_string()),
            ("x".to_string(), "5".to_string()),
            ("y".to_string(), "2".to_string()),
        ]));

        let response = assert_ok!(add_handler(State(state.clone()), query).await);
        assert_eq!(response.x, 4.0);
        assert_eq!(response.answer, 6.0);
        assert!(state.cache.contains_key("/add?x=4&y=2"));
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let (state, _scheduler) = test_state();
        let _ = assert_ok!(add_handler(State(state.clone()), operands("1", "1")).await);
        let _ = assert_ok!(add_handler(State(state.clone()), operands("1", "1")).await);

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 1);
        assert_eq!(response.misses, 1);
        assert_eq!(response.total_entries, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
