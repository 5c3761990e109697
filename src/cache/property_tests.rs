//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against arbitrary operation sequences
//! on a virtual clock.

use proptest::prelude::*;
use std::cell::Cell;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Query;
use axum::http::Uri;

use crate::cache::{ExpiringCache, ManualScheduler};
use crate::calc::{cache_key, Operation};
use crate::models::CalcQuery;

// == Test Configuration ==
const TEST_TTL: Duration = Duration::from_secs(60);

fn manual_cache() -> (ExpiringCache<u32>, ManualScheduler) {
    let scheduler = ManualScheduler::new();
    let cache = ExpiringCache::new(TEST_TTL, Arc::new(scheduler.clone()));
    (cache, scheduler)
}

// == Strategies ==
/// Generates cache keys from a small pool so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d]".prop_map(|s| s)
}

fn operation_strategy() -> impl Strategy<Value = Operation> {
    prop::sample::select(Operation::ALL.to_vec())
}

fn operand_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        (-1000i32..1000).prop_map(f64::from),
        -1.0e6f64..1.0e6f64,
    ]
}

#[derive(Debug, Clone)]
enum CacheOp {
    GetOrCompute { key: String, value: u32 },
    Renew { key: String },
    Delete { key: String },
    Advance { secs: u64 },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (key_strategy(), any::<u32>())
            .prop_map(|(key, value)| CacheOp::GetOrCompute { key, value }),
        key_strategy().prop_map(|key| CacheOp::Renew { key }),
        key_strategy().prop_map(|key| CacheOp::Delete { key }),
        (0u64..90).prop_map(|secs| CacheOp::Advance { secs }),
    ]
}

fn derive_key(operation: Operation, query: &str) -> String {
    let uri: Uri = format!("/{}?{}", operation.name(), query).parse().unwrap();
    let Query(pairs): Query<Vec<(String, String)>> = Query::try_from_uri(&uri).unwrap();
    let (x, y) = pairs.into_iter().collect::<CalcQuery>().operands().unwrap();
    cache_key(operation, x, y)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Parameter order, extra parameters and number spelling never change the key.
    #[test]
    fn prop_key_derivation_is_canonical(
        operation in operation_strategy(),
        x in operand_strategy(),
        y in operand_strategy(),
    ) {
        let plain = derive_key(operation, &format!("x={}&y={}", x, y));
        let reordered = derive_key(operation, &format!("y={}&x={}", y, x));
        let padded = derive_key(operation, &format!("debug=1&y={:e}&x={:e}", y, x));

        prop_assert_eq!(&plain, &reordered);
        prop_assert_eq!(&plain, &padded);
    }

    // A fresh key misses once, then hits with the same value and no compute.
    #[test]
    fn prop_miss_then_hit(key in key_strategy(), value in any::<u32>()) {
        let (cache, _scheduler) = manual_cache();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, ()>(value)
        };

        let first = cache.get_or_compute(&key, compute).unwrap();
        prop_assert!(!first.hit);
        let second = cache.get_or_compute(&key, compute).unwrap();
        prop_assert!(second.hit);
        prop_assert_eq!(second.value, value);
        prop_assert_eq!(calls.get(), 1);
    }

    // Failures are recomputed every time.
    #[test]
    fn prop_failures_never_cached(key in key_strategy(), attempts in 1usize..10) {
        let (cache, scheduler) = manual_cache();
        let calls = Cell::new(0);

        for _ in 0..attempts {
            let result = cache.get_or_compute(&key, || {
                calls.set(calls.get() + 1);
                Err::<u32, _>("math")
            });
            prop_assert!(result.is_err());
        }

        prop_assert_eq!(calls.get(), attempts);
        prop_assert!(cache.is_empty());
        prop_assert_eq!(scheduler.pending_timers(), 0);
    }

    // Any run of accesses spaced under the TTL keeps the entry alive; one
    // full idle TTL evicts it.
    #[test]
    fn prop_sliding_expiration(gaps in prop::collection::vec(0u64..59_999, 1..20)) {
        let (cache, scheduler) = manual_cache();
        cache.get_or_compute("k", || Ok::<_, ()>(1)).unwrap();

        for gap in gaps {
            scheduler.advance(Duration::from_millis(gap));
            let lookup = cache.get_or_compute("k", || Ok::<_, ()>(2)).unwrap();
            prop_assert!(lookup.hit, "entry expired after a {}ms gap", gap);
        }

        scheduler.advance(TEST_TTL);
        prop_assert!(!cache.contains_key("k"));
    }

    // Whatever the interleaving, each live entry owns exactly one timer and
    // the hit/miss counters add up.
    #[test]
    fn prop_one_timer_per_entry(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let (cache, scheduler) = manual_cache();
        let mut lookups = 0u64;

        for op in ops {
            match op {
                CacheOp::GetOrCompute { key, value } => {
                    let _ = cache.get_or_compute(&key, || Ok::<_, ()>(value));
                    lookups += 1;
                }
                CacheOp::Renew { key } => {
                    let existed = cache.contains_key(&key);
                    prop_assert_eq!(cache.renew(&key), existed);
                }
                CacheOp::Delete { key } => {
                    let _ = cache.delete(&key);
                }
                CacheOp::Advance { secs } => {
                    scheduler.advance(Duration::from_secs(secs));
                }
            }
            prop_assert_eq!(scheduler.pending_timers(), cache.len());
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits + stats.misses, lookups);
        prop_assert_eq!(stats.total_entries, cache.len());

        scheduler.advance(TEST_TTL);
        prop_assert!(cache.is_empty());
        prop_assert_eq!(scheduler.pending_timers(), 0);
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renewal_after_eviction_is_noop() {
        let (cache, scheduler) = manual_cache();
        cache.get_or_compute("k", || Ok::<_, ()>(1)).unwrap();

        scheduler.advance(TEST_TTL);
        assert!(!cache.contains_key("k"));
        assert!(!cache.renew("k"));
        assert_eq!(scheduler.pending_timers(), 0);
    }

    #[test]
    fn test_recompute_after_expiry() {
        let (cache, scheduler) = manual_cache();
        cache.get_or_compute("k", || Ok::<_, ()>(1)).unwrap();
        scheduler.advance(TEST_TTL);

        let lookup = cache.get_or_compute("k", || Ok::<_, ()>(1)).unwrap();
        assert!(!lookup.hit);
        assert_eq!(cache.stats().misses, 2);
    }
}
