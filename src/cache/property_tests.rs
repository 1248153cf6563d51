//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the cache against a plain `HashMap` model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tokio::time::Instant;

use crate::cache::{CacheEngine, HashRouter, LocalCache};
use crate::config::Config;

// == Test Configuration ==
const TEST_BUCKETS: usize = 16;
const TEST_TTL: Duration = Duration::from_secs(300);

fn test_cache() -> LocalCache<String> {
    LocalCache::without_sweeper(
        Config::default()
            .with_ttl(TEST_TTL)
            .with_bucket_count(TEST_BUCKETS),
    )
}

// == Strategies ==
/// Generates cache keys, including the empty key
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_:]{0,64}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,256}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    // Small key space so sets and gets collide often
    let key = "[a-d]{1,2}";
    prop_oneof![
        (key, value_strategy()).prop_map(|(key, value)| CacheOp::Set { key, value }),
        key.prop_map(|key| CacheOp::Get { key }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Every get returns exactly what the last set for that key stored, and
    // the statistics count every hit, miss and set.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let cache = test_cache();
        let mut model: HashMap<String, String> = HashMap::new();
        let (mut hits, mut misses, mut sets) = (0u64, 0u64, 0u64);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    cache.set(key.clone(), value.clone());
                    model.insert(key, value);
                    sets += 1;
                }
                CacheOp::Get { key } => {
                    let got = cache.get(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key), "Mismatch for key {}", key);
                    if got.is_some() { hits += 1 } else { misses += 1 }
                }
            }
        }

        let stats = cache.stats();
        prop_assert_eq!(stats.hits, hits);
        prop_assert_eq!(stats.misses, misses);
        prop_assert_eq!(stats.sets, sets);
        prop_assert_eq!(stats.total_entries, model.len());
        prop_assert_eq!(cache.len(), model.len());
    }

    #[test]
    fn prop_roundtrip_storage(key in key_strategy(), value in value_strategy()) {
        let cache = test_cache();

        cache.set(key.clone(), value.clone());

        prop_assert_eq!(cache.get(&key), Some(value));
    }

    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let cache = test_cache();

        cache.set(key.clone(), value1);
        cache.set(key.clone(), value2.clone());

        prop_assert_eq!(cache.get(&key), Some(value2));
        prop_assert_eq!(cache.len(), 1);
    }

    #[test]
    fn prop_absent_key_not_found(
        stored in prop::collection::hash_map(key_strategy(), value_strategy(), 0..20),
        probe in key_strategy()
    ) {
        prop_assume!(!stored.contains_key(&probe));
        let cache = test_cache();
        for (key, value) in stored {
            cache.set(key, value);
        }

        prop_assert_eq!(cache.get(&probe), None);
    }

    #[test]
    fn prop_route_stable_and_in_range(key in ".*", shift in 0u32..10) {
        let buckets = 1usize << shift;
        let router = HashRouter::new(buckets);

        let index = router.route(&key);
        prop_assert!(index < buckets);
        prop_assert_eq!(index, router.route(&key));
    }

    // Every key readable from a bucket has a ledger stamp, and a sweep
    // before the TTL elapses evicts nothing.
    #[test]
    fn prop_sweep_before_ttl_keeps_everything(
        entries in prop::collection::vec((key_strategy(), value_strategy()), 1..50)
    ) {
        let engine: CacheEngine<String> = CacheEngine::new(
            &Config::default().with_ttl(TEST_TTL).with_bucket_count(TEST_BUCKETS),
        );
        for (key, value) in &entries {
            engine.set(key.clone(), value.clone());
        }

        for (key, _) in &entries {
            prop_assert!(engine.ledger().stamped_at(key).is_some());
        }

        prop_assert_eq!(engine.sweep_expired(Instant::now()), 0);
        for (key, _) in &entries {
            prop_assert!(engine.get(key).is_some());
        }
    }

    // After the TTL has passed, one sweep empties both buckets and ledger.
    #[test]
    fn prop_sweep_after_ttl_evicts_everything(
        entries in prop::collection::hash_map(key_strategy(), value_strategy(), 1..50)
    ) {
        let engine: CacheEngine<String> = CacheEngine::new(
            &Config::default().with_ttl(TEST_TTL).with_bucket_count(TEST_BUCKETS),
        );
        for (key, value) in &entries {
            engine.set(key.clone(), value.clone());
        }

        let later = Instant::now() + TEST_TTL + Duration::from_secs(1);
        prop_assert_eq!(engine.sweep_expired(later), entries.len());
        prop_assert!(engine.is_empty());
        prop_assert!(engine.ledger().is_empty());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    // Threads writing disjoint keys never see each other's values.
    #[test]
    fn prop_concurrent_disjoint_writers(
        values in prop::collection::vec(value_strategy(), 4..8),
        rounds in 10usize..50
    ) {
        let cache = Arc::new(test_cache());

        let handles: Vec<_> = values
            .iter()
            .cloned()
            .enumerate()
            .map(|(worker, value)| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for round in 0..rounds {
                        let key = format!("worker{}:{}", worker, round % 5);
                        let expected = format!("{}#{}", value, round);
                        cache.set(key.clone(), expected.clone());
                        if cache.get(&key) != Some(expected) {
                            return false;
                        }
                    }
                    true
                })
            })
            .collect();

        for handle in handles {
            prop_assert!(handle.join().unwrap(), "Worker observed a foreign value");
        }
        prop_assert_eq!(cache.len(), values.len() * rounds.min(5));
    }
}
