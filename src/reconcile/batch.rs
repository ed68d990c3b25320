//! Rate-limited fan-out for per-item provider requests.

use futures::future::join_all;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tracing::{debug, warn};

use crate::Result;

/// Concurrent requests per batch
pub const DEFAULT_BATCH_SIZE: usize = 5;

/// Pause between batches
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchConfig {
    pub batch_size: usize,
    pub delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            delay: DEFAULT_BATCH_DELAY,
        }
    }
}

/// Fetch `ids` in fixed-size concurrent batches with a delay between them.
///
/// A failed item is logged and left out of the result; it never aborts the
/// rest of the run. The result therefore holds at most `ids.len()` entries.
pub async fn fetch_in_batches<K, T, F, Fut>(
    ids: &[K],
    config: BatchConfig,
    fetch: F,
) -> HashMap<K, T>
where
    K: Copy + Eq + Hash + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut results = HashMap::with_capacity(ids.len());
    let batch_size = config.batch_size.max(1);

    for (index, chunk) in ids.chunks(batch_size).enumerate() {
        if index > 0 && !config.delay.is_zero() {
            tokio::time::sleep(config.delay).await;
        }

        let outcomes = join_all(chunk.iter().map(|&id| {
            let request = fetch(id);
            async move { (id, request.await) }
        }))
        .await;

        for (id, outcome) in outcomes {
            match outcome {
                Ok(value) => {
                    results.insert(id, value);
                }
                Err(e) => warn!(id = %id, error = %e, "fetch failed; skipping item"),
            }
        }
        debug!(batch = index + 1, fetched = results.len(), "batch complete");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FantasyError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Instant;

    fn fast() -> BatchConfig {
        BatchConfig {
            batch_size: 5,
            delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_fetches_every_id() {
        let ids: Vec<u32> = (1..=12).collect();
        let results = fetch_in_batches(&ids, fast(), |id| async move { Ok(id * 10) }).await;

        assert_eq!(results.len(), 12);
        assert_eq!(results[&7], 70);
    }

    #[tokio::test]
    async fn test_single_failure_does_not_block_others() {
        let ids: Vec<u32> = (1..=8).collect();
        let results = fetch_in_batches(&ids, fast(), |id| async move {
            if id == 3 {
                Err(FantasyError::Provider {
                    provider: "fpl",
                    message: "simulated outage".to_string(),
                })
            } else {
                Ok(id)
            }
        })
        .await;

        assert_eq!(results.len(), ids.len() - 1);
        assert!(!results.contains_key(&3));
        assert!(results.contains_key(&8));
    }

    #[tokio::test]
    async fn test_concurrency_is_capped_at_batch_size() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let ids: Vec<u32> = (1..=11).collect();

        let results = fetch_in_batches(&ids, fast(), |id| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(5)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(id)
            }
        })
        .await;

        assert_eq!(results.len(), 11);
        assert!(peak.load(Ordering::SeqCst) <= 5);
    }

    #[tokio::test]
    async fn test_delay_between_batches() {
        let config = BatchConfig {
            batch_size: 2,
            delay: Duration::from_millis(20),
        };
        let ids: Vec<u32> = (1..=6).collect();

        let started = Instant::now();
        let results = fetch_in_batches(&ids, config, |id| async move { Ok(id) }).await;

        assert_eq!(results.len(), 6);
        // three batches, two pauses
        assert!(started.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let ids: Vec<u32> = Vec::new();
        let results = fetch_in_batches(&ids, BatchConfig::default(), |id| async move { Ok(id) }).await;
        assert!(results.is_empty());
    }

    #[test]
    fn test_default_config() {
        let config = BatchConfig::default();
        assert_eq!(config.batch_size, 5);
        assert_eq!(config.delay, Duration::from_millis(200));
    }
}
