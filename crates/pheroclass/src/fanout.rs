//! Bounded per-entity fan-out
//!
//! Dashboards read the same thing for many entities (lectures of every
//! class, results of every student). Reads run at most `concurrency` at a
//! time; one entity failing is logged and skipped.

use futures::stream::{self, StreamExt};
use pheroclass_classroom::ClassroomResult;
use std::fmt::Display;
use std::future::Future;
use tracing::warn;

/// Default number of reads in flight per fan-out
pub const DEFAULT_FETCH_CONCURRENCY: usize = 4;

/// Run `fetch` for every item and keep the successes, in input order
pub async fn fan_out<K, T, F, Fut>(what: &str, items: Vec<K>, concurrency: usize, fetch: F) -> Vec<(K, T)>
where
    K: Clone + Display,
    F: Fn(K) -> Fut,
    Fut: Future<Output = ClassroomResult<T>>,
{
    stream::iter(items)
        .map(|item| {
            let read = fetch(item.clone());
            async move { (item, read.await) }
        })
        .buffered(concurrency.max(1))
        .filter_map(|(item, result)| async move {
            match result {
                Ok(value) => Some((item, value)),
                Err(e) => {
                    warn!("Failed to fetch {} for {}: {}", what, item, e);
                    None
                }
            }
        })
        .collect()
        .await
}
