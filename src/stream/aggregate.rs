//! Concurrent fan-out / fan-in for an adapter's sub-fetches.
//!
//! Sites such as HDRezka need one request per translator; SerienFans one
//! per language channel. All sub-fetches are started together and the
//! caller waits until every one has settled. A failed sub-fetch is logged
//! and contributes nothing; it never aborts its siblings.

use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::error::Result;

/// Run labelled sub-fetches concurrently and merge their successful
/// results in task order.
pub async fn fan_in<L, F, T>(provider: &str, tasks: impl IntoIterator<Item = (L, F)>) -> Vec<T>
where
    L: Display,
    F: Future<Output = Result<Vec<T>>>,
{
    let settled = join_all(
        tasks
            .into_iter()
            .map(|(label, task)| async move { (label, task.await) }),
    )
    .await;

    let total = settled.len();
    let mut failed = 0usize;
    let mut merged = Vec::new();

    for (label, outcome) in settled {
        match outcome {
            Ok(items) => merged.extend(items),
            Err(e) => {
                failed += 1;
                warn!(provider, task = %label, error = %e, "Sub-fetch failed");
            }
        }
    }

    debug!(provider, total, failed, merged = merged.len(), "Sub-fetches settled");
    merged
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use futures::future::{ready, Ready};
    use tokio::sync::Barrier;

    use super::*;
    use crate::error::ScrapeError;

    fn failure() -> ScrapeError {
        ScrapeError::Status {
            url: "https://site.example/ajax".to_string(),
            status: 502,
        }
    }

    #[tokio::test]
    async fn merges_successes_in_task_order() {
        let tasks = vec![("a", ready(Ok(vec![1, 2]))), ("b", ready(Ok(vec![3])))];
        assert_eq!(fan_in("test", tasks).await, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn failed_task_does_not_hide_siblings() {
        let tasks = vec![
            ("ok-1", ready(Ok(vec!["x"]))),
            ("broken", ready(Err(failure()))),
            ("ok-2", ready(Ok(vec!["y"]))),
        ];
        assert_eq!(fan_in("test", tasks).await, vec!["x", "y"]);
    }

    #[tokio::test]
    async fn all_failures_resolve_empty() {
        let tasks = (0..3).map(|i| (i, async { Err::<Vec<u8>, _>(failure()) }));
        assert!(fan_in("test", tasks).await.is_empty());
    }

    #[tokio::test]
    async fn no_tasks_resolve_empty() {
        let tasks: Vec<(&str, Ready<Result<Vec<u8>>>)> = Vec::new();
        assert!(fan_in("test", tasks).await.is_empty());
    }

    #[tokio::test]
    async fn sub_fetches_run_concurrently() {
        // Each task waits for the other at the barrier; sequential execution would never finish.
        let barrier = Arc::new(Barrier::new(2));
        let tasks = (0..2).map(|i| {
            let barrier = barrier.clone();
            (i, async move {
                barrier.wait().await;
                Ok(vec![i])
            })
        });

        let merged = tokio::time::timeout(Duration::from_secs(5), fan_in("test", tasks))
            .await
            .expect("sub-fetches should run concurrently");
        assert_eq!(merged, vec![0, 1]);
    }
}
