//! Bounded sequential discovery with absence as the terminator.
//!
//! Some pages only expose their sections by position: try index 1, 2, 3, ...
//! until nothing is there. The first empty index ends the sequence; it is not
//! an error.

use std::fmt::Display;
use std::future::Future;

/// Calls `probe(1)`, `probe(2)`, ... and collects what it finds.
///
/// Stops at the first `Ok(None)`, at the first error (logged, never
/// returned), or after `limit` items, whichever comes first.
pub async fn probe_sequence<T, E, F, Fut>(limit: usize, mut probe: F) -> Vec<T>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
    E: Display,
{
    let mut found = Vec::new();

    for index in 1..=limit {
        match probe(index).await {
            Ok(Some(item)) => found.push(item),
            Ok(None) => {
                tracing::debug!(index, found = found.len(), "probe sequence ended");
                return found;
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "probe failed; ending sequence");
                return found;
            }
        }
    }

    tracing::warn!(limit, "probe sequence reached its limit");
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stops_at_first_absent_index() {
        let found = probe_sequence(100, |i| async move {
            Ok::<_, String>(if i <= 4 { Some(i * 10) } else { None })
        })
        .await;
        assert_eq!(found, vec![10, 20, 30, 40]);
    }

    #[tokio::test]
    async fn absent_first_index_yields_nothing() {
        let found = probe_sequence(100, |_| async { Ok::<Option<u8>, String>(None) }).await;
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn error_ends_sequence_without_raising() {
        let found = probe_sequence(100, |i| async move {
            if i == 3 {
                Err("xpath evaluation failed".to_string())
            } else {
                Ok(Some(i))
            }
        })
        .await;
        assert_eq!(found, vec![1, 2]);
    }

    #[tokio::test]
    async fn limit_bounds_an_endless_page() {
        let mut calls = 0;
        let found = probe_sequence(5, |i| {
            calls += 1;
            async move { Ok::<_, String>(Some(i)) }
        })
        .await;
        assert_eq!(found, vec![1, 2, 3, 4, 5]);
        assert_eq!(calls, 5);
    }
}
