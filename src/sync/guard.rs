use std::sync::atomic::{AtomicU64, Ordering};

/// Latest-only token guard
///
/// Each unit of async work takes a token before it starts and checks
/// [`LatestOnlyGuard::is_latest`] after every suspension point. Work holding an
/// older token is stale and its result must be dropped.
#[derive(Debug, Default)]
pub struct LatestOnlyGuard {
    latest: AtomicU64,
}

impl LatestOnlyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new token; tokens start at 1 and strictly increase
    pub fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn is_latest(&self, token: u64) -> bool {
        self.latest.load(Ordering::Acquire) == token
    }

    /// Most recently issued token, 0 if none
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tokens_increase_from_one() {
        let guard = LatestOnlyGuard::new();
        assert_eq!(guard.current(), 0);
        assert_eq!(guard.next_token(), 1);
        assert_eq!(guard.next_token(), 2);
        assert_eq!(guard.current(), 2);
    }

    #[test]
    fn test_only_latest_token_is_current() {
        let guard = LatestOnlyGuard::new();
        let first = guard.next_token();
        assert!(guard.is_latest(first));

        let second = guard.next_token();
        assert!(!guard.is_latest(first));
        assert!(guard.is_latest(second));
        assert!(!guard.is_latest(0));
    }

    #[tokio::test]
    async fn test_stale_task_result_is_dropped() {
        let guard = Arc::new(LatestOnlyGuard::new());
        let results = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let mut handles = Vec::new();
        for (value, delay_ms) in [("slow", 30u64), ("fast", 5u64)] {
            let token = guard.next_token();
            let guard = guard.clone();
            let results = results.clone();
            handles.push(tokio::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
                if guard.is_latest(token) {
                    results.lock().push(value);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*results.lock(), vec!["fast"]);
    }

    #[test]
    fn test_concurrent_tokens_are_unique() {
        let guard = Arc::new(LatestOnlyGuard::new());
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let guard = guard.clone();
                std::thread::spawn(move || (0..100).map(|_| guard.next_token()).collect::<Vec<_>>())
            })
            .collect();

        let mut all: Vec<u64> = threads
            .into_iter()
            .flat_map(|t| t.join().unwrap())
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
        assert_eq!(guard.current(), 800);
    }
}
