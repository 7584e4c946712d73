use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Trailing-edge debouncer
///
/// Every [`Debouncer::call`] replaces the pending invocation, so a burst of
/// calls results in a single callback with the last arguments once `delay`
/// has passed without a new call. Must be used from within a tokio runtime.
pub struct Debouncer<A> {
    delay: Duration,
    callback: Arc<dyn Fn(A) + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl<A: Send + 'static> Debouncer<A> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule the callback with `args`, cancelling any pending invocation
    pub fn call(&self, args: A) {
        let callback = self.callback.clone();
        let delay = self.delay;
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(args);
        });

        if let Some(previous) = self.pending.lock().replace(task) {
            previous.abort();
        }
    }

    /// Drop the pending invocation without running it
    pub fn cancel(&self) {
        if let Some(task) = self.pending.lock().take() {
            task.abort();
        }
    }

    /// Whether an invocation is scheduled and has not run yet
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(task) = self.pending.get_mut().take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn recording() -> (Arc<Mutex<Vec<u32>>>, impl Fn(u32) + Send + Sync + 'static) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let sink = calls.clone();
        (calls, move |value| sink.lock().push(value))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_last_call() {
        let (calls, callback) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(250), callback);

        debouncer.call(1);
        sleep(Duration::from_millis(100)).await;
        debouncer.call(2);
        sleep(Duration::from_millis(100)).await;
        debouncer.call(3);
        assert!(calls.lock().is_empty());

        sleep(Duration::from_millis(300)).await;
        assert_eq!(*calls.lock(), vec![3]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay_only() {
        let (calls, callback) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(250), callback);

        debouncer.call(7);
        assert!(debouncer.is_pending());
        sleep(Duration::from_millis(200)).await;
        assert!(calls.lock().is_empty());
        sleep(Duration::from_millis(100)).await;
        assert_eq!(*calls.lock(), vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_callback() {
        let (calls, callback) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(250), callback);

        debouncer.call(1);
        debouncer.cancel();
        assert!(!debouncer.is_pending());
        sleep(Duration::from_millis(500)).await;
        assert!(calls.lock().is_empty());

        // Still usable after a cancel
        debouncer.call(2);
        sleep(Duration::from_millis(300)).await;
        assert_eq!(*calls.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_call() {
        let (calls, callback) = recording();
        let debouncer = Debouncer::new(Duration::from_millis(250), callback);
        debouncer.call(1);
        drop(debouncer);

        sleep(Duration::from_millis(500)).await;
        assert!(calls.lock().is_empty());
    }
}
