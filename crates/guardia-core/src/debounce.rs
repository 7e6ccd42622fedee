//! Cancellable delayed dispatch.
//!
//! Each `push` restarts the quiet window; only the last value pushed within
//! a window is delivered.  Used for the search box so the pipeline runs
//! once the user stops typing rather than on every key.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;

pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

pub struct Debouncer<T> {
    delay: Duration,
    tx: mpsc::UnboundedSender<T>,
    pending: Option<AbortHandle>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Values are delivered on `tx` after `delay` of inactivity.
    /// Must be used from within a tokio runtime.
    pub fn new(delay: Duration, tx: mpsc::UnboundedSender<T>) -> Self {
        Self {
            delay,
            tx,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule `value`, superseding anything still waiting.
    pub fn push(&mut self, value: T) {
        self.cancel();
        let tx = self.tx.clone();
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(value);
        });
        self.pending = Some(handle.abort_handle());
    }

    /// Deliver `value` immediately, dropping whatever was waiting.
    pub fn flush_now(&mut self, value: T) {
        self.cancel();
        let _ = self.tx.send(value);
    }

    pub fn cancel(&mut self) {
        if let Some(prev) = self.pending.take() {
            prev.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(prev) = self.pending.take() {
            prev.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_value_is_delivered() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut d = Debouncer::new(DEFAULT_DELAY, tx);

        d.push("g".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        d.push("gu".to_string());
        tokio::time::sleep(Duration::from_millis(100)).await;
        let start = Instant::now();
        d.push("gue".to_string());

        assert_eq!(rx.recv().await.as_deref(), Some("gue"));
        assert!(start.elapsed() >= DEFAULT_DELAY);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_value() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let mut d = Debouncer::new(DEFAULT_DELAY, tx);
        d.push(1);
        assert!(d.is_pending());
        d.cancel();
        assert!(!d.is_pending());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_now_skips_the_wait() {
        let (tx, mut rx) = mpsc::unbounded_channel::<u32>();
        let mut d = Debouncer::new(DEFAULT_DELAY, tx);
        d.push(1);
        d.flush_now(2);
        assert_eq!(rx.try_recv().ok(), Some(2));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(rx.try_recv().is_err());
    }
}
