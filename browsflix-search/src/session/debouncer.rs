//! Search input debouncing.
//!
//! Holds a handle to the single pending timer. Each new raw value aborts it
//! and arms a fresh one, so only the last value before a quiet interval is
//! emitted.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coalesces rapid query edits into one stabilized value.
#[derive(Debug)]
pub struct SearchDebouncer {
    quiet_interval: Duration,
    emitter: mpsc::UnboundedSender<String>,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    /// Creates a debouncer emitting stabilized values into `emitter`.
    pub fn new(quiet_interval: Duration, emitter: mpsc::UnboundedSender<String>) -> Self {
        Self {
            quiet_interval,
            emitter,
            pending: None,
        }
    }

    pub fn quiet_interval(&self) -> Duration {
        self.quiet_interval
    }

    /// Accepts a raw value, superseding any pending one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&mut self, raw: impl Into<String>) {
        self.cancel();

        let value = raw.into();
        let emitter = self.emitter.clone();
        let quiet_interval = self.quiet_interval;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_interval).await;
            // Receiver gone means the session ended; nothing to report
            let _ = emitter.send(value);
        }));
    }

    /// Discards the pending emission, if any, without emitting.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    /// True while a value is waiting for its quiet interval to elapse.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| !pending.is_finished())
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_emits_last_value_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(QUIET, tx);

        debouncer.submit("a");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.submit("ab");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.submit("abc");

        assert_eq!(rx.recv().await.as_deref(), Some("abc"));

        tokio::time::sleep(QUIET * 4).await;
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_values_separated_by_quiet_interval_both_emit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(QUIET, tx);

        debouncer.submit("dune");
        assert_eq!(rx.recv().await.as_deref(), Some("dune"));

        debouncer.submit("dune part two");
        assert_eq!(rx.recv().await.as_deref(), Some("dune part two"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_emission_waits_full_interval_after_last_edit() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(QUIET, tx);

        debouncer.submit("he");
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.submit("heat");
        tokio::time::sleep(Duration::from_millis(400)).await;

        // 800ms after the first edit but only 400ms after the last
        assert!(rx.try_recv().is_err());
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(rx.try_recv().ok().as_deref(), Some("heat"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = SearchDebouncer::new(QUIET, tx);

        debouncer.submit("alien");
        debouncer.cancel();
        tokio::time::sleep(QUIET * 2).await;

        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_discards_pending_value() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut debouncer = SearchDebouncer::new(QUIET, tx);
            debouncer.submit("alien");
        }
        tokio::time::sleep(QUIET * 2).await;

        // Sender dropped with the aborted task: channel closed, nothing delivered
        assert_eq!(rx.recv().await, None);
    }
}
