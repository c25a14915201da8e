//! Records the level of every tracing event emitted on the test thread.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

#[derive(Debug, Clone, Default)]
pub(crate) struct CapturedEvents {
    levels: Arc<Mutex<Vec<Level>>>,
}

impl CapturedEvents {
    /// Captures events until the returned guard is dropped.
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let captured = Self::default();
        let subscriber = tracing_subscriber::registry().with(captured.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        (captured, guard)
    }

    pub(crate) fn count(&self, level: Level) -> usize {
        self.levels.lock().iter().filter(|seen| **seen == level).count()
    }
}

impl<S: Subscriber> Layer<S> for CapturedEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        self.levels.lock().push(*event.metadata().level());
    }
}
