//! Metric listeners notified after each committed write batch.
//!
//! These callbacks time the store transaction itself, across retries,
//! rather than the whole write call.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use metagraph_core::{MetricEvent, WriteKind};

/// Receives write metrics. Every method defaults to a no-op.
pub trait MetricListener: Send + Sync {
    /// `count` entities were added in one transaction.
    fn on_entities_added(&self, _count: usize, _elapsed: Duration, _retries: u32) {}

    /// `count` relationships were added in one transaction.
    fn on_relationships_added(&self, _count: usize, _elapsed: Duration, _retries: u32) {}

    /// `count` entities were removed in one transaction.
    fn on_entities_removed(&self, _count: usize, _elapsed: Duration, _retries: u32) {}

    /// `count` relationships were removed in one transaction.
    fn on_relationships_removed(&self, _count: usize, _elapsed: Duration, _retries: u32) {}
}

/// Ordered set of listeners, all invoked synchronously with the same event.
///
/// A listener that panics is logged and skipped; the listeners after it are
/// still notified.
#[derive(Default)]
pub struct MetricFanout {
    listeners: RwLock<Vec<Arc<dyn MetricListener>>>,
}

impl MetricFanout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&self, listener: Arc<dyn MetricListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn notify(&self, event: &MetricEvent) {
        // Snapshot so a listener can register another listener without deadlocking.
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        for (index, listener) in listeners.iter().enumerate() {
            let outcome = catch_unwind(AssertUnwindSafe(|| dispatch(listener.as_ref(), event)));
            if outcome.is_err() {
                tracing::error!(listener = index, kind = %event.kind, "Metric listener panicked");
            }
        }
    }
}

fn dispatch(listener: &dyn MetricListener, event: &MetricEvent) {
    let MetricEvent {
        kind,
        count,
        elapsed,
        retries,
    } = *event;
    match kind {
        WriteKind::EntitiesAdded => listener.on_entities_added(count, elapsed, retries),
        WriteKind::EntitiesRemoved => listener.on_entities_removed(count, elapsed, retries),
        WriteKind::RelationshipsAdded => listener.on_relationships_added(count, elapsed, retries),
        WriteKind::RelationshipsRemoved => {
            listener.on_relationships_removed(count, elapsed, retries)
        }
    }
}

/// Logs every event through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetricListener;

impl TracingMetricListener {
    fn log(kind: WriteKind, count: usize, elapsed: Duration, retries: u32) {
        tracing::info!(
            kind = %kind,
            count,
            elapsed_ms = elapsed.as_millis() as u64,
            retries,
            "Graph write committed"
        );
    }
}

impl MetricListener for TracingMetricListener {
    fn on_entities_added(&self, count: usize, elapsed: Duration, retries: u32) {
        Self::log(WriteKind::EntitiesAdded, count, elapsed, retries);
    }

    fn on_relationships_added(&self, count: usize, elapsed: Duration, retries: u32) {
        Self::log(WriteKind::RelationshipsAdded, count, elapsed, retries);
    }

    fn on_entities_removed(&self, count: usize, elapsed: Duration, retries: u32) {
        Self::log(WriteKind::EntitiesRemoved, count, elapsed, retries);
    }

    fn on_relationships_removed(&self, count: usize, elapsed: Duration, retries: u32) {
        Self::log(WriteKind::RelationshipsRemoved, count, elapsed, retries);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(WriteKind, usize, u32)>>,
    }

    impl MetricListener for Recorder {
        fn on_entities_added(&self, count: usize, _: Duration, retries: u32) {
            self.seen
                .lock()
                .unwrap()
                .push((WriteKind::EntitiesAdded, count, retries));
        }

        fn on_relationships_removed(&self, count: usize, _: Duration, retries: u32) {
            self.seen
                .lock()
                .unwrap()
                .push((WriteKind::RelationshipsRemoved, count, retries));
        }
    }

    struct Panicker;

    impl MetricListener for Panicker {
        fn on_entities_added(&self, _: usize, _: Duration, _: u32) {
            panic!("listener failure");
        }
    }

    #[test]
    fn every_listener_gets_the_same_event() {
        let fanout = MetricFanout::new();
        let a = Arc::new(Recorder::default());
        let b = Arc::new(Recorder::default());
        fanout.add_listener(a.clone());
        fanout.add_listener(b.clone());

        fanout.notify(&MetricEvent::new(
            WriteKind::RelationshipsRemoved,
            4,
            Duration::from_millis(3),
            2,
        ));

        for recorder in [&a, &b] {
            assert_eq!(
                *recorder.seen.lock().unwrap(),
                vec![(WriteKind::RelationshipsRemoved, 4, 2)]
            );
        }
    }

    #[test]
    fn panicking_listener_does_not_starve_the_rest() {
        let fanout = MetricFanout::new();
        let before = Arc::new(Recorder::default());
        let after = Arc::new(Recorder::default());
        fanout.add_listener(before.clone());
        fanout.add_listener(Arc::new(Panicker));
        fanout.add_listener(after.clone());

        fanout.notify(&MetricEvent::new(
            WriteKind::EntitiesAdded,
            1,
            Duration::ZERO,
            0,
        ));

        assert_eq!(before.seen.lock().unwrap().len(), 1);
        assert_eq!(after.seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn no_listeners_is_fine() {
        let fanout = MetricFanout::new();
        assert!(fanout.is_empty());
        fanout.notify(&MetricEvent::empty(WriteKind::EntitiesRemoved));
    }
}
