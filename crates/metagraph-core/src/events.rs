//! Metric events emitted after each committed write batch.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which write operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteKind {
    EntitiesAdded,
    EntitiesRemoved,
    RelationshipsAdded,
    RelationshipsRemoved,
}

impl fmt::Display for WriteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EntitiesAdded => "entities_added",
            Self::EntitiesRemoved => "entities_removed",
            Self::RelationshipsAdded => "relationships_added",
            Self::RelationshipsRemoved => "relationships_removed",
        };
        f.write_str(name)
    }
}

/// Outcome of one committed batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricEvent {
    pub kind: WriteKind,
    /// Number of records in the batch.
    pub count: usize,
    /// Wall-clock time across every attempt.
    pub elapsed: Duration,
    /// Retries consumed before the commit (0 = first attempt succeeded).
    pub retries: u32,
}

impl MetricEvent {
    pub fn new(kind: WriteKind, count: usize, elapsed: Duration, retries: u32) -> Self {
        Self {
            kind,
            count,
            elapsed,
            retries,
        }
    }

    /// Event reported for an empty batch that never reached the store.
    pub fn empty(kind: WriteKind) -> Self {
        Self::new(kind, 0, Duration::ZERO, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_event_is_zeroed() {
        let event = MetricEvent::empty(WriteKind::EntitiesAdded);
        assert_eq!(event.count, 0);
        assert_eq!(event.elapsed, Duration::ZERO);
        assert_eq!(event.retries, 0);
    }

    #[test]
    fn event_serialization_tags() {
        let event = MetricEvent::new(
            WriteKind::RelationshipsRemoved,
            3,
            Duration::from_millis(12),
            1,
        );
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"kind\":\"relationships_removed\""));
        assert_eq!(WriteKind::RelationshipsRemoved.to_string(), "relationships_removed");
    }
}
