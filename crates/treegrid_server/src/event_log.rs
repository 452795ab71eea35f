//! Bounded in-memory record of committed events, exposed over `GET /api/events`.

use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Mutex;
use treegrid_core::Event;

/// One retained event with its server-assigned sequence number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoggedEvent {
    pub seq: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[derive(Debug, Default)]
struct Entries {
    last_seq: u64,
    events: VecDeque<LoggedEvent>,
}

/// Keeps the most recent `limit` events. Sequence numbers start at 1 and
/// never repeat, even after old entries are evicted.
#[derive(Debug)]
pub struct EventLog {
    limit: usize,
    entries: Mutex<Entries>,
}

impl EventLog {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: Mutex::new(Entries::default()),
        }
    }

    /// Append an event, evicting the oldest once the limit is reached.
    pub fn record(&self, event: &Event) {
        let Ok(mut entries) = self.entries.lock() else {
            tracing::error!(event_id = %event.id, "event log lock poisoned; dropping event");
            return;
        };
        entries.last_seq += 1;
        let seq = entries.last_seq;
        entries.events.push_back(LoggedEvent {
            seq,
            event: event.clone(),
        });
        while entries.events.len() > self.limit {
            entries.events.pop_front();
        }
    }

    /// Retained events with a sequence number greater than `since`.
    pub fn since(&self, since: u64) -> Vec<LoggedEvent> {
        self.entries
            .lock()
            .map(|entries| {
                entries
                    .events
                    .iter()
                    .filter(|entry| entry.seq > since)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Sequence number of the newest event (0 before the first one).
    pub fn last_seq(&self) -> u64 {
        self.entries
            .lock()
            .map(|entries| entries.last_seq)
            .unwrap_or_default()
    }
}
