//! Event observers notified for every committed mutation.

use crate::models::event::Event;
use crossbeam_channel::Sender;

/// Receives each committed [`Event`] exactly once, in commit order.
pub trait EventObserver: Send {
    fn notify(&mut self, event: &Event);

    /// Closed observers are dropped by the engine after the current event.
    fn is_closed(&self) -> bool {
        false
    }
}

impl<F> EventObserver for F
where
    F: FnMut(&Event) + Send,
{
    fn notify(&mut self, event: &Event) {
        self(event)
    }
}

/// Forwards events into a channel; closes once the receiver is gone.
pub(crate) struct ChannelObserver {
    tx: Sender<Event>,
    closed: bool,
}

impl ChannelObserver {
    pub(crate) fn new(tx: Sender<Event>) -> Self {
        Self { tx, closed: false }
    }
}

impl EventObserver for ChannelObserver {
    fn notify(&mut self, event: &Event) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!("event subscriber disconnected");
            self.closed = true;
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
