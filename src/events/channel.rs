//! Job event channel over crossbeam-channel.

use super::ScanEvent;
use crossbeam_channel::{Receiver, Sender};

/// Sending half, cloned into every scan worker.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<ScanEvent>,
}

impl EventSender {
    /// Deliver `event`. A dropped receiver is not an error for the job.
    pub fn send(&self, event: ScanEvent) {
        let _ = self.inner.send(event);
    }
}

/// Receiving half, held by whoever renders progress.
pub struct EventReceiver {
    inner: Receiver<ScanEvent>,
}

impl EventReceiver {
    /// Blocks for each event; ends once every sender (registry and workers) is gone
    pub fn iter(&self) -> impl Iterator<Item = ScanEvent> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    pub fn new() -> (EventSender, EventReceiver) {
        Self::wrap(crossbeam_channel::unbounded())
    }

    /// Workers block once `capacity` events are queued, so a slow consumer
    /// slows the scan instead of growing memory.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        Self::wrap(crossbeam_channel::bounded(capacity))
    }

    fn wrap((sender, receiver): (Sender<ScanEvent>, Receiver<ScanEvent>)) -> (EventSender, EventReceiver) {
        (
            EventSender { inner: sender },
            EventReceiver { inner: receiver },
        )
    }
}
