//! Transfer notification hooks.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::Transfer;

/// Receives a notification for every committed transfer.
///
/// Observers are only ever called after the balances have been updated, so a
/// notification always describes state that is already visible to readers.
/// A panic inside `on_transfer` is caught and logged by the ledger and does
/// not undo the transfer.
pub trait TransferObserver: Send {
    fn on_transfer(&mut self, event: &Transfer);
}

impl<F> TransferObserver for F
where
    F: FnMut(&Transfer) + Send,
{
    fn on_transfer(&mut self, event: &Transfer) {
        self(event)
    }
}

/// Observer that records every notification it receives.
///
/// Clones share the same underlying log, so one clone can be subscribed to a
/// ledger while another is kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Transfer>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events, oldest first.
    pub fn events(&self) -> Vec<Transfer> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Remove and return all recorded events.
    pub fn drain(&self) -> Vec<Transfer> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Transfer>> {
        // poisoning only means another holder panicked; the Vec is never half-written
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TransferObserver for EventLog {
    fn on_transfer(&mut self, event: &Transfer) {
        self.lock().push(event.clone());
    }
}
