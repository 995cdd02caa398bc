//! Hand-off point between fetch workers and the UI poller.
//!
//! An unbounded FIFO: the worker side never blocks on send, the UI side only
//! ever asks "is anything there right now". In normal operation at most one
//! message is in flight, but overlapping fetches simply queue behind each
//! other.

use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::model::FetchResult;

/// Create a connected sender/receiver pair.
pub fn result_channel() -> (ResultSender, ResultReceiver) {
    let (tx, rx) = unbounded();
    (ResultSender(tx), ResultReceiver(rx))
}

/// Worker-side handle. Cloneable so each spawned fetch gets its own.
#[derive(Debug, Clone)]
pub struct ResultSender(Sender<FetchResult>);

impl ResultSender {
    /// Push one result. Returns false when the UI side is gone, which a
    /// worker treats as "nobody cares anymore".
    pub fn send(&self, result: FetchResult) -> bool {
        self.0.send(result).is_ok()
    }
}

/// UI-side handle.
#[derive(Debug)]
pub struct ResultReceiver(Receiver<FetchResult>);

impl ResultReceiver {
    /// Non-blocking receive: `None` when nothing is waiting.
    pub fn try_recv(&self) -> Option<FetchResult> {
        self.0.try_recv().ok()
    }
}
