//! Requests waiting for the worker, keyed by correlation id

use longtext_core::{types::ProgressEvent, LongtextError};
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;

/// Receives progress events for one request
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync>;

/// A successful terminal message, still undecoded
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub result: Value,
    /// Milliseconds the worker spent computing
    pub processing_time: f64,
    pub accelerated: bool,
}

pub type Reply = Result<Completion, LongtextError>;

struct Entry {
    reply: oneshot::Sender<Reply>,
    progress: Option<ProgressCallback>,
}

/// In-flight requests
///
/// Ids are handed out in increasing order starting at 1 and never reused.
pub struct PendingTable {
    next_id: AtomicU64,
    entries: Mutex<HashMap<u64, Entry>>,
}

impl Default for PendingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl PendingTable {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Record a request and get the receiving end of its reply
    pub fn register(&self, id: u64, progress: Option<ProgressCallback>) -> oneshot::Receiver<Reply> {
        let (reply, rx) = oneshot::channel();
        self.entries.lock().insert(id, Entry { reply, progress });
        rx
    }

    /// Deliver the terminal reply for `id`; false if nobody is waiting
    pub fn resolve(&self, id: u64, reply: Reply) -> bool {
        let entry = self.entries.lock().remove(&id);
        match entry {
            // The waiter may have given up already; that is the same as a late reply
            Some(entry) => entry.reply.send(reply).is_ok(),
            None => false,
        }
    }

    /// Progress callback of a live request
    pub fn progress(&self, id: u64) -> Option<ProgressCallback> {
        self.entries.lock().get(&id).and_then(|e| e.progress.clone())
    }

    /// Forget a request without replying; false if it was already gone
    pub fn remove(&self, id: u64) -> bool {
        self.entries.lock().remove(&id).is_some()
    }

    /// Removes `id` when dropped, so an abandoned wait leaves nothing behind
    pub fn guard(&self, id: u64) -> PendingGuard<'_> {
        PendingGuard { table: self, id }
    }

    /// Reject every pending request, returning how many there were
    pub fn fail_all(&self, error: impl Fn() -> LongtextError) -> usize {
        let drained: Vec<Entry> = self.entries.lock().drain().map(|(_, e)| e).collect();
        let count = drained.len();
        for entry in drained {
            let _ = entry.reply.send(Err(error()));
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

/// See [`PendingTable::guard`]
pub struct PendingGuard<'a> {
    table: &'a PendingTable,
    id: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.table.remove(self.id) {
            log::debug!("Request {} abandoned before its reply", self.id);
        }
    }
}
