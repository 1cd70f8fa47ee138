//! Query timing records.
//!
//! Each timed store operation produces one [`BenchRecord`]. It is written as a
//! single JSON line to the [`TARGET`] log target at trace level and, while a
//! [`Capture`] is alive on the current thread, also kept in memory so tests can
//! inspect what was timed without going through the global logger.

use serde::Serialize;
use std::cell::RefCell;

/// Log target of the JSON timing lines.
pub const TARGET: &str = "tourlite::bench";

/// One timed store operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchRecord {
    pub bench: &'static str,
    pub op: &'static str,
    pub collection: String,
    pub duration_ms: u64,
    pub result_count: usize,
    pub slow: bool,
}

impl BenchRecord {
    #[must_use]
    pub fn query(op: &'static str, collection: &str, duration_ms: u64, result_count: usize, slow: bool) -> Self {
        Self { bench: "query", op, collection: collection.to_string(), duration_ms, result_count, slow }
    }

    /// Compact JSON form, as written to the log.
    #[must_use]
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"bench\":\"query\",\"error\":\"{e}\"}}"))
    }
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<BenchRecord>>> = const { RefCell::new(None) };
}

/// Keeps records emitted on this thread until dropped.
#[derive(Debug)]
pub struct Capture(());

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

/// Starts capturing on the current thread, discarding anything captured before.
#[must_use]
pub fn capture() -> Capture {
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    Capture(())
}

/// Logs `record` and keeps it if this thread is capturing.
pub fn emit(record: BenchRecord) {
    log::trace!(target: TARGET, "{}", record.to_line());
    CAPTURED.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(record);
        }
    });
}

/// Removes and returns the records captured so far on this thread.
pub fn take() -> Vec<BenchRecord> {
    CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
}
