use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::config::DEFAULT_SLOW_QUERY_MS;
use crate::devlog::{self, BenchRecord};

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub slow_query_ms: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { slow_query_ms: DEFAULT_SLOW_QUERY_MS }
    }
}

#[derive(Default)]
pub struct Metrics {
    pub queries_total: AtomicU64,
    pub queries_slow_total: AtomicU64,
    pub aggregations_total: AtomicU64,
    pub writes_total: AtomicU64,
}

#[derive(Default)]
pub struct Telemetry {
    pub cfg: RwLock<TelemetryConfig>,
    pub metrics: Metrics,
}

pub(crate) static TELEMETRY: std::sync::LazyLock<Telemetry> =
    std::sync::LazyLock::new(Telemetry::default);

pub fn set_slow_query_ms(ms: u64) {
    TELEMETRY.cfg.write().slow_query_ms = ms;
}

/// Kind of store operation being timed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Find,
    FindOne,
    Aggregate,
    Update,
    Delete,
}

impl OpKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Find => "find",
            Self::FindOne => "find_one",
            Self::Aggregate => "aggregate",
            Self::Update => "find_one_and_update",
            Self::Delete => "find_one_and_delete",
        }
    }
}

/// Start timestamp of one store call; finishing it records latency and never touches results.
#[derive(Debug)]
pub struct QueryTimer {
    op: OpKind,
    collection: String,
    started: Instant,
}

impl QueryTimer {
    #[must_use]
    pub fn start(op: OpKind, collection: &str) -> Self {
        Self { op, collection: collection.to_string(), started: Instant::now() }
    }

    /// Records latency for `result_count` returned documents.
    pub fn finish(self, result_count: usize) -> Duration {
        let elapsed = self.started.elapsed();
        let ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let m = &TELEMETRY.metrics;
        match self.op {
            OpKind::Aggregate => m.aggregations_total.fetch_add(1, Ordering::Relaxed),
            OpKind::Find | OpKind::FindOne | OpKind::Update | OpKind::Delete => {
                m.queries_total.fetch_add(1, Ordering::Relaxed)
            }
        };
        let slow_ms = TELEMETRY.cfg.read().slow_query_ms;
        let slow = ms >= slow_ms;
        if slow {
            m.queries_slow_total.fetch_add(1, Ordering::Relaxed);
            log::warn!(
                "slow {} on {}: {} ms ({} results)",
                self.op.as_str(),
                self.collection,
                ms,
                result_count
            );
        } else {
            log::debug!("Query took {ms} milliseconds");
        }
        devlog::emit(BenchRecord::query(self.op.as_str(), &self.collection, ms, result_count, slow));
        elapsed
    }
}

pub fn log_write(op: &str, collection: &str, doc_id: &str) {
    TELEMETRY.metrics.writes_total.fetch_add(1, Ordering::Relaxed);
    log::info!("{op} {collection}/{doc_id}");
}

/// Snapshot of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub queries_total: u64,
    pub queries_slow_total: u64,
    pub aggregations_total: u64,
    pub writes_total: u64,
}

#[must_use]
pub fn snapshot() -> MetricsSnapshot {
    let m = &TELEMETRY.metrics;
    MetricsSnapshot {
        queries_total: m.queries_total.load(Ordering::Relaxed),
        queries_slow_total: m.queries_slow_total.load(Ordering::Relaxed),
        aggregations_total: m.aggregations_total.load(Ordering::Relaxed),
        writes_total: m.writes_total.load(Ordering::Relaxed),
    }
}

#[must_use]
pub fn metrics_text() -> String {
    // OpenMetrics/Prometheus exposition format (no types/HELP for brevity)
    let s = snapshot();
    format!(
        "tourlite_queries_total {}\n\
         tourlite_queries_slow_total {}\n\
         tourlite_aggregations_total {}\n\
         tourlite_writes_total {}\n",
        s.queries_total, s.queries_slow_total, s.aggregations_total, s.writes_total
    )
}
