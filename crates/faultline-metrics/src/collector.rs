//! Latency collector

use dashmap::DashMap;
use http::Method;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Label set of one latency series.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesKey {
    /// HTTP method
    pub method: Method,
    /// Request path
    pub path: String,
    /// Response status code
    pub status: u16,
}

/// Fixed-bucket latency histogram for one label set.
#[derive(Debug)]
struct SeriesStats {
    /// Per-bucket observation counts (non-cumulative; summed at export)
    bucket_counts: Vec<AtomicU64>,
    count: AtomicU64,
    sum_ns: AtomicU64,
}

impl SeriesStats {
    fn new(bucket_len: usize) -> Self {
        Self {
            bucket_counts: (0..bucket_len).map(|_| AtomicU64::new(0)).collect(),
            count: AtomicU64::new(0),
            sum_ns: AtomicU64::new(0),
        }
    }

    fn record(&self, buckets: &[f64], latency: Duration) {
        let seconds = latency.as_secs_f64();

        if let Some(i) = buckets.iter().position(|&upper| seconds <= upper) {
            self.bucket_counts[i].fetch_add(1, Ordering::Relaxed);
        }

        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum_ns
            .fetch_add(latency.as_nanos() as u64, Ordering::Relaxed);
    }
}

/// Snapshot of one series, as read at export time.
#[derive(Debug, Clone)]
pub(crate) struct SeriesSnapshot {
    pub(crate) key: SeriesKey,
    /// Cumulative counts per bucket boundary
    pub(crate) cumulative: Vec<u64>,
    pub(crate) count: u64,
    pub(crate) sum_seconds: f64,
}

/// Collector of per-(method, path, status) latency histograms.
///
/// Safe under concurrent recording from all in-flight requests; series
/// are created on first observation.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    /// Histogram bucket upper bounds, in seconds, strictly increasing
    buckets: Arc<Vec<f64>>,
    series: Arc<DashMap<SeriesKey, Arc<SeriesStats>>>,
    total_requests: Arc<AtomicU64>,
}

impl MetricsCollector {
    /// Create a collector with the given bucket boundaries (seconds).
    pub fn new(buckets: Vec<f64>) -> Self {
        Self {
            buckets: Arc::new(buckets),
            series: Arc::new(DashMap::new()),
            total_requests: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Record one request observation.
    pub fn record(&self, method: Method, path: &str, status: u16, latency: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);

        let key = SeriesKey {
            method,
            path: path.to_string(),
            status,
        };

        let stats = self
            .series
            .entry(key)
            .or_insert_with(|| Arc::new(SeriesStats::new(self.buckets.len())))
            .clone();

        stats.record(&self.buckets, latency);
    }

    /// Total recorded requests across all series.
    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    /// Number of distinct label sets observed.
    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Total observations recorded for one label set.
    pub fn series_observations(&self, method: &Method, path: &str, status: u16) -> u64 {
        let key = SeriesKey {
            method: method.clone(),
            path: path.to_string(),
            status,
        };
        self.series
            .get(&key)
            .map(|s| s.count.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Bucket boundaries, in seconds.
    pub(crate) fn buckets(&self) -> &[f64] {
        &self.buckets
    }

    /// Read a consistent-enough view of every series for export.
    pub(crate) fn snapshot(&self) -> Vec<SeriesSnapshot> {
        let mut out: Vec<SeriesSnapshot> = self
            .series
            .iter()
            .map(|entry| {
                let stats = entry.value();

                let mut cumulative = Vec::with_capacity(self.buckets.len());
                let mut running = 0u64;
                for bucket in &stats.bucket_counts {
                    running += bucket.load(Ordering::Relaxed);
                    cumulative.push(running);
                }

                SeriesSnapshot {
                    key: entry.key().clone(),
                    cumulative,
                    count: stats.count.load(Ordering::Relaxed),
                    sum_seconds: stats.sum_ns.load(Ordering::Relaxed) as f64 / 1e9,
                }
            })
            .collect();

        // Deterministic export order.
        out.sort_by(|a, b| {
            (a.key.path.as_str(), a.key.method.as_str(), a.key.status).cmp(&(
                b.key.path.as_str(),
                b.key.method.as_str(),
                b.key.status,
            ))
        });

        out
    }
}
