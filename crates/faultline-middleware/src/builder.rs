//! Pipeline builder
//!
//! Assembles the ordered middleware stack once at startup. Push order is
//! execution order; the methods are expected to be called so that
//! measurement elements (logging, metrics, tracing) come before the
//! fault-injecting elements (delay, then error).

use crate::{
    DelayMiddleware, ErrorMiddleware, MetricsMiddleware, RequestLogger, TraceMiddleware,
};
use faultline_core::{IgnoreSet, Middleware};
use faultline_fault::{DelayStore, ErrorStore};
use faultline_metrics::MetricsCollector;
use std::sync::Arc;

/// Builder for the request pipeline.
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    elements: Vec<Arc<dyn Middleware>>,
}

impl PipelineBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
        }
    }

    /// Add the request logger.
    #[must_use]
    pub fn with_logging(mut self, ignore: IgnoreSet) -> Self {
        self.elements.push(Arc::new(RequestLogger::new(ignore)));
        self
    }

    /// Add the metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self, collector: MetricsCollector, ignore: IgnoreSet) -> Self {
        self.elements
            .push(Arc::new(MetricsMiddleware::new(collector, ignore)));
        self
    }

    /// Add the tracing span wrapper.
    #[must_use]
    pub fn with_tracing(mut self, ignore: IgnoreSet) -> Self {
        self.elements.push(Arc::new(TraceMiddleware::new(ignore)));
        self
    }

    /// Add delay injection.
    #[must_use]
    pub fn with_delay(
        mut self,
        store: Arc<DelayStore>,
        ignore: IgnoreSet,
        api_prefix: impl Into<String>,
        jitter_ignored_paths: bool,
    ) -> Self {
        self.elements.push(Arc::new(DelayMiddleware::new(
            store,
            ignore,
            api_prefix,
            jitter_ignored_paths,
        )));
        self
    }

    /// Add error injection. Must come after delay injection so that a
    /// request doomed to fail is still delayed first.
    #[must_use]
    pub fn with_error(
        mut self,
        store: Arc<ErrorStore>,
        ignore: IgnoreSet,
        api_prefix: impl Into<String>,
    ) -> Self {
        self.elements
            .push(Arc::new(ErrorMiddleware::new(store, ignore, api_prefix)));
        self
    }

    /// Number of elements added so far.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Whether no elements have been added.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Finalize the stack.
    pub fn build(self) -> Arc<[Arc<dyn Middleware>]> {
        Arc::from(self.elements)
    }
}
