//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Feed Metrics
    pub static ref FEED_REQUESTS_TOTAL: IntCounter = IntCounter::new(
        "unifeed_feed_requests_total",
        "Total number of merged feed page requests"
    ).expect("metric can be created");
    pub static ref FEED_POSTS_RETURNED_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("unifeed_feed_posts_returned_total", "Total number of posts returned in merged feed pages"),
        &["post_type"]
    ).expect("metric can be created");
    pub static ref FEED_MERGE_DURATION_SECONDS: prometheus::Histogram = prometheus::Histogram::with_opts(
        HistogramOpts::new(
            "unifeed_feed_merge_duration_seconds",
            "Merged feed page assembly duration in seconds"
        ).buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0])
    ).expect("metric can be created");

    // Data-integrity Metrics
    pub static ref ORPHANED_POSTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("unifeed_orphaned_posts_total", "Total number of posts dropped because no owning profile resolved"),
        &["source"]
    ).expect("metric can be created");
}

/// Register all metrics with the global registry.
///
/// Call once at startup. Panics on double registration.
pub fn init_metrics() {
    REGISTRY
        .register(Box::new(FEED_REQUESTS_TOTAL.clone()))
        .expect("FEED_REQUESTS_TOTAL can be registered");
    REGISTRY
        .register(Box::new(FEED_POSTS_RETURNED_TOTAL.clone()))
        .expect("FEED_POSTS_RETURNED_TOTAL can be registered");
    REGISTRY
        .register(Box::new(FEED_MERGE_DURATION_SECONDS.clone()))
        .expect("FEED_MERGE_DURATION_SECONDS can be registered");
    REGISTRY
        .register(Box::new(ORPHANED_POSTS_TOTAL.clone()))
        .expect("ORPHANED_POSTS_TOTAL can be registered");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metrics_register_cleanly() {
        init_metrics();

        ORPHANED_POSTS_TOTAL.with_label_values(&["native"]).inc();
        FEED_REQUESTS_TOTAL.inc();

        let families = REGISTRY.gather();
        assert!(
            families
                .iter()
                .any(|f| f.get_name() == "unifeed_orphaned_posts_total")
        );
    }
}
