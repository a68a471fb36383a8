//! Prometheus metrics for tool invocations, Linode API requests, caches,
//! account switches and resource counts.
//!
//! A [`Metrics`] instance owns its own [`Registry`]. When built with
//! `enabled = false` every recording call is a no-op, but timers and the
//! middleware keep working so callers never need to branch.

use cloudmcp_linode::{RequestObserver, RequestSpan};
use prometheus::proto::MetricFamily;
use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::{Duration, Instant};

/// Metric name prefix.
const PREFIX: &str = "cloudmcp";

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Metrics collector.
///
/// Cloning is cheap; clones record into the same collectors.
#[derive(Clone)]
pub struct Metrics {
    enabled: bool,
    registry: Registry,
    tool_duration: HistogramVec,
    tool_total: CounterVec,
    api_duration: HistogramVec,
    api_requests: CounterVec,
    cache_hits: CounterVec,
    cache_misses: CounterVec,
    account_switches: CounterVec,
    active_connections: GaugeVec,
    resources: GaugeVec,
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics")
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Metrics {
    /// Create collectors in a fresh registry and register them.
    pub fn new(enabled: bool) -> Self {
        Self::with_registry(enabled, Registry::new())
    }

    /// Create collectors and register them in `registry`.
    pub fn with_registry(enabled: bool, registry: Registry) -> Self {
        let metrics = Self {
            enabled,
            registry,
            tool_duration: HistogramVec::new(
                HistogramOpts::new(
                    format!("{PREFIX}_tool_execution_duration_seconds"),
                    "Duration of tool executions in seconds",
                ),
                &["tool", "account", "status"],
            )
            .expect("Failed to create tool_execution_duration_seconds metric"),
            tool_total: CounterVec::new(
                Opts::new(
                    format!("{PREFIX}_tool_execution_total"),
                    "Total number of tool executions",
                ),
                &["tool", "account", "status"],
            )
            .expect("Failed to create tool_execution_total metric"),
            api_duration: HistogramVec::new(
                HistogramOpts::new(
                    format!("{PREFIX}_linode_api_duration_seconds"),
                    "Duration of Linode API requests in seconds",
                ),
                &["method", "endpoint", "status"],
            )
            .expect("Failed to create linode_api_duration_seconds metric"),
            api_requests: CounterVec::new(
                Opts::new(
                    format!("{PREFIX}_linode_api_requests_total"),
                    "Total number of Linode API requests",
                ),
                &["method", "endpoint", "status"],
            )
            .expect("Failed to create linode_api_requests_total metric"),
            cache_hits: CounterVec::new(
                Opts::new(format!("{PREFIX}_cache_hits_total"), "Total cache hits"),
                &["cache_type", "account"],
            )
            .expect("Failed to create cache_hits_total metric"),
            cache_misses: CounterVec::new(
                Opts::new(format!("{PREFIX}_cache_misses_total"), "Total cache misses"),
                &["cache_type", "account"],
            )
            .expect("Failed to create cache_misses_total metric"),
            account_switches: CounterVec::new(
                Opts::new(
                    format!("{PREFIX}_account_switches_total"),
                    "Total number of account switches",
                ),
                &["from_account", "to_account", "status"],
            )
            .expect("Failed to create account_switches_total metric"),
            active_connections: GaugeVec::new(
                Opts::new(
                    format!("{PREFIX}_active_connections"),
                    "Tool invocations currently running per account",
                ),
                &["account"],
            )
            .expect("Failed to create active_connections metric"),
            resources: GaugeVec::new(
                Opts::new(
                    format!("{PREFIX}_resources"),
                    "Number of resources per type and account",
                ),
                &["resource_type", "account"],
            )
            .expect("Failed to create resources metric"),
        };
        metrics.register();
        metrics
    }

    /// Register every collector. Safe to call more than once.
    pub fn register(&self) {
        let collectors: [Box<dyn prometheus::core::Collector>; 9] = [
            Box::new(self.tool_duration.clone()),
            Box::new(self.tool_total.clone()),
            Box::new(self.api_duration.clone()),
            Box::new(self.api_requests.clone()),
            Box::new(self.cache_hits.clone()),
            Box::new(self.cache_misses.clone()),
            Box::new(self.account_switches.clone()),
            Box::new(self.active_connections.clone()),
            Box::new(self.resources.clone()),
        ];
        for collector in collectors {
            match self.registry.register(collector) {
                Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
                Err(e) => tracing::warn!(error = %e, "Failed to register metric"),
            }
        }
    }

    /// Whether recording is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The registry holding the collectors.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_tool_execution(
        &self,
        tool: &str,
        account: &str,
        status: &str,
        duration: Duration,
    ) {
        if !self.enabled {
            return;
        }
        let labels = [tool, account, status];
        if let Some(h) = label_or_warn(self.tool_duration.get_metric_with_label_values(&labels)) {
            h.observe(duration.as_secs_f64());
        }
        if let Some(c) = label_or_warn(self.tool_total.get_metric_with_label_values(&labels)) {
            c.inc();
        }
    }

    pub fn record_api_request(
        &self,
        method: &str,
        endpoint: &str,
        status: &str,
        duration: Duration,
    ) {
        if !self.enabled {
            return;
        }
        let labels = [method, endpoint, status];
        if let Some(h) = label_or_warn(self.api_duration.get_metric_with_label_values(&labels)) {
            h.observe(duration.as_secs_f64());
        }
        if let Some(c) = label_or_warn(self.api_requests.get_metric_with_label_values(&labels)) {
            c.inc();
        }
    }

    pub fn record_cache_hit(&self, cache_type: &str, account: &str) {
        if !self.enabled {
            return;
        }
        if let Some(c) =
            label_or_warn(self.cache_hits.get_metric_with_label_values(&[cache_type, account]))
        {
            c.inc();
        }
    }

    pub fn record_cache_miss(&self, cache_type: &str, account: &str) {
        if !self.enabled {
            return;
        }
        if let Some(c) =
            label_or_warn(self.cache_misses.get_metric_with_label_values(&[cache_type, account]))
        {
            c.inc();
        }
    }

    pub fn record_account_switch(&self, from: &str, to: &str, status: &str) {
        if !self.enabled {
            return;
        }
        if let Some(c) =
            label_or_warn(self.account_switches.get_metric_with_label_values(&[from, to, status]))
        {
            c.inc();
        }
    }

    pub fn update_active_connections(&self, account: &str, count: i64) {
        if !self.enabled {
            return;
        }
        if let Some(g) =
            label_or_warn(self.active_connections.get_metric_with_label_values(&[account]))
        {
            g.set(count as f64);
        }
    }

    pub fn update_resource_count(&self, resource_type: &str, account: &str, count: usize) {
        if !self.enabled {
            return;
        }
        if let Some(g) =
            label_or_warn(self.resources.get_metric_with_label_values(&[resource_type, account]))
        {
            g.set(count as f64);
        }
    }

    /// Count one more running invocation for `account` until the guard drops.
    pub fn track_connection(&self, account: &str) -> ConnectionGuard {
        let gauge = if self.enabled {
            label_or_warn(self.active_connections.get_metric_with_label_values(&[account]))
        } else {
            None
        };
        if let Some(g) = &gauge {
            g.inc();
        }
        ConnectionGuard { gauge }
    }

    /// Start timing a tool execution.
    pub fn tool_timer(&self, tool: &str, account: &str) -> ToolTimer {
        ToolTimer {
            metrics: self.clone(),
            tool: tool.to_string(),
            account: account.to_string(),
            start: Instant::now(),
        }
    }

    /// Start timing a Linode API request.
    pub fn api_timer(&self, method: &str, endpoint: &str) -> ApiTimer {
        ApiTimer {
            metrics: self.clone(),
            method: method.to_string(),
            endpoint: endpoint.to_string(),
            start: Instant::now(),
        }
    }

    /// Encode every collector in the Prometheus text format.
    pub fn gather_text(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            tracing::warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }

    /// Sum of the counter samples named `name` whose labels include all of
    /// `labels`.
    pub fn counter_value(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.matching(name, labels)
            .map(|m| m.get_counter().get_value())
            .sum()
    }

    /// Sum of the gauge samples named `name` whose labels include all of
    /// `labels`.
    pub fn gauge_value(&self, name: &str, labels: &[(&str, &str)]) -> f64 {
        self.matching(name, labels)
            .map(|m| m.get_gauge().get_value())
            .sum()
    }

    /// Total observation count of the histogram samples named `name` whose
    /// labels include all of `labels`.
    pub fn histogram_count(&self, name: &str, labels: &[(&str, &str)]) -> u64 {
        self.matching(name, labels)
            .map(|m| m.get_histogram().get_sample_count())
            .sum()
    }

    fn matching(
        &self,
        name: &str,
        labels: &[(&str, &str)],
    ) -> impl Iterator<Item = prometheus::proto::Metric> {
        let wanted: Vec<(String, String)> = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        self.registry
            .gather()
            .into_iter()
            .filter(move |family: &MetricFamily| family.get_name() == name)
            .flat_map(|mut family| family.take_metric().into_iter())
            .filter(move |metric| {
                wanted.iter().all(|(k, v)| {
                    metric
                        .get_label()
                        .iter()
                        .any(|pair| pair.get_name() == k && pair.get_value() == v)
                })
            })
    }
}

fn label_or_warn<T>(result: prometheus::Result<T>) -> Option<T> {
    match result {
        Ok(metric) => Some(metric),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid metric label set");
            None
        }
    }
}

/// Times one tool execution.
pub struct ToolTimer {
    metrics: Metrics,
    tool: String,
    account: String,
    start: Instant,
}

impl ToolTimer {
    /// Emit one observation with the elapsed time.
    pub fn finish(self, status: &str) {
        self.metrics.record_tool_execution(
            &self.tool,
            &self.account,
            status,
            self.start.elapsed(),
        );
    }
}

/// Times one Linode API request.
pub struct ApiTimer {
    metrics: Metrics,
    method: String,
    endpoint: String,
    start: Instant,
}

impl ApiTimer {
    /// Emit one observation with the elapsed time.
    pub fn finish(self, status: &str) {
        self.metrics.record_api_request(
            &self.method,
            &self.endpoint,
            status,
            self.start.elapsed(),
        );
    }
}

impl RequestSpan for ApiTimer {
    fn finish(self: Box<Self>, status: &str) {
        ApiTimer::finish(*self, status);
    }
}

impl RequestObserver for Metrics {
    fn begin(&self, method: &str, endpoint: &str) -> Box<dyn RequestSpan> {
        Box::new(self.api_timer(method, endpoint))
    }
}

/// Decrements the active connection gauge on drop.
pub struct ConnectionGuard {
    gauge: Option<prometheus::Gauge>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if let Some(g) = &self.gauge {
            g.dec();
        }
    }
}
