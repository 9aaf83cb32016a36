//! Metrics collection and export module

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Instant;

/// Global metrics registry
pub struct Metrics {
    registry: Registry,

    // API calls, labelled by surface (storefront/admin)
    pub api_requests: IntCounterVec,
    pub api_errors: IntCounterVec,
    pub api_latency: HistogramVec,

    pub checkouts_created: IntCounter,
    pub checkouts_failed: IntCounter,

    pub import_rows_ok: IntCounter,
    pub import_rows_failed: IntCounter,

    pub uploads_ok: IntCounter,
    pub uploads_failed: IntCounter,

    pub admin_logins: IntCounterVec,
}

impl Metrics {
    /// Create new metrics instance
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let api_requests = IntCounterVec::new(
            Opts::new("shopify_api_requests_total", "GraphQL requests sent to Shopify"),
            &["surface"],
        )?;

        let api_errors = IntCounterVec::new(
            Opts::new("shopify_api_errors_total", "GraphQL requests that failed"),
            &["surface"],
        )?;

        let api_latency = HistogramVec::new(
            HistogramOpts::new("shopify_api_latency_seconds", "GraphQL request latency")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["surface"],
        )?;

        let checkouts_created = IntCounter::with_opts(Opts::new(
            "checkouts_created_total",
            "Checkout URLs obtained from the storefront",
        ))?;

        let checkouts_failed =
            IntCounter::with_opts(Opts::new("checkouts_failed_total", "Failed checkout attempts"))?;

        let import_rows_ok =
            IntCounter::with_opts(Opts::new("import_rows_ok_total", "CSV rows imported"))?;

        let import_rows_failed = IntCounter::with_opts(Opts::new(
            "import_rows_failed_total",
            "CSV rows rejected or failed on the platform",
        ))?;

        let uploads_ok = IntCounter::with_opts(Opts::new("media_uploads_ok_total", "Images attached"))?;

        let uploads_failed =
            IntCounter::with_opts(Opts::new("media_uploads_failed_total", "Image uploads that failed"))?;

        let admin_logins = IntCounterVec::new(
            Opts::new("admin_logins_total", "Admin login attempts"),
            &["outcome"],
        )?;

        registry.register(Box::new(api_requests.clone()))?;
        registry.register(Box::new(api_errors.clone()))?;
        registry.register(Box::new(api_latency.clone()))?;
        registry.register(Box::new(checkouts_created.clone()))?;
        registry.register(Box::new(checkouts_failed.clone()))?;
        registry.register(Box::new(import_rows_ok.clone()))?;
        registry.register(Box::new(import_rows_failed.clone()))?;
        registry.register(Box::new(uploads_ok.clone()))?;
        registry.register(Box::new(uploads_failed.clone()))?;
        registry.register(Box::new(admin_logins.clone()))?;

        Ok(Self {
            registry,
            api_requests,
            api_errors,
            api_latency,
            checkouts_created,
            checkouts_failed,
            import_rows_ok,
            import_rows_failed,
            uploads_ok,
            uploads_failed,
            admin_logins,
        })
    }

    /// Get the registry for exporting
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every metric in the Prometheus text format
    pub fn export_text(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Global metrics instance
pub fn metrics() -> &'static Metrics {
    static METRICS: once_cell::sync::Lazy<Metrics> =
        once_cell::sync::Lazy::new(|| Metrics::new().expect("Failed to initialize metrics"));
    &METRICS
}

/// Timer helper for measuring API call duration
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Record the elapsed time under `surface`
    pub fn finish(self, surface: &str) {
        metrics()
            .api_latency
            .with_label_values(&[surface])
            .observe(self.elapsed_secs());
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
