use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tracing::info;
use std::sync::Arc;
use tokio::sync::OnceCell;


// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE.get_or_init(|| async {
        info!("Initializing Metrics ...");
        Metrics::new()}
    ).await
}

/// Renders every registered metric in the Prometheus text format.
pub async fn encode_text() -> String {
    let metrics = get_metrics().await;
    let mut buffer = Vec::new();
    if let Err(err) = TextEncoder::new().encode(&metrics.registry.gather(), &mut buffer) {
        tracing::warn!("metrics encoding failed: {}", err);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}


#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Token source metrics
    pub token_refresh_total: IntCounterVec,
    pub token_refresh_duration: HistogramVec,
    pub token_cache_hits: IntCounter,

    // SCIM client metrics
    pub scim_requests_total: IntCounterVec,
    pub scim_request_duration: HistogramVec,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("scimtoken".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Token source
            token_refresh_total: IntCounterVec::new(Opts::new("token_refresh_total", "Token endpoint round trips by strategy and outcome"),&["strategy", "outcome"],).unwrap(),
            token_refresh_duration: HistogramVec::new(HistogramOpts::new("token_refresh_duration_seconds", "Token endpoint round trip seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["strategy"],).unwrap(),
            token_cache_hits: IntCounter::new("token_cache_hits_total", "Valid tokens served from cache").unwrap(),

            // SCIM
            scim_requests_total: IntCounterVec::new(Opts::new("scim_requests_total", "SCIM requests by method and response status"),&["method", "status"],).unwrap(),
            scim_request_duration: HistogramVec::new(HistogramOpts::new("scim_request_duration_seconds", "SCIM request seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),&["method"],).unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.token_refresh_total.clone())).unwrap();
        reg.register(Box::new(metrics.token_refresh_duration.clone())).unwrap();
        reg.register(Box::new(metrics.token_cache_hits.clone())).unwrap();
        reg.register(Box::new(metrics.scim_requests_total.clone())).unwrap();
        reg.register(Box::new(metrics.scim_request_duration.clone())).unwrap();

        metrics
    }
}
