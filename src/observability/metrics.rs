use prometheus::{HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub provider_attempts_total: IntCounterVec,
    pub provider_fallbacks_total: IntCounterVec,
    pub provider_latency_seconds: HistogramVec,
    pub booking_submissions_total: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let provider_attempts_total = IntCounterVec::new(
            Opts::new(
                "provider_attempts_total",
                "Map provider calls by operation, provider and outcome",
            ),
            &["operation", "provider", "outcome"],
        )
        .expect("valid provider_attempts_total metric");

        let provider_fallbacks_total = IntCounterVec::new(
            Opts::new(
                "provider_fallbacks_total",
                "Times a provider chain moved past its first stage",
            ),
            &["operation"],
        )
        .expect("valid provider_fallbacks_total metric");

        let provider_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "provider_latency_seconds",
                "Latency of a single provider stage in seconds",
            ),
            &["operation", "provider"],
        )
        .expect("valid provider_latency_seconds metric");

        let booking_submissions_total = IntCounterVec::new(
            Opts::new(
                "booking_submissions_total",
                "Booking backend submissions by action and outcome",
            ),
            &["action", "outcome"],
        )
        .expect("valid booking_submissions_total metric");

        registry
            .register(Box::new(provider_attempts_total.clone()))
            .expect("register provider_attempts_total");
        registry
            .register(Box::new(provider_fallbacks_total.clone()))
            .expect("register provider_fallbacks_total");
        registry
            .register(Box::new(provider_latency_seconds.clone()))
            .expect("register provider_latency_seconds");
        registry
            .register(Box::new(booking_submissions_total.clone()))
            .expect("register booking_submissions_total");

        Self {
            registry,
            provider_attempts_total,
            provider_fallbacks_total,
            provider_latency_seconds,
            booking_submissions_total,
        }
    }

    pub fn observe_attempt(&self, operation: &str, provider: &str, outcome: &str, seconds: f64) {
        self.provider_attempts_total
            .with_label_values(&[operation, provider, outcome])
            .inc();
        self.provider_latency_seconds
            .with_label_values(&[operation, provider])
            .observe(seconds);
    }

    /// Prometheus text exposition of every registered family.
    pub fn encode(&self) -> Result<String, String> {
        TextEncoder::new()
            .encode_to_string(&self.registry.gather())
            .map_err(|err| format!("failed to encode metrics: {err}"))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
