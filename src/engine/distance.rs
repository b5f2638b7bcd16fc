use std::time::Instant;

use tracing::{error, info, warn};

use crate::models::place::GeoPoint;
use crate::observability::metrics::Metrics;
use crate::providers::DistanceSource;

const OPERATION: &str = "driving_distance";

/// Driving distance through an ordered chain of matrix providers. Stages run
/// one after another; a stage is only called once the previous one has
/// failed or answered zero.
pub struct DistanceResolver {
    sources: Vec<Box<dyn DistanceSource>>,
    metrics: Metrics,
}

impl DistanceResolver {
    pub fn new(sources: Vec<Box<dyn DistanceSource>>, metrics: Metrics) -> Self {
        Self { sources, metrics }
    }

    /// Kilometres between the two points, unrounded. Returns `0.0` when every
    /// stage fails.
    pub async fn resolve(&self, start: &GeoPoint, end: &GeoPoint) -> f64 {
        let last_stage = self.sources.len().saturating_sub(1);

        for (stage, source) in self.sources.iter().enumerate() {
            let started = Instant::now();
            let result = source.attempt(start, end).await;
            let elapsed = started.elapsed().as_secs_f64();

            match result {
                Ok(km) if km != 0.0 || stage == last_stage => {
                    self.metrics
                        .observe_attempt(OPERATION, source.name(), "success", elapsed);
                    return km;
                }
                Ok(_) => {
                    self.metrics
                        .observe_attempt(OPERATION, source.name(), "zero", elapsed);
                    info!(provider = source.name(), "distance provider answered zero");
                }
                Err(err) => {
                    self.metrics
                        .observe_attempt(OPERATION, source.name(), "error", elapsed);
                    warn!(provider = source.name(), error = %err, "distance provider failed");
                }
            }

            if stage < last_stage {
                self.metrics
                    .provider_fallbacks_total
                    .with_label_values(&[OPERATION])
                    .inc();
            }
        }

        error!(
            start = %start.lat_lng(),
            end = %end.lat_lng(),
            "driving distance unavailable from every provider"
        );
        0.0
    }
}
