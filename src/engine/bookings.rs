use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::backend::{BookingBackend, PackageRequest, RatingRequest, RideRequest, Session};
use crate::engine::normalizer::{normalize_draft, normalize_packages, normalize_rides};
use crate::engine::selector::{partition, pick_latest, BookingView, LatestBooking};
use crate::models::booking::{CanonicalBooking, DraftBooking, PackageBooking};
use crate::observability::metrics::Metrics;

#[derive(Debug, Clone, Serialize)]
pub struct BookingSnapshot {
    pub latest: Option<LatestBooking>,
    pub singles: Vec<CanonicalBooking>,
    pub packages: Vec<PackageBooking>,
}

/// Fetches, normalizes and reduces a customer's bookings. Submissions report
/// a plain success flag; failures are logged here and left for the UI to
/// surface.
pub struct BookingService {
    backend: Arc<dyn BookingBackend>,
    metrics: Metrics,
}

impl BookingService {
    pub fn new(backend: Arc<dyn BookingBackend>, metrics: Metrics) -> Self {
        Self { backend, metrics }
    }

    /// Both lists are requested together. A list that fails to load counts
    /// as empty so the other one can still be shown.
    pub async fn refresh(&self, session: &Session) -> BookingSnapshot {
        let (rides, packages) = tokio::join!(
            self.backend.list_rides(session),
            self.backend.list_package_rides(session)
        );

        let singles = match rides {
            Ok(values) => normalize_rides(values),
            Err(err) => {
                warn!(customer_id = %session.customer_id, error = %err, "failed to load rides");
                Vec::new()
            }
        };
        let packages = match packages {
            Ok(values) => normalize_packages(values),
            Err(err) => {
                warn!(customer_id = %session.customer_id, error = %err, "failed to load package rides");
                Vec::new()
            }
        };

        BookingSnapshot {
            latest: pick_latest(&singles, &packages),
            singles,
            packages,
        }
    }

    pub async fn latest(&self, session: &Session) -> Option<LatestBooking> {
        self.refresh(session).await.latest
    }

    pub async fn view(
        &self,
        session: &Session,
        view: BookingView,
        draft: Option<DraftBooking>,
    ) -> Vec<CanonicalBooking> {
        let snapshot = self.refresh(session).await;
        let draft = draft.map(|draft| normalize_draft(draft, Utc::now()));
        partition(&snapshot.singles, view, draft.as_ref())
    }

    pub async fn submit_ride(&self, session: &Session, draft: DraftBooking) -> bool {
        let booking = normalize_draft(draft, Utc::now());
        let request = RideRequest::new(session, &booking);
        let result = self.backend.book_ride(session, &request).await;
        self.record("book_ride", session, result.map_err(|err| err.to_string()))
    }

    pub async fn submit_package(&self, session: &Session, mut request: PackageRequest) -> bool {
        request.customer = session.customer_id.clone();
        let result = self.backend.book_package(session, &request).await;
        self.record("book_package", session, result.map_err(|err| err.to_string()))
    }

    pub async fn rate(&self, session: &Session, booking_id: &str, rating: RatingRequest) -> bool {
        let result = self.backend.rate_booking(session, booking_id, &rating).await;
        self.record("rate_booking", session, result.map_err(|err| err.to_string()))
    }

    fn record(&self, action: &str, session: &Session, result: Result<(), String>) -> bool {
        let outcome = if result.is_ok() { "success" } else { "error" };
        self.metrics
            .booking_submissions_total
            .with_label_values(&[action, outcome])
            .inc();

        match result {
            Ok(()) => {
                info!(action, customer_id = %session.customer_id, "booking service accepted request");
                true
            }
            Err(err) => {
                warn!(action, customer_id = %session.customer_id, error = %err, "booking service rejected request");
                false
            }
        }
    }
}
