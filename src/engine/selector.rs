use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::booking::{BookingStatus, CanonicalBooking, PackageBooking};
use crate::models::wire::midnight_utc;

/// Sort key for "most recent" comparisons: creation time, else travel date
/// at midnight, else the Unix epoch.
pub trait Recency {
    fn recency(&self) -> DateTime<Utc>;
}

impl Recency for CanonicalBooking {
    fn recency(&self) -> DateTime<Utc> {
        // Normalization already folded the travel date and epoch fallbacks
        // into `created_at`.
        self.created_at
    }
}

impl Recency for PackageBooking {
    fn recency(&self) -> DateTime<Utc> {
        self.created_at
            .or_else(|| self.date_of_travel.map(midnight_utc))
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", content = "record", rename_all = "camelCase")]
pub enum LatestBooking {
    SingleTrip(CanonicalBooking),
    PackageTrip(PackageBooking),
}

/// Left fold keeping the later element on equal keys.
fn most_recent<T: Recency>(items: &[T]) -> Option<&T> {
    items.iter().fold(None, |best, item| match best {
        Some(current) if item.recency() < current.recency() => Some(current),
        _ => Some(item),
    })
}

/// Most recent booking across both products. A package only wins when it is
/// strictly newer than the newest single trip.
pub fn pick_latest(
    singles: &[CanonicalBooking],
    packages: &[PackageBooking],
) -> Option<LatestBooking> {
    match (most_recent(singles), most_recent(packages)) {
        (Some(single), Some(package)) => {
            if package.recency() > single.recency() {
                Some(LatestBooking::PackageTrip(package.clone()))
            } else {
                Some(LatestBooking::SingleTrip(single.clone()))
            }
        }
        (Some(single), None) => Some(LatestBooking::SingleTrip(single.clone())),
        (None, Some(package)) => Some(LatestBooking::PackageTrip(package.clone())),
        (None, None) => None,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingView {
    Current,
    Accepted,
    Pending,
}

impl FromStr for BookingView {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "current" => Ok(BookingView::Current),
            "accepted" => Ok(BookingView::Accepted),
            "pending" => Ok(BookingView::Pending),
            other => Err(format!(
                "unknown view: {other}, expected current/accepted/pending"
            )),
        }
    }
}

impl BookingView {
    fn admits(self, booking: &CanonicalBooking) -> bool {
        match self {
            BookingView::Current => booking.status == BookingStatus::Started,
            BookingView::Accepted => booking.is_confirmed,
            BookingView::Pending => !booking.is_confirmed,
        }
    }
}

/// Filters the active set for one toggle. The in-progress draft, when there
/// is one, is put in front before filtering. Closed bookings never show.
/// A started and confirmed ride appears under both `current` and `accepted`.
pub fn partition(
    bookings: &[CanonicalBooking],
    view: BookingView,
    draft: Option<&CanonicalBooking>,
) -> Vec<CanonicalBooking> {
    draft
        .into_iter()
        .chain(bookings.iter())
        .filter(|booking| !booking.is_closed)
        .filter(|booking| view.admits(booking))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::engine::normalizer::{normalize, NormalizedBooking};
    use crate::models::booking::{BookingKind, RawBookingRecord};

    fn single(id: &str, created_at: Option<(i32, u32, u32)>) -> CanonicalBooking {
        CanonicalBooking {
            id: id.to_string(),
            start_point: "Hebbal".to_string(),
            end_point: "Airport".to_string(),
            vehicle_type: "SEDAN".to_string(),
            date_of_travel: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            pickup_time: None,
            amount_due: "0".to_string(),
            amount_total: "0".to_string(),
            is_confirmed: false,
            status: BookingStatus::Pending,
            created_at: created_at
                .map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap())
                .unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            ride_instructions: String::new(),
            is_closed: false,
            kind: BookingKind::SingleTrip,
        }
    }

    fn package(id: &str, created_at: Option<(i32, u32, u32)>) -> PackageBooking {
        PackageBooking {
            id: id.to_string(),
            pick_up_place: "Koramangala".to_string(),
            total_km_booked: Some(80.0),
            total_hours_booked: Some(8.0),
            vehicle_type: None,
            base_amount: "2200".to_string(),
            date_of_travel: None,
            pickup_time: None,
            created_at: created_at
                .map(|(y, m, d)| Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()),
            is_confirmed: true,
            is_closed: false,
            kind: BookingKind::PackageTrip,
        }
    }

    fn id_of(latest: Option<LatestBooking>) -> Option<String> {
        latest.map(|booking| match booking {
            LatestBooking::SingleTrip(b) => format!("single:{}", b.id),
            LatestBooking::PackageTrip(p) => format!("package:{}", p.id),
        })
    }

    #[test]
    fn empty_lists_have_no_latest() {
        assert_eq!(pick_latest(&[], &[]), None);
    }

    #[test]
    fn one_sided_lists_win_unconditionally() {
        assert_eq!(
            id_of(pick_latest(&[], &[package("p1", None)])),
            Some("package:p1".to_string())
        );
        assert_eq!(
            id_of(pick_latest(&[single("s1", None)], &[])),
            Some("single:s1".to_string())
        );
    }

    #[test]
    fn newest_across_lists_wins() {
        let singles = [single("s1", Some((2024, 5, 1))), single("s2", Some((2024, 5, 3)))];
        let packages = [package("p1", Some((2024, 5, 2))), package("p2", Some((2024, 5, 4)))];
        assert_eq!(
            id_of(pick_latest(&singles, &packages)),
            Some("package:p2".to_string())
        );

        let packages = [package("p1", Some((2024, 5, 2)))];
        assert_eq!(
            id_of(pick_latest(&singles, &packages)),
            Some("single:s2".to_string())
        );
    }

    #[test]
    fn equal_timestamps_select_single_trip() {
        let singles = [single("s1", Some((2024, 5, 1)))];
        let packages = [package("p1", Some((2024, 5, 1)))];
        assert_eq!(
            id_of(pick_latest(&singles, &packages)),
            Some("single:s1".to_string())
        );
    }

    #[test]
    fn ties_within_a_list_go_to_the_later_entry() {
        let singles = [single("first", Some((2024, 5, 1))), single("second", Some((2024, 5, 1)))];
        assert_eq!(
            id_of(pick_latest(&singles, &[])),
            Some("single:second".to_string())
        );
    }

    #[test]
    fn package_without_timestamps_loses_to_any_dated_ride() {
        let mut dated = package("dated", None);
        dated.date_of_travel = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(
            dated.recency(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );

        let packages = [package("undated", None)];
        let singles = [single("s1", Some((1999, 1, 1)))];
        assert_eq!(
            id_of(pick_latest(&singles, &packages)),
            Some("single:s1".to_string())
        );
    }

    fn normalized(value: serde_json::Value) -> CanonicalBooking {
        let raw: RawBookingRecord = serde_json::from_value(value).unwrap();
        match normalize(raw) {
            NormalizedBooking::SingleTrip(booking) => booking,
            NormalizedBooking::PackageTrip(_) => panic!("expected single trip"),
        }
    }

    #[test]
    fn closed_bookings_never_appear() {
        let mut closed = single("closed", None);
        closed.is_closed = true;
        closed.is_confirmed = true;
        closed.status = BookingStatus::Started;
        let bookings = [closed];

        for view in [BookingView::Current, BookingView::Accepted, BookingView::Pending] {
            assert!(partition(&bookings, view, None).is_empty());
        }
    }

    #[test]
    fn string_and_boolean_confirmation_are_both_accepted() {
        let bookings = vec![
            normalized(json!({ "id": "a", "start_point": "A", "end_point": "B", "is_confirmed": "true" })),
            normalized(json!({ "id": "b", "start_point": "A", "end_point": "B", "is_confirmed": true })),
            normalized(json!({ "id": "c", "start_point": "A", "end_point": "B", "is_confirmed": "false" })),
        ];

        let accepted: Vec<String> = partition(&bookings, BookingView::Accepted, None)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(accepted, vec!["a", "b"]);

        let pending: Vec<String> = partition(&bookings, BookingView::Pending, None)
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(pending, vec!["c"]);
    }

    #[test]
    fn started_confirmed_ride_shows_in_current_and_accepted() {
        let mut ride = single("ride", None);
        ride.status = BookingStatus::Started;
        ride.is_confirmed = true;
        let bookings = [ride];

        assert_eq!(partition(&bookings, BookingView::Current, None).len(), 1);
        assert_eq!(partition(&bookings, BookingView::Accepted, None).len(), 1);
        assert!(partition(&bookings, BookingView::Pending, None).is_empty());
    }

    #[test]
    fn draft_is_prepended() {
        let draft = single("draft", None);
        let bookings = [single("s1", None), single("s2", None)];

        let ids: Vec<String> = partition(&bookings, BookingView::Pending, Some(&draft))
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec!["draft", "s1", "s2"]);
    }

    #[test]
    fn view_parses_case_insensitively() {
        assert_eq!("Current".parse::<BookingView>(), Ok(BookingView::Current));
        assert!("archived".parse::<BookingView>().is_err());
    }

    #[test]
    fn latest_serializes_with_kind_tag() {
        let value = serde_json::to_value(pick_latest(&[], &[package("p1", None)])).unwrap();
        assert_eq!(value["kind"], "packageTrip");
        assert_eq!(value["record"]["pick_up_place"], "Koramangala");
    }
}
