use crate::models::place::GeoPoint;

/// Mean Earth radius.
const EARTH_RADIUS_KM: f64 = 6_371.0088;

/// Straight-line distance. Only the confirmation fare uses this; trip
/// distances shown to the rider always come from the routing providers.
pub fn haversine_km(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let (phi_from, phi_to) = (from.latitude.to_radians(), to.latitude.to_radians());
    let half_dphi = (phi_to - phi_from) / 2.0;
    let half_dlambda = (to.longitude - from.longitude).to_radians() / 2.0;

    let chord = half_dphi.sin().powi(2)
        + phi_from.cos() * phi_to.cos() * half_dlambda.sin().powi(2);

    2.0 * EARTH_RADIUS_KM * chord.sqrt().atan2((1.0 - chord).max(0.0).sqrt())
}
