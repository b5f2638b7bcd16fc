pub mod bookings;
pub mod distance;
pub mod fare;
pub mod geo_resolver;
pub mod normalizer;
pub mod selector;
