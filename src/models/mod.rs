pub mod booking;
pub mod place;
pub mod tariff;
pub mod wire;
