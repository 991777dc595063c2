pub mod bookings;
pub mod packages;
pub mod pricing_policy;
pub mod quotes;
pub mod vehicles;
