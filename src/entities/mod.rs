mod booking;
mod pricing_policy;
mod quote;
mod service_package;
mod vehicle;

pub use booking::{Booking, Canceller, Status as BookingStatus};
pub use pricing_policy::{
    DistanceTier, FeeRule, PricingPolicy, TimeSurcharge, MAX_AMOUNT, MAX_DISTANCE, MAX_HOURS,
};
pub use quote::{AppliedFee, Gratuity, PriceBreakdown, Quote, Stop, TripQuoteRequest};
pub use service_package::{PackagePricing, ServicePackage};
pub use vehicle::{Vehicle, VehicleClass};
