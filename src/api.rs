use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{
    Booking, PackagePricing, PricingPolicy, Quote, ServicePackage, TripQuoteRequest, Vehicle,
    VehicleClass,
};
use crate::error::Error;

#[async_trait]
pub trait PricingPolicyAPI {
    /// Stores the default policy unless one is already stored.
    async fn initialize_pricing_policy(&self) -> Result<PricingPolicy, Error>;

    async fn find_pricing_policy(&self, user: User) -> Result<PricingPolicy, Error>;

    async fn update_pricing_policy(
        &self,
        user: User,
        policy: PricingPolicy,
    ) -> Result<PricingPolicy, Error>;
}

#[async_trait]
pub trait QuoteAPI {
    async fn create_quote(&self, user: User, request: TripQuoteRequest) -> Result<Quote, Error>;

    async fn find_quote(&self, user: User, token: Uuid) -> Result<Quote, Error>;
}

#[async_trait]
pub trait VehicleAPI {
    async fn create_vehicle(
        &self,
        user: User,
        name: String,
        class: VehicleClass,
        passenger_capacity: u32,
    ) -> Result<Vehicle, Error>;

    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error>;

    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error>;

    async fn deactivate_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error>;
}

#[async_trait]
pub trait PackageAPI {
    async fn create_package(
        &self,
        user: User,
        name: String,
        pricing: PackagePricing,
    ) -> Result<ServicePackage, Error>;

    async fn find_package(&self, user: User, id: Uuid) -> Result<ServicePackage, Error>;

    async fn list_packages(&self, user: User) -> Result<Vec<ServicePackage>, Error>;

    async fn deactivate_package(&self, user: User, id: Uuid) -> Result<ServicePackage, Error>;
}

#[async_trait]
pub trait BookingAPI {
    async fn create_booking(&self, user: User, quote_token: Uuid) -> Result<Booking, Error>;

    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    async fn confirm_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    async fn assign_driver(&self, user: User, id: Uuid, driver_id: Uuid)
        -> Result<Booking, Error>;

    async fn complete_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error>;

    /// Bookings assigned to the calling driver that are not yet completed.
    async fn list_driver_bookings(&self, user: User) -> Result<Vec<Booking>, Error>;
}

pub trait API: PricingPolicyAPI + QuoteAPI + VehicleAPI + PackageAPI + BookingAPI {}
