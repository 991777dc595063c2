use chrono::{DateTime, Utc};
use oso::PolarClass;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{PriceBreakdown, Quote, TripQuoteRequest};
use crate::error::{invalid_invocation_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize, PolarClass)]
pub struct Booking {
    #[polar(attribute)]
    pub id: Uuid,
    #[polar(attribute)]
    pub customer_id: Uuid,
    pub quote_token: Uuid,
    pub request: TripQuoteRequest,
    /// Price agreed at quote time; later policy changes do not touch it.
    pub price: PriceBreakdown,
    pub status: Status,
    #[polar(attribute)]
    pub driver_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum Status {
    Pending,
    Confirmed {
        confirmed_at: DateTime<Utc>,
    },
    DriverAssigned {
        driver_id: Uuid,
        assigned_at: DateTime<Utc>,
    },
    Completed {
        completed_at: DateTime<Utc>,
    },
    Cancelled {
        cancelled_by: Canceller,
        cancelled_at: DateTime<Utc>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Canceller {
    Customer,
    Admin,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Pending => "pending".into(),
            Self::Confirmed { .. } => "confirmed".into(),
            Self::DriverAssigned { .. } => "driver_assigned".into(),
            Self::Completed { .. } => "completed".into(),
            Self::Cancelled { .. } => "cancelled".into(),
        }
    }
}

impl Booking {
    pub fn new(customer_id: Uuid, quote: Quote) -> Self {
        Self {
            id: Uuid::new_v4(),
            customer_id,
            quote_token: quote.token,
            request: quote.request,
            price: quote.price,
            status: Status::Pending,
            driver_id: None,
            created_at: Utc::now(),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn confirm(&mut self) -> Result<(), Error> {
        match self.status {
            Status::Pending => {
                self.status = Status::Confirmed {
                    confirmed_at: Utc::now(),
                };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    /// Assigns a driver to a confirmed booking, or swaps the driver on one
    /// that already has one.
    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn assign_driver(&mut self, driver_id: Uuid) -> Result<Option<Uuid>, Error> {
        let previous = match self.status {
            Status::Confirmed { .. } => None,
            Status::DriverAssigned {
                driver_id: current,
                ..
            } => Some(current),
            _ => return Err(invalid_invocation_error()),
        };

        self.status = Status::DriverAssigned {
            driver_id,
            assigned_at: Utc::now(),
        };
        self.driver_id = Some(driver_id);

        Ok(previous)
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn complete(&mut self) -> Result<(), Error> {
        match self.status {
            Status::DriverAssigned { .. } => {
                self.status = Status::Completed {
                    completed_at: Utc::now(),
                };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }

    #[tracing::instrument(skip(self), fields(id = %self.id))]
    pub fn cancel(&mut self, cancelled_by: Canceller) -> Result<(), Error> {
        match self.status {
            Status::Pending | Status::Confirmed { .. } | Status::DriverAssigned { .. } => {
                self.status = Status::Cancelled {
                    cancelled_by,
                    cancelled_at: Utc::now(),
                };
                Ok(())
            }
            _ => Err(invalid_invocation_error()),
        }
    }
}

#[cfg(test)]
fn pending_booking() -> Booking {
    let request: TripQuoteRequest = serde_json::from_value(serde_json::json!({
        "pickupAddress": "O'Hare International Airport",
        "dropoffAddress": "The Drake Hotel, Chicago",
        "distance": "18.2",
        "pickupTime": "2026-10-16T18:00:00",
        "vehicleId": "6f1e0a3c-2f57-4d1c-9a55-3f3a3c1f7b11"
    }))
    .unwrap();

    Booking::new(Uuid::new_v4(), Quote::new(request, PriceBreakdown::default()))
}

#[test]
fn booking_moves_through_its_lifecycle() {
    let mut booking = pending_booking();
    let driver_id = Uuid::new_v4();

    assert_eq!(booking.status.name(), "pending");

    booking.confirm().unwrap();
    assert_eq!(booking.status.name(), "confirmed");

    assert_eq!(booking.assign_driver(driver_id).unwrap(), None);
    assert_eq!(booking.status.name(), "driver_assigned");
    assert_eq!(booking.driver_id, Some(driver_id));

    booking.complete().unwrap();
    assert_eq!(booking.status.name(), "completed");
}

#[test]
fn pending_booking_cannot_be_assigned_or_completed() {
    let mut booking = pending_booking();

    assert!(booking
        .assign_driver(Uuid::new_v4())
        .unwrap_err()
        .is_invalid_invocation_error());
    assert!(booking.complete().is_err());
}

#[test]
fn reassigning_driver_returns_previous_driver() {
    let mut booking = pending_booking();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    booking.confirm().unwrap();
    booking.assign_driver(first).unwrap();

    assert_eq!(booking.assign_driver(second).unwrap(), Some(first));
    assert_eq!(booking.driver_id, Some(second));
}

#[test]
fn completed_or_cancelled_booking_cannot_be_cancelled() {
    let mut booking = pending_booking();
    booking.cancel(Canceller::Customer).unwrap();
    assert_eq!(booking.status.name(), "cancelled");
    assert!(booking.cancel(Canceller::Admin).is_err());
    assert!(booking.confirm().is_err());

    let mut booking = pending_booking();
    booking.confirm().unwrap();
    booking.assign_driver(Uuid::new_v4()).unwrap();
    booking.complete().unwrap();
    assert!(booking.cancel(Canceller::Admin).is_err());
}

#[test]
fn booking_status_is_tagged_by_name() {
    let mut booking = pending_booking();
    booking.cancel(Canceller::Admin).unwrap();

    let json = serde_json::to_value(&booking.status).unwrap();
    assert_eq!(json["name"], "cancelled");
    assert_eq!(json["cancelled_by"], "admin");
}
