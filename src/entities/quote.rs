use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a quote can be turned into a booking.
pub const QUOTE_TTL_MINUTES: i64 = 30;

/// A customer's trip as submitted for pricing. Never stored on its own; it is
/// embedded in the [`Quote`] and later the booking it produces.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripQuoteRequest {
    pub pickup_address: String,
    pub dropoff_address: String,
    /// Miles.
    pub distance: Decimal,
    /// Local wall-clock time at the pickup location.
    pub pickup_time: NaiveDateTime,
    pub vehicle_id: Uuid,
    #[serde(default)]
    pub package_id: Option<Uuid>,
    #[serde(default)]
    pub hours: Option<Decimal>,
    #[serde(default)]
    pub stops: Vec<Stop>,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub car_seats: u32,
    #[serde(default)]
    pub booster_seats: u32,
    #[serde(default)]
    pub gratuity: Gratuity,
}

fn default_passengers() -> u32 {
    1
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    pub address: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Gratuity {
    None,
    Percentage { percentage: Decimal },
    Custom { amount: Decimal },
    /// Paid to the driver directly; recorded but never charged.
    Cash { amount: Decimal },
}

impl Default for Gratuity {
    fn default() -> Self {
        Self::None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFee {
    pub name: String,
    pub fee: Decimal,
}

/// Itemised result of pricing a trip against a policy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    pub base: Decimal,
    pub base_fee: Decimal,
    pub tier_fee: Decimal,
    pub threshold_fee: Decimal,
    pub per_mile_fee: Decimal,
    pub time_surcharge: Decimal,
    pub stop_fee: Decimal,
    pub car_seat_fee: Decimal,
    pub booster_seat_fee: Decimal,
    pub rule_fees: Vec<AppliedFee>,
    /// Sum of every line item before clamping.
    pub subtotal: Decimal,
    /// `subtotal` clamped to the policy's fee bounds.
    pub total: Decimal,
    pub gratuity: Decimal,
    pub cash_gratuity: Option<Decimal>,
    pub charged_total: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Quote {
    pub token: Uuid,
    pub request: TripQuoteRequest,
    pub price: PriceBreakdown,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(request: TripQuoteRequest, price: PriceBreakdown) -> Self {
        let created_at = Utc::now();

        Self {
            token: Uuid::new_v4(),
            request,
            price,
            created_at,
            expires_at: created_at + Duration::minutes(QUOTE_TTL_MINUTES),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[test]
fn request_defaults_optional_fields() {
    let request: TripQuoteRequest = serde_json::from_value(serde_json::json!({
        "pickupAddress": "JFK Terminal 4",
        "dropoffAddress": "350 5th Ave, New York",
        "distance": 17.5,
        "pickupTime": "2026-10-16T18:00:00",
        "vehicleId": "6f1e0a3c-2f57-4d1c-9a55-3f3a3c1f7b11"
    }))
    .unwrap();

    assert_eq!(request.distance, Decimal::new(175, 1));
    assert_eq!(request.passengers, 1);
    assert_eq!(request.car_seats, 0);
    assert!(request.stops.is_empty());
    assert!(request.package_id.is_none());
    assert_eq!(request.gratuity, Gratuity::None);
}

#[test]
fn gratuity_is_tagged_by_type() {
    let gratuity: Gratuity =
        serde_json::from_str(r#"{ "type": "percentage", "percentage": 18 }"#).unwrap();
    assert_eq!(
        gratuity,
        Gratuity::Percentage {
            percentage: Decimal::from(18)
        }
    );

    let gratuity: Gratuity = serde_json::from_str(r#"{ "type": "cash", "amount": "20" }"#).unwrap();
    assert_eq!(
        gratuity,
        Gratuity::Cash {
            amount: Decimal::from(20)
        }
    );
}

#[test]
fn quote_expires_after_ttl() {
    let request: TripQuoteRequest = serde_json::from_value(serde_json::json!({
        "pickupAddress": "a",
        "dropoffAddress": "b",
        "distance": 1,
        "pickupTime": "2026-10-16T18:00:00",
        "vehicleId": "6f1e0a3c-2f57-4d1c-9a55-3f3a3c1f7b11"
    }))
    .unwrap();

    let quote = Quote::new(request, PriceBreakdown::default());

    assert!(!quote.is_expired_at(quote.created_at));
    assert!(!quote.is_expired_at(quote.created_at + Duration::minutes(QUOTE_TTL_MINUTES - 1)));
    assert!(quote.is_expired_at(quote.created_at + Duration::minutes(QUOTE_TTL_MINUTES)));
}
