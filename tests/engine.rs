use chrono::NaiveDate;
use limousine::api::{BookingAPI, PricingPolicyAPI, QuoteAPI, VehicleAPI};
use limousine::auth::User;
use limousine::db;
use limousine::engine::Engine;
use limousine::entities::{Gratuity, TripQuoteRequest, VehicleClass};
use rust_decimal::Decimal;
use uuid::Uuid;

async fn engine() -> Option<Engine> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping engine test: DATABASE_URL is unset");
            return None;
        }
    };

    let pool = db::connect(&url, 2).await.unwrap();
    Some(Engine::new(pool).await.unwrap())
}

fn admin() -> User {
    User::new(Uuid::new_v4(), vec!["admin".into()])
}

fn customer() -> User {
    User::new(Uuid::new_v4(), vec!["customer".into()])
}

#[tokio::test]
#[ignore = "requires DATABASE_URL and a local Postgres; non-CI integration test"]
async fn initializing_keeps_an_updated_policy() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let admin = admin();
    let stored = engine.find_pricing_policy(admin.clone()).await.unwrap();

    let mut updated = stored.clone();
    updated.stop_price = stored.stop_price + Decimal::from(25);
    engine
        .update_pricing_policy(admin.clone(), updated.clone())
        .await
        .unwrap();

    let initialized = engine.initialize_pricing_policy().await.unwrap();
    assert_eq!(initialized.stop_price, updated.stop_price);

    engine.update_pricing_policy(admin, stored).await.unwrap();
}

#[tokio::test]
#[ignore = "requires DATABASE_URL and a local Postgres; non-CI integration test"]
async fn a_quote_books_at_most_once() {
    let engine = match engine().await {
        Some(engine) => engine,
        None => return,
    };

    let vehicle = engine
        .create_vehicle(admin(), "Mercedes S-Class".into(), VehicleClass::Sedan, 3)
        .await
        .unwrap();

    let customer = customer();
    let request = TripQuoteRequest {
        pickup_address: "JFK Terminal 4".into(),
        dropoff_address: "The Plaza".into(),
        distance: Decimal::from(18),
        pickup_time: NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap(),
        vehicle_id: vehicle.id,
        package_id: None,
        hours: None,
        stops: vec![],
        passengers: 2,
        car_seats: 0,
        booster_seats: 0,
        gratuity: Gratuity::None,
    };

    let quote = engine
        .create_quote(customer.clone(), request)
        .await
        .unwrap();

    let booking = engine
        .create_booking(customer.clone(), quote.token)
        .await
        .unwrap();
    assert_eq!(booking.quote_token, quote.token);

    let err = engine
        .create_booking(customer.clone(), quote.token)
        .await
        .unwrap_err();
    assert!(err.is_invalid_invocation_error());

    let err = engine
        .create_booking(customer, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(err.is_invalid_input_error());
}
