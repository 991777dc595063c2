use oso::{Oso, PolarClass};

use crate::auth::{Platform, User};
use crate::entities::Booking;
use crate::error::Error;

pub fn new() -> Result<Oso, Error> {
    let mut o = Oso::new();

    o.register_class(Platform::get_polar_class())?;
    o.register_class(User::get_polar_class())?;
    o.register_class(Booking::get_polar_class())?;

    o.load_str(include_str!("rules.polar"))?;

    Ok(o)
}

#[cfg(test)]
fn booking_for(customer_id: uuid::Uuid) -> Booking {
    use crate::entities::{PriceBreakdown, Quote, TripQuoteRequest};

    let request: TripQuoteRequest = serde_json::from_value(serde_json::json!({
        "pickupAddress": "Union Station, Denver",
        "dropoffAddress": "Denver International Airport",
        "distance": 23,
        "pickupTime": "2026-10-17T05:30:00",
        "vehicleId": "0b7f2a51-69f4-4b8e-a7a0-2c1f2d0a9e33"
    }))
    .unwrap();

    Booking::new(customer_id, Quote::new(request, PriceBreakdown::default()))
}

#[test]
fn platform_booking_relation_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();
    let booking = booking_for(Uuid::new_v4());

    let result = authorizor.query_rule(
        "has_relation",
        (Platform::default(), "platform", booking.clone()),
    );
    assert!(result.unwrap().next().unwrap().is_ok());
}

#[test]
fn platform_role_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let admin = User::new(Uuid::new_v4(), vec!["admin".into()]);
    let customer = User::new(Uuid::new_v4(), vec!["customer".into()]);
    let driver = User::new(Uuid::new_v4(), vec!["driver".into()]);

    for action in ["read_pricing_policy", "update_pricing_policy", "manage_catalogue"] {
        assert!(authorizor
            .is_allowed(admin.clone(), action, Platform::default())
            .unwrap());
        assert!(!authorizor
            .is_allowed(customer.clone(), action, Platform::default())
            .unwrap());
        assert!(!authorizor
            .is_allowed(driver.clone(), action, Platform::default())
            .unwrap());
    }

    for action in ["create_quote", "create_booking", "read_catalogue"] {
        assert!(authorizor
            .is_allowed(customer.clone(), action, Platform::default())
            .unwrap());
        assert!(authorizor
            .is_allowed(admin.clone(), action, Platform::default())
            .unwrap());
    }

    assert!(authorizor
        .is_allowed(driver.clone(), "read_driver_bookings", Platform::default())
        .unwrap());
    assert!(!authorizor
        .is_allowed(driver.clone(), "create_booking", Platform::default())
        .unwrap());
    assert!(!authorizor
        .is_allowed(customer.clone(), "read_driver_bookings", Platform::default())
        .unwrap());
}

#[test]
fn booking_customer_role_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let customer = User::new(Uuid::new_v4(), vec!["customer".into()]);
    let stranger = User::new(Uuid::new_v4(), vec!["customer".into()]);
    let booking = booking_for(customer.id);

    let result = authorizor.query_rule("has_role", (customer.clone(), "customer", booking.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    for action in ["read", "cancel"] {
        assert!(authorizor
            .is_allowed(customer.clone(), action, booking.clone())
            .unwrap());
        assert!(!authorizor
            .is_allowed(stranger.clone(), action, booking.clone())
            .unwrap());
    }

    for action in ["confirm", "assign_driver", "complete"] {
        assert!(!authorizor
            .is_allowed(customer.clone(), action, booking.clone())
            .unwrap());
    }
}

#[test]
fn booking_driver_role_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let driver = User::new(Uuid::new_v4(), vec!["driver".into()]);
    let mut booking = booking_for(Uuid::new_v4());

    // before a driver is assigned

    let result = authorizor.query_rule("has_role", (driver.clone(), "driver", booking.clone()));
    assert!(result.unwrap().next().is_none());

    assert!(!authorizor
        .is_allowed(driver.clone(), "read", booking.clone())
        .unwrap());
    assert!(!authorizor
        .is_allowed(driver.clone(), "complete", booking.clone())
        .unwrap());

    booking.confirm().unwrap();
    booking.assign_driver(driver.id).unwrap();

    // after the driver is assigned

    let result = authorizor.query_rule("has_role", (driver.clone(), "driver", booking.clone()));
    assert!(result.unwrap().next().unwrap().is_ok());

    assert!(authorizor
        .is_allowed(driver.clone(), "read", booking.clone())
        .unwrap());
    assert!(authorizor
        .is_allowed(driver.clone(), "complete", booking.clone())
        .unwrap());
    assert!(!authorizor
        .is_allowed(driver.clone(), "cancel", booking.clone())
        .unwrap());
}

#[test]
fn booking_admin_role_test() {
    use uuid::Uuid;

    let authorizor = new().unwrap();

    let admin = User::new(Uuid::new_v4(), vec!["admin".into()]);
    let unprivileged = User::new(Uuid::new_v4(), vec![]);
    let booking = booking_for(Uuid::new_v4());

    for action in ["read", "confirm", "assign_driver", "complete", "cancel"] {
        assert!(authorizor
            .is_allowed(admin.clone(), action, booking.clone())
            .unwrap());
        assert!(!authorizor
            .is_allowed(unprivileged.clone(), action, booking.clone())
            .unwrap());
    }
}
