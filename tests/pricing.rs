use limousine::entities::{PricingPolicy, ServicePackage, TripQuoteRequest, Vehicle};
use limousine::pricing::{compute_price, TripDescriptor};
use rust_decimal::Decimal;
use serde_json::json;

fn policy(document: serde_json::Value) -> PricingPolicy {
    let policy: PricingPolicy = serde_json::from_value(document).unwrap();
    policy.validate().unwrap();
    policy
}

fn fleet() -> (Vehicle, ServicePackage) {
    let vehicle = serde_json::from_value(json!({
        "id": "9a4c8c9e-3c3b-4a0f-8f36-0c6c2f7d9d01",
        "name": "Cadillac Escalade",
        "class": "suv",
        "passenger_capacity": 6,
        "active": true
    }))
    .unwrap();

    let package = serde_json::from_value(json!({
        "id": "5d0a7f3e-7b43-4c62-a0f5-3fb4d1b0e7c2",
        "name": "Napa Wine Tour",
        "pricing": { "type": "hourly", "basePrice": "120", "minimumHours": "4" },
        "active": true
    }))
    .unwrap();

    (vehicle, package)
}

fn request(document: serde_json::Value) -> TripQuoteRequest {
    let mut base = json!({
        "pickupAddress": "SFO International Terminal",
        "dropoffAddress": "Fairmont San Francisco",
        "vehicleId": "9a4c8c9e-3c3b-4a0f-8f36-0c6c2f7d9d01"
    });

    if let (Some(base), Some(extra)) = (base.as_object_mut(), document.as_object()) {
        for (key, value) in extra {
            base.insert(key.clone(), value.clone());
        }
    }

    serde_json::from_value(base).unwrap()
}

#[test]
fn airport_transfer_with_tiers_stops_and_rush_hour() {
    let (vehicle, _) = fleet();

    let policy = policy(json!({
        "baseFee": "35",
        "distanceTiers": [
            { "minDistance": 0, "maxDistance": 40, "fee": 0 },
            { "minDistance": 40, "maxDistance": 60, "fee": 49 },
            { "minDistance": 60, "maxDistance": 100, "fee": 99 }
        ],
        "timeSurcharges": [
            { "name": "evening rush", "startTime": "17:00", "endTime": "19:00", "surcharge": 20 }
        ],
        "stopPrice": 25,
        "minFee": 85,
        "maxFee": 1000
    }));

    let request = request(json!({
        "distance": 45,
        "pickupTime": "2026-10-16T18:00:00",
        "stops": [{ "address": "Ferry Building" }, { "address": "Coit Tower" }],
        "passengers": 4,
        "gratuity": { "type": "percentage", "percentage": 20 }
    }));

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.tier_fee, Decimal::from(49));
    assert_eq!(price.stop_fee, Decimal::from(50));
    assert_eq!(price.time_surcharge, Decimal::from(20));
    assert_eq!(price.total, Decimal::from(154));
    assert_eq!(price.gratuity, Decimal::new(3080, 2));
    assert_eq!(price.charged_total, Decimal::new(18480, 2));
}

#[test]
fn hourly_package_with_fee_rule_and_cash_tip() {
    let (vehicle, package) = fleet();

    let policy = policy(json!({
        "perMileFeeEnabled": true,
        "perMileFee": "2.50",
        "feeRules": [
            { "name": "large party", "condition": "passengers >= 5", "fee": 40 },
            { "name": "sunday", "condition": "weekday == sun", "fee": 25 }
        ]
    }));

    let request = request(json!({
        "distance": "62.4",
        "pickupTime": "2026-10-17T10:30:00",
        "packageId": "5d0a7f3e-7b43-4c62-a0f5-3fb4d1b0e7c2",
        "hours": "3",
        "passengers": 6,
        "gratuity": { "type": "cash", "amount": 60 }
    }));

    let trip = TripDescriptor::resolve(&request, &vehicle, Some(&package)).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.base, Decimal::from(480));
    assert_eq!(price.per_mile_fee, Decimal::from(156));
    assert_eq!(price.rule_fees.len(), 1);
    assert_eq!(price.rule_fees[0].name, "large party");
    assert_eq!(price.total, Decimal::from(676));
    assert_eq!(price.cash_gratuity, Some(Decimal::from(60)));
    assert_eq!(price.charged_total, Decimal::from(676));
}

#[test]
fn stored_policy_with_missing_fields_uses_defaults() {
    let policy: PricingPolicy = serde_json::from_value(json!({ "stopPrice": 10 })).unwrap();

    assert_eq!(policy.stop_price, Decimal::from(10));
    assert_eq!(policy.max_fee, Decimal::ZERO);
    assert!(policy.distance_tiers.is_empty());
    assert!(!policy.per_mile_fee_enabled);
}

#[test]
fn malformed_policies_are_rejected_with_a_reason() {
    let overlapping: PricingPolicy = serde_json::from_value(json!({
        "distanceTiers": [
            { "minDistance": 0, "maxDistance": 50, "fee": 0 },
            { "minDistance": 40, "maxDistance": 60, "fee": 49 }
        ]
    }))
    .unwrap();
    let err = overlapping.validate().unwrap_err();
    assert_eq!(err.code, 103);

    let inverted: PricingPolicy =
        serde_json::from_value(json!({ "minFee": 500, "maxFee": 100 })).unwrap();
    assert!(inverted.validate().is_err());

    let bad_rule: PricingPolicy = serde_json::from_value(json!({
        "feeRules": [{ "name": "late", "condition": "pickup_hour >= late", "fee": 10 }]
    }))
    .unwrap();
    assert!(bad_rule.validate().unwrap_err().message.contains("late"));
}

#[test]
fn price_stays_within_fee_bounds() {
    let (vehicle, _) = fleet();

    let policy = policy(json!({
        "perMileFeeEnabled": true,
        "perMileFee": 4,
        "minFee": 85,
        "maxFee": 1000
    }));

    for distance in [0, 5, 21, 250, 300, 5000] {
        let request = request(json!({
            "distance": distance,
            "pickupTime": "2026-10-16T09:00:00"
        }));

        let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
        let price = compute_price(&trip, &policy).unwrap();

        assert!(price.total >= Decimal::from(85), "distance {}", distance);
        assert!(price.total <= Decimal::from(1000), "distance {}", distance);
    }
}

#[test]
fn percentage_gratuity_scales_with_total() {
    let (vehicle, _) = fleet();

    let policy = policy(json!({ "perMileFeeEnabled": true, "perMileFee": 3 }));

    let price_for = |distance: i64| {
        let request = request(json!({
            "distance": distance,
            "pickupTime": "2026-10-16T09:00:00",
            "gratuity": { "type": "percentage", "percentage": 15 }
        }));
        let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
        compute_price(&trip, &policy).unwrap()
    };

    let short = price_for(10);
    let long = price_for(20);

    assert_eq!(long.total, short.total * Decimal::from(2));
    assert_eq!(long.gratuity, short.gratuity * Decimal::from(2));
}

#[test]
fn absurd_distances_are_refused_before_pricing() {
    let (vehicle, _) = fleet();

    let policy = policy(json!({
        "perMileFeeEnabled": true,
        "perMileFee": "4",
        "maxFee": 1000
    }));

    let request = request(json!({
        "distance": "50000000000000000000000000000",
        "pickupTime": "2026-10-16T09:00:00"
    }));

    let err = TripDescriptor::resolve(&request, &vehicle, None).unwrap_err();
    assert_eq!(err.code, 104);
    assert!(err.message.contains("distance"));

    let oversized: PricingPolicy = serde_json::from_value(json!({
        "perMileFeeEnabled": true,
        "perMileFee": "79228162514264337593543950335"
    }))
    .unwrap();
    assert_eq!(oversized.validate().unwrap_err().code, 103);
}
