//! Quote price computation.
//!
//! [`compute_price`] is a pure function of a resolved trip and a policy
//! snapshot: the same inputs always produce the same breakdown.

mod condition;

pub use condition::Condition;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::entities::{
    AppliedFee, Gratuity, PriceBreakdown, PricingPolicy, ServicePackage, TripQuoteRequest, Vehicle,
    MAX_AMOUNT, MAX_DISTANCE, MAX_HOURS,
};
use crate::error::{invalid_request_error, Error};

/// A quote request with its vehicle and package resolved and its inputs
/// checked.
#[derive(Clone, Debug)]
pub struct TripDescriptor<'a> {
    pub distance: Decimal,
    pub pickup_time: NaiveDateTime,
    pub vehicle: &'a Vehicle,
    pub package: Option<&'a ServicePackage>,
    pub hours: Option<Decimal>,
    pub stops: u32,
    pub passengers: u32,
    pub car_seats: u32,
    pub booster_seats: u32,
    pub gratuity: &'a Gratuity,
}

impl<'a> TripDescriptor<'a> {
    pub fn resolve(
        request: &'a TripQuoteRequest,
        vehicle: &'a Vehicle,
        package: Option<&'a ServicePackage>,
    ) -> Result<Self, Error> {
        if request.distance < Decimal::ZERO {
            return Err(invalid_request_error("distance must not be negative"));
        }

        if request.distance > Decimal::from(MAX_DISTANCE) {
            return Err(invalid_request_error(format!(
                "distance must not exceed {} miles",
                MAX_DISTANCE
            )));
        }

        if let Some(hours) = request.hours {
            if hours < Decimal::ZERO {
                return Err(invalid_request_error("hours must not be negative"));
            }

            if hours > Decimal::from(MAX_HOURS) {
                return Err(invalid_request_error(format!(
                    "hours must not exceed {}",
                    MAX_HOURS
                )));
            }
        }

        if vehicle.id != request.vehicle_id || !vehicle.active {
            return Err(invalid_request_error("vehicle is not available"));
        }

        if request.passengers == 0 {
            return Err(invalid_request_error("at least one passenger is required"));
        }

        if !vehicle.seats(request.passengers) {
            return Err(invalid_request_error(format!(
                "{} seats at most {} passengers",
                vehicle.name, vehicle.passenger_capacity
            )));
        }

        match (request.package_id, package) {
            (None, None) => {}
            (Some(id), Some(package)) if package.id == id && package.active => {}
            _ => return Err(invalid_request_error("service package is not available")),
        }

        match &request.gratuity {
            Gratuity::None => {}
            Gratuity::Percentage { percentage } => {
                if *percentage < Decimal::ZERO || *percentage > Decimal::ONE_HUNDRED {
                    return Err(invalid_request_error(
                        "gratuity percentage must be between 0 and 100",
                    ));
                }
            }
            Gratuity::Custom { amount } | Gratuity::Cash { amount } => {
                if *amount < Decimal::ZERO {
                    return Err(invalid_request_error("gratuity must not be negative"));
                }

                if *amount > Decimal::from(MAX_AMOUNT) {
                    return Err(invalid_request_error(format!(
                        "gratuity must not exceed {}",
                        MAX_AMOUNT
                    )));
                }
            }
        }

        let stops =
            u32::try_from(request.stops.len()).map_err(|_| invalid_request_error("too many stops"))?;

        Ok(Self {
            distance: request.distance,
            pickup_time: request.pickup_time,
            vehicle,
            package,
            hours: request.hours,
            stops,
            passengers: request.passengers,
            car_seats: request.car_seats,
            booster_seats: request.booster_seats,
            gratuity: &request.gratuity,
        })
    }
}

/// Prices `trip` under `policy`.
///
/// Every enabled distance mode contributes: the matching tier fee, the flat
/// fee past the threshold, and the per-mile charge all add up. Gratuity is
/// computed from the clamped total and is never clamped itself.
///
/// Fails only when an amount leaves the range `Decimal` can represent.
pub fn compute_price(
    trip: &TripDescriptor<'_>,
    policy: &PricingPolicy,
) -> Result<PriceBreakdown, Error> {
    let base = match trip.package {
        Some(package) => package
            .pricing
            .base_amount(trip.hours)
            .ok_or_else(amount_overflow)?,
        None => Decimal::ZERO,
    };

    let tier_fee = tier_fee(trip.distance, policy);

    let threshold_fee = if policy.distance_fee_enabled && trip.distance > policy.distance_threshold
    {
        policy.distance_fee
    } else {
        Decimal::ZERO
    };

    let per_mile_fee = if policy.per_mile_fee_enabled {
        checked_mul(trip.distance, policy.per_mile_fee)?.round_dp(2)
    } else {
        Decimal::ZERO
    };

    let pickup_time = trip.pickup_time.time();
    let time_surcharge = checked_sum(
        policy
            .time_surcharges
            .iter()
            .filter(|window| window.contains(pickup_time))
            .map(|window| window.surcharge),
    )?;

    let stop_fee = checked_mul(policy.stop_price, Decimal::from(trip.stops))?;
    let car_seat_fee = checked_mul(policy.car_seat_price, Decimal::from(trip.car_seats))?;
    let booster_seat_fee =
        checked_mul(policy.booster_seat_price, Decimal::from(trip.booster_seats))?;

    let rule_fees = rule_fees(trip, policy);

    let subtotal = checked_sum(
        [
            base,
            policy.base_fee,
            tier_fee,
            threshold_fee,
            per_mile_fee,
            time_surcharge,
            stop_fee,
            car_seat_fee,
            booster_seat_fee,
        ]
        .into_iter()
        .chain(rule_fees.iter().map(|applied| applied.fee)),
    )?;

    let total = clamp(subtotal, policy);

    let (gratuity, cash_gratuity) = match trip.gratuity {
        Gratuity::None => (Decimal::ZERO, None),
        Gratuity::Percentage { percentage } => {
            let share = checked_mul(total, *percentage)?
                .checked_div(Decimal::ONE_HUNDRED)
                .ok_or_else(amount_overflow)?;
            (share.round_dp(2), None)
        }
        Gratuity::Custom { amount } => (*amount, None),
        Gratuity::Cash { amount } => (Decimal::ZERO, Some(*amount)),
    };

    let charged_total = total.checked_add(gratuity).ok_or_else(amount_overflow)?;

    Ok(PriceBreakdown {
        base,
        base_fee: policy.base_fee,
        tier_fee,
        threshold_fee,
        per_mile_fee,
        time_surcharge,
        stop_fee,
        car_seat_fee,
        booster_seat_fee,
        rule_fees,
        subtotal,
        total,
        gratuity,
        cash_gratuity,
        charged_total,
    })
}

fn amount_overflow() -> Error {
    invalid_request_error("price exceeds the supported range")
}

fn checked_mul(lhs: Decimal, rhs: Decimal) -> Result<Decimal, Error> {
    lhs.checked_mul(rhs).ok_or_else(amount_overflow)
}

fn checked_sum(amounts: impl IntoIterator<Item = Decimal>) -> Result<Decimal, Error> {
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |sum, amount| sum.checked_add(amount))
        .ok_or_else(amount_overflow)
}

/// Fee of the first tier containing `distance`; nothing when no tier does.
fn tier_fee(distance: Decimal, policy: &PricingPolicy) -> Decimal {
    policy
        .distance_tiers
        .iter()
        .find(|tier| tier.contains(distance))
        .map(|tier| tier.fee)
        .unwrap_or(Decimal::ZERO)
}

fn rule_fees(trip: &TripDescriptor<'_>, policy: &PricingPolicy) -> Vec<AppliedFee> {
    let mut applied = vec![];

    for rule in policy.fee_rules.iter() {
        let condition = match Condition::parse(&rule.condition) {
            Ok(condition) => condition,
            Err(err) => {
                tracing::warn!(rule = %rule.name, "skipping fee rule: {}", err.message);
                continue;
            }
        };

        if condition.matches(trip) {
            applied.push(AppliedFee {
                name: rule.name.clone(),
                fee: rule.fee,
            });
        }
    }

    applied
}

fn clamp(subtotal: Decimal, policy: &PricingPolicy) -> Decimal {
    let mut total = subtotal;

    if total < policy.min_fee {
        total = policy.min_fee;
    }

    if policy.max_fee > Decimal::ZERO && total > policy.max_fee {
        total = policy.max_fee;
    }

    total.max(Decimal::ZERO)
}

#[cfg(test)]
mod fixtures {
    use chrono::{NaiveDate, NaiveDateTime};
    use rust_decimal::Decimal;

    use crate::entities::{
        DistanceTier, Gratuity, PackagePricing, ServicePackage, TimeSurcharge, TripQuoteRequest,
        Vehicle, VehicleClass,
    };

    pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    pub fn sedan() -> Vehicle {
        Vehicle::new("Lincoln Continental".into(), VehicleClass::Sedan, 3).unwrap()
    }

    pub fn hourly_package() -> ServicePackage {
        ServicePackage::new(
            "As Directed".into(),
            PackagePricing::Hourly {
                base_price: Decimal::from(95),
                minimum_hours: Decimal::from(3),
            },
        )
        .unwrap()
    }

    pub fn request(vehicle: &Vehicle, distance: i64) -> TripQuoteRequest {
        TripQuoteRequest {
            pickup_address: "LAX Terminal B".into(),
            dropoff_address: "Beverly Hills Hotel".into(),
            distance: Decimal::from(distance),
            pickup_time: at(12, 0),
            vehicle_id: vehicle.id,
            package_id: None,
            hours: None,
            stops: vec![],
            passengers: 2,
            car_seats: 0,
            booster_seats: 0,
            gratuity: Gratuity::None,
        }
    }

    pub fn tier(min: i64, max: Option<i64>, fee: i64) -> DistanceTier {
        DistanceTier {
            min_distance: Decimal::from(min),
            max_distance: max.map(Decimal::from),
            fee: Decimal::from(fee),
        }
    }

    pub fn window(start: u32, end: u32, surcharge: i64) -> TimeSurcharge {
        TimeSurcharge {
            name: None,
            start_time: at(start, 0).time(),
            end_time: at(end, 0).time(),
            surcharge: Decimal::from(surcharge),
        }
    }
}

#[test]
fn tier_fee_applies_without_other_distance_fees() {
    use fixtures::*;

    let vehicle = sedan();
    let request = request(&vehicle, 45);
    let policy = PricingPolicy {
        distance_tiers: vec![
            tier(0, Some(40), 0),
            tier(40, Some(60), 49),
            tier(60, Some(100), 99),
        ],
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.tier_fee, Decimal::from(49));
    assert_eq!(price.threshold_fee, Decimal::ZERO);
    assert_eq!(price.per_mile_fee, Decimal::ZERO);
    assert_eq!(price.total, Decimal::from(49));
}

#[test]
fn distance_above_every_tier_adds_no_tier_fee() {
    use fixtures::*;

    let vehicle = sedan();
    let request = request(&vehicle, 150);
    let policy = PricingPolicy {
        distance_tiers: vec![tier(0, Some(40), 0), tier(40, Some(100), 49)],
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().tier_fee, Decimal::ZERO);
}

#[test]
fn contiguous_tiers_apply_exactly_one_fee() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        distance_tiers: vec![
            tier(0, Some(40), 1),
            tier(40, Some(60), 10),
            tier(60, None, 100),
        ],
        ..PricingPolicy::default()
    };

    for (distance, expected) in [(0, 1), (39, 1), (40, 10), (59, 10), (60, 100), (5000, 100)] {
        let request = request(&vehicle, distance);
        let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();

        assert_eq!(
            compute_price(&trip, &policy).unwrap().tier_fee,
            Decimal::from(expected),
            "distance {}",
            distance
        );
    }
}

#[test]
fn enabled_distance_modes_are_additive() {
    use fixtures::*;

    let vehicle = sedan();
    let request = request(&vehicle, 50);
    let policy = PricingPolicy {
        distance_tiers: vec![tier(40, Some(60), 49)],
        distance_fee_enabled: true,
        distance_fee: Decimal::from(30),
        distance_threshold: Decimal::from(25),
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::new(350, 2),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.tier_fee, Decimal::from(49));
    assert_eq!(price.threshold_fee, Decimal::from(30));
    assert_eq!(price.per_mile_fee, Decimal::from(175));
    assert_eq!(price.subtotal, Decimal::from(254));
}

#[test]
fn disabled_modes_contribute_nothing() {
    use fixtures::*;

    let vehicle = sedan();
    let request = request(&vehicle, 50);
    let policy = PricingPolicy {
        distance_fee_enabled: false,
        distance_fee: Decimal::from(30),
        per_mile_fee_enabled: false,
        per_mile_fee: Decimal::from(4),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().subtotal, Decimal::ZERO);
}

#[test]
fn threshold_fee_requires_distance_strictly_past_threshold() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        distance_fee_enabled: true,
        distance_fee: Decimal::from(30),
        distance_threshold: Decimal::from(25),
        ..PricingPolicy::default()
    };

    let at_threshold = request(&vehicle, 25);
    let trip = TripDescriptor::resolve(&at_threshold, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().threshold_fee, Decimal::ZERO);

    let past_threshold = request(&vehicle, 26);
    let trip = TripDescriptor::resolve(&past_threshold, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().threshold_fee, Decimal::from(30));
}

#[test]
fn stops_and_seats_are_priced_per_unit() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 10);
    request.stops = vec![
        crate::entities::Stop {
            address: "Rodeo Drive".into(),
        },
        crate::entities::Stop {
            address: "Griffith Observatory".into(),
        },
    ];
    request.car_seats = 1;
    request.booster_seats = 2;

    let policy = PricingPolicy {
        stop_price: Decimal::from(25),
        car_seat_price: Decimal::from(15),
        booster_seat_price: Decimal::from(10),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.stop_fee, Decimal::from(50));
    assert_eq!(price.car_seat_fee, Decimal::from(15));
    assert_eq!(price.booster_seat_fee, Decimal::from(20));
    assert_eq!(price.total, Decimal::from(85));
}

#[test]
fn surcharge_applies_once_inside_window() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 10);
    request.pickup_time = at(18, 0);

    let policy = PricingPolicy {
        time_surcharges: vec![window(17, 19, 20)],
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().time_surcharge, Decimal::from(20));

    request.pickup_time = at(19, 0);
    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().time_surcharge, Decimal::ZERO);
}

#[test]
fn overlapping_surcharge_windows_are_additive() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 10);
    request.pickup_time = at(23, 30);

    let policy = PricingPolicy {
        time_surcharges: vec![window(22, 4, 30), window(23, 1, 15), window(6, 9, 10)],
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().time_surcharge, Decimal::from(45));
}

#[test]
fn total_is_clamped_to_fee_bounds() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::from(4),
        min_fee: Decimal::from(0),
        max_fee: Decimal::from(1000),
        ..PricingPolicy::default()
    };

    let request = request(&vehicle, 300);
    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.subtotal, Decimal::from(1200));
    assert_eq!(price.total, Decimal::from(1000));
}

#[test]
fn minimum_fee_raises_small_totals() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::from(4),
        min_fee: Decimal::from(85),
        ..PricingPolicy::default()
    };

    let request = request(&vehicle, 5);
    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.subtotal, Decimal::from(20));
    assert_eq!(price.total, Decimal::from(85));
}

#[test]
fn zero_max_fee_leaves_total_uncapped() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::from(4),
        max_fee: Decimal::ZERO,
        ..PricingPolicy::default()
    };

    let request = request(&vehicle, 1000);
    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    assert_eq!(compute_price(&trip, &policy).unwrap().total, Decimal::from(4000));
}

#[test]
fn hourly_package_uses_minimum_hours() {
    use fixtures::*;

    let vehicle = sedan();
    let package = hourly_package();
    let mut request = request(&vehicle, 10);
    request.package_id = Some(package.id);
    request.hours = Some(Decimal::from(2));

    let policy = PricingPolicy {
        base_fee: Decimal::from(10),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, Some(&package)).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.base, Decimal::from(285));
    assert_eq!(price.base_fee, Decimal::from(10));
    assert_eq!(price.total, Decimal::from(295));
}

#[test]
fn matching_fee_rules_are_itemised() {
    use crate::entities::FeeRule;
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 60);
    request.pickup_time = at(23, 0);

    let policy = PricingPolicy {
        fee_rules: vec![
            FeeRule {
                name: "long haul".into(),
                condition: "distance >= 50".into(),
                fee: Decimal::from(40),
            },
            FeeRule {
                name: "coach only".into(),
                condition: "vehicle == coach".into(),
                fee: Decimal::from(100),
            },
            FeeRule {
                name: "broken".into(),
                condition: "distance >>> 1".into(),
                fee: Decimal::from(1000),
            },
            FeeRule {
                name: "late sedan".into(),
                condition: "pickup_hour >= 22 and vehicle == sedan".into(),
                fee: Decimal::from(25),
            },
        ],
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    let names: Vec<&str> = price.rule_fees.iter().map(|fee| fee.name.as_str()).collect();
    assert_eq!(names, vec!["long haul", "late sedan"]);
    assert_eq!(price.total, Decimal::from(65));
}

#[test]
fn percentage_gratuity_is_computed_on_clamped_total() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 300);
    request.gratuity = Gratuity::Percentage {
        percentage: Decimal::from(20),
    };

    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::from(4),
        max_fee: Decimal::from(1000),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.total, Decimal::from(1000));
    assert_eq!(price.gratuity, Decimal::from(200));
    assert_eq!(price.charged_total, Decimal::from(1200));
}

#[test]
fn percentage_gratuity_rounds_to_cents() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 0);
    request.gratuity = Gratuity::Percentage {
        percentage: Decimal::from(15),
    };

    let policy = PricingPolicy {
        base_fee: Decimal::new(3333, 2),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.gratuity, Decimal::new(500, 2));
    assert_eq!(price.charged_total, Decimal::new(3833, 2));
}

#[test]
fn custom_gratuity_is_independent_of_trip() {
    use fixtures::*;

    let vehicle = sedan();
    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::from(3),
        time_surcharges: vec![window(17, 19, 20)],
        ..PricingPolicy::default()
    };

    for (distance, hour) in [(5, 8), (120, 18)] {
        let mut request = request(&vehicle, distance);
        request.pickup_time = at(hour, 0);
        request.gratuity = Gratuity::Custom {
            amount: Decimal::from(40),
        };

        let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
        let price = compute_price(&trip, &policy).unwrap();

        assert_eq!(price.gratuity, Decimal::from(40));
        assert_eq!(price.charged_total, price.total + Decimal::from(40));
    }
}

#[test]
fn cash_gratuity_is_recorded_but_not_charged() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 10);
    request.gratuity = Gratuity::Cash {
        amount: Decimal::from(20),
    };

    let policy = PricingPolicy {
        base_fee: Decimal::from(75),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.gratuity, Decimal::ZERO);
    assert_eq!(price.cash_gratuity, Some(Decimal::from(20)));
    assert_eq!(price.charged_total, Decimal::from(75));
}

#[test]
fn computation_is_deterministic() {
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, 47);
    request.pickup_time = at(17, 45);
    request.gratuity = Gratuity::Percentage {
        percentage: Decimal::from(18),
    };

    let policy = PricingPolicy {
        base_fee: Decimal::from(15),
        distance_tiers: vec![tier(0, Some(40), 0), tier(40, None, 49)],
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::new(275, 2),
        time_surcharges: vec![window(17, 19, 20)],
        min_fee: Decimal::from(90),
        max_fee: Decimal::from(1500),
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let first = compute_price(&trip, &policy).unwrap();

    for _ in 0..10 {
        assert_eq!(compute_price(&trip, &policy).unwrap(), first);
    }
}

#[test]
fn resolve_rejects_out_of_domain_inputs() {
    use fixtures::*;

    let vehicle = sedan();

    let mut negative_distance = request(&vehicle, 10);
    negative_distance.distance = Decimal::from(-1);
    assert!(TripDescriptor::resolve(&negative_distance, &vehicle, None).is_err());

    let mut negative_hours = request(&vehicle, 10);
    negative_hours.hours = Some(Decimal::from(-2));
    assert!(TripDescriptor::resolve(&negative_hours, &vehicle, None).is_err());

    let mut too_many_passengers = request(&vehicle, 10);
    too_many_passengers.passengers = 4;
    assert!(TripDescriptor::resolve(&too_many_passengers, &vehicle, None).is_err());

    let mut excessive_tip = request(&vehicle, 10);
    excessive_tip.gratuity = Gratuity::Percentage {
        percentage: Decimal::from(150),
    };
    assert!(TripDescriptor::resolve(&excessive_tip, &vehicle, None).is_err());

    let mut negative_tip = request(&vehicle, 10);
    negative_tip.gratuity = Gratuity::Cash {
        amount: Decimal::from(-5),
    };
    assert!(TripDescriptor::resolve(&negative_tip, &vehicle, None).is_err());
}

#[test]
fn resolve_rejects_unavailable_vehicle_or_package() {
    use fixtures::*;

    let mut vehicle = sedan();
    let request = request(&vehicle, 10);

    let other_vehicle = sedan();
    assert!(TripDescriptor::resolve(&request, &other_vehicle, None).is_err());

    vehicle.deactivate().unwrap();
    assert!(TripDescriptor::resolve(&request, &vehicle, None).is_err());

    let vehicle = sedan();
    let mut package = hourly_package();
    let mut with_package = fixtures::request(&vehicle, 10);
    with_package.package_id = Some(package.id);

    assert!(TripDescriptor::resolve(&with_package, &vehicle, None).is_err());
    assert!(TripDescriptor::resolve(&with_package, &vehicle, Some(&package)).is_ok());

    package.deactivate().unwrap();
    assert!(TripDescriptor::resolve(&with_package, &vehicle, Some(&package)).is_err());
}

#[test]
fn resolve_rejects_distances_past_the_supported_range() {
    use fixtures::*;

    let vehicle = sedan();

    let mut request = request(&vehicle, 10);
    request.distance = "50000000000000000000000000000".parse().unwrap();
    let err = TripDescriptor::resolve(&request, &vehicle, None).unwrap_err();
    assert_eq!(err.code, 104);

    request.distance = Decimal::from(MAX_DISTANCE);
    assert!(TripDescriptor::resolve(&request, &vehicle, None).is_ok());

    let mut long_charter = fixtures::request(&vehicle, 10);
    long_charter.hours = Some(Decimal::from(MAX_HOURS + 1));
    assert!(TripDescriptor::resolve(&long_charter, &vehicle, None).is_err());

    let mut lavish_tip = fixtures::request(&vehicle, 10);
    lavish_tip.gratuity = Gratuity::Custom {
        amount: Decimal::MAX,
    };
    assert!(TripDescriptor::resolve(&lavish_tip, &vehicle, None).is_err());
}

#[test]
fn overflowing_amounts_are_reported_not_panicked() {
    use fixtures::*;

    let vehicle = sedan();
    let request = request(&vehicle, 50);

    // Bypasses validate, as a hand-edited stored document would.
    let policy = PricingPolicy {
        per_mile_fee_enabled: true,
        per_mile_fee: Decimal::MAX,
        ..PricingPolicy::default()
    };

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let err = compute_price(&trip, &policy).unwrap_err();
    assert_eq!(err.code, 104);

    let policy = PricingPolicy {
        base_fee: Decimal::MAX,
        stop_price: Decimal::MAX,
        ..PricingPolicy::default()
    };
    let mut with_stop = fixtures::request(&vehicle, 1);
    with_stop.stops = vec![crate::entities::Stop {
        address: "Union Station".into(),
    }];
    let trip = TripDescriptor::resolve(&with_stop, &vehicle, None).unwrap();
    assert!(compute_price(&trip, &policy).is_err());
}

#[test]
fn largest_accepted_inputs_price_without_overflow() {
    use crate::entities::FeeRule;
    use fixtures::*;

    let vehicle = sedan();
    let mut request = request(&vehicle, MAX_DISTANCE);
    request.gratuity = Gratuity::Percentage {
        percentage: Decimal::ONE_HUNDRED,
    };

    let ceiling = Decimal::from(MAX_AMOUNT);
    let policy = PricingPolicy {
        base_fee: ceiling,
        per_mile_fee_enabled: true,
        per_mile_fee: ceiling,
        distance_fee_enabled: true,
        distance_fee: ceiling,
        time_surcharges: vec![window(0, 23, MAX_AMOUNT)],
        fee_rules: vec![FeeRule {
            name: "everything".into(),
            condition: String::new(),
            fee: ceiling,
        }],
        ..PricingPolicy::default()
    };
    policy.validate().unwrap();

    let trip = TripDescriptor::resolve(&request, &vehicle, None).unwrap();
    let price = compute_price(&trip, &policy).unwrap();

    assert_eq!(price.per_mile_fee, Decimal::from(MAX_DISTANCE) * ceiling);
    assert_eq!(price.charged_total, price.total * Decimal::from(2));
}
