use chrono::NaiveTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{invalid_policy_error, Error};
use crate::pricing::Condition;

/// Largest fee, price or gratuity accepted anywhere, in dollars.
pub const MAX_AMOUNT: i64 = 1_000_000_000;
/// Largest trip or tier distance accepted, in miles.
pub const MAX_DISTANCE: i64 = 1_000_000;
/// Largest billed hour count accepted.
pub const MAX_HOURS: i64 = 10_000;

/// Admin-configured fee schedule applied to every quote.
///
/// Missing fields in a stored document fall back to [`PricingPolicy::default`],
/// which charges nothing and clamps nothing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingPolicy {
    pub base_fee: Decimal,
    pub per_mile_fee_enabled: bool,
    pub per_mile_fee: Decimal,
    pub distance_fee_enabled: bool,
    pub distance_fee: Decimal,
    pub distance_threshold: Decimal,
    pub distance_tiers: Vec<DistanceTier>,
    pub time_surcharges: Vec<TimeSurcharge>,
    pub stop_price: Decimal,
    pub car_seat_price: Decimal,
    pub booster_seat_price: Decimal,
    pub min_fee: Decimal,
    /// Zero disables the upper clamp.
    pub max_fee: Decimal,
    pub fee_rules: Vec<FeeRule>,
}

/// A `[min, max)` distance band in miles. An absent `max_distance` leaves the
/// band open-ended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistanceTier {
    pub min_distance: Decimal,
    #[serde(default)]
    pub max_distance: Option<Decimal>,
    pub fee: Decimal,
}

impl DistanceTier {
    pub fn contains(&self, distance: Decimal) -> bool {
        self.min_distance <= distance && self.max_distance.map_or(true, |max| distance < max)
    }
}

/// A `[start, end)` window of local clock time. A window whose end is
/// before its start wraps past midnight; equal bounds match nothing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSurcharge {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(with = "clock_time")]
    pub start_time: NaiveTime,
    #[serde(with = "clock_time")]
    pub end_time: NaiveTime,
    pub surcharge: Decimal,
}

impl TimeSurcharge {
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start_time <= self.end_time {
            self.start_time <= time && time < self.end_time
        } else {
            time >= self.start_time || time < self.end_time
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRule {
    pub name: String,
    #[serde(default)]
    pub condition: String,
    pub fee: Decimal,
}

impl PricingPolicy {
    /// Rejects policies the calculator cannot apply unambiguously.
    pub fn validate(&self) -> Result<(), Error> {
        let amounts = [
            ("baseFee", self.base_fee),
            ("perMileFee", self.per_mile_fee),
            ("distanceFee", self.distance_fee),
            ("stopPrice", self.stop_price),
            ("carSeatPrice", self.car_seat_price),
            ("boosterSeatPrice", self.booster_seat_price),
            ("minFee", self.min_fee),
            ("maxFee", self.max_fee),
        ];

        for (field, amount) in amounts {
            check_amount(field, amount)?;
        }

        check_distance("distanceThreshold", self.distance_threshold)?;

        if self.max_fee > Decimal::ZERO && self.min_fee > self.max_fee {
            return Err(invalid_policy_error("minFee exceeds maxFee"));
        }

        self.validate_tiers()?;

        for surcharge in self.time_surcharges.iter() {
            check_amount("time surcharge", surcharge.surcharge)?;
        }

        for rule in self.fee_rules.iter() {
            if rule.name.trim().is_empty() {
                return Err(invalid_policy_error("fee rule name must not be empty"));
            }

            check_amount(&format!("fee rule `{}`", rule.name), rule.fee)?;

            Condition::parse(&rule.condition)?;
        }

        Ok(())
    }

    fn validate_tiers(&self) -> Result<(), Error> {
        let mut tiers: Vec<&DistanceTier> = self.distance_tiers.iter().collect();
        tiers.sort_by(|a, b| a.min_distance.cmp(&b.min_distance));

        for tier in tiers.iter() {
            check_distance("distance tier minimum", tier.min_distance)?;
            check_amount("distance tier fee", tier.fee)?;

            if let Some(max) = tier.max_distance {
                check_distance("distance tier maximum", max)?;

                if max <= tier.min_distance {
                    return Err(invalid_policy_error(format!(
                        "distance tier starting at {} must end after it starts",
                        tier.min_distance
                    )));
                }
            }
        }

        for pair in tiers.windows(2) {
            let (lower, upper) = (pair[0], pair[1]);

            match lower.max_distance {
                Some(max) if max <= upper.min_distance => {}
                _ => {
                    return Err(invalid_policy_error(format!(
                        "distance tiers starting at {} and {} overlap",
                        lower.min_distance, upper.min_distance
                    )))
                }
            }
        }

        Ok(())
    }
}

fn check_amount(field: &str, amount: Decimal) -> Result<(), Error> {
    if amount < Decimal::ZERO {
        return Err(invalid_policy_error(format!("{} must not be negative", field)));
    }

    if amount > Decimal::from(MAX_AMOUNT) {
        return Err(invalid_policy_error(format!(
            "{} must not exceed {}",
            field, MAX_AMOUNT
        )));
    }

    Ok(())
}

fn check_distance(field: &str, distance: Decimal) -> Result<(), Error> {
    if distance < Decimal::ZERO {
        return Err(invalid_policy_error(format!("{} must not be negative", field)));
    }

    if distance > Decimal::from(MAX_DISTANCE) {
        return Err(invalid_policy_error(format!(
            "{} must not exceed {} miles",
            field, MAX_DISTANCE
        )));
    }

    Ok(())
}

mod clock_time {
    use chrono::{NaiveTime, Timelike};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        let formatted = if time.second() == 0 {
            time.format("%H:%M").to_string()
        } else {
            time.format("%H:%M:%S").to_string()
        };

        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;

        NaiveTime::parse_from_str(&raw, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
            .map_err(|_| D::Error::custom(format!("expected HH:MM clock time, got `{}`", raw)))
    }
}

#[cfg(test)]
fn clock(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[test]
fn default_policy_is_valid() {
    assert!(PricingPolicy::default().validate().is_ok());
}

#[test]
fn missing_fields_fall_back_to_defaults() {
    let policy: PricingPolicy = serde_json::from_str(r#"{ "stopPrice": 25 }"#).unwrap();

    assert_eq!(policy.stop_price, Decimal::from(25));
    assert_eq!(policy.max_fee, Decimal::ZERO);
    assert!(!policy.per_mile_fee_enabled);
    assert!(policy.distance_tiers.is_empty());
}

#[test]
fn surcharge_window_accepts_short_and_long_clock_times() {
    let surcharge: TimeSurcharge = serde_json::from_str(
        r#"{ "startTime": "17:00", "endTime": "19:30:15", "surcharge": "20" }"#,
    )
    .unwrap();

    assert_eq!(surcharge.start_time, clock(17, 0));
    assert_eq!(
        surcharge.end_time,
        NaiveTime::from_hms_opt(19, 30, 15).unwrap()
    );

    let json = serde_json::to_value(&surcharge).unwrap();
    assert_eq!(json["startTime"], "17:00");
    assert_eq!(json["endTime"], "19:30:15");

    let bad = serde_json::from_str::<TimeSurcharge>(
        r#"{ "startTime": "5pm", "endTime": "19:00", "surcharge": 20 }"#,
    );
    assert!(bad.is_err());
}

#[test]
fn surcharge_window_is_half_open() {
    let surcharge = TimeSurcharge {
        name: None,
        start_time: clock(17, 0),
        end_time: clock(19, 0),
        surcharge: Decimal::from(20),
    };

    assert!(surcharge.contains(clock(17, 0)));
    assert!(surcharge.contains(clock(18, 0)));
    assert!(!surcharge.contains(clock(19, 0)));
    assert!(!surcharge.contains(clock(16, 59)));
}

#[test]
fn surcharge_window_wraps_midnight() {
    let surcharge = TimeSurcharge {
        name: Some("late night".into()),
        start_time: clock(22, 0),
        end_time: clock(4, 0),
        surcharge: Decimal::from(30),
    };

    assert!(surcharge.contains(clock(23, 30)));
    assert!(surcharge.contains(clock(0, 0)));
    assert!(surcharge.contains(clock(3, 59)));
    assert!(!surcharge.contains(clock(4, 0)));
    assert!(!surcharge.contains(clock(12, 0)));
}

#[test]
fn surcharge_window_with_equal_bounds_is_empty() {
    let surcharge = TimeSurcharge {
        name: None,
        start_time: clock(8, 0),
        end_time: clock(8, 0),
        surcharge: Decimal::from(5),
    };

    assert!(!surcharge.contains(clock(8, 0)));
    assert!(!surcharge.contains(clock(20, 0)));
}

#[test]
fn open_ended_tier_covers_everything_above_its_minimum() {
    let tier = DistanceTier {
        min_distance: Decimal::from(100),
        max_distance: None,
        fee: Decimal::from(150),
    };

    assert!(tier.contains(Decimal::from(100)));
    assert!(tier.contains(Decimal::from(10_000)));
    assert!(!tier.contains(Decimal::new(9999, 2)));
}

#[test]
fn overlapping_tiers_are_rejected() {
    let policy = PricingPolicy {
        distance_tiers: vec![
            DistanceTier {
                min_distance: Decimal::from(0),
                max_distance: Some(Decimal::from(50)),
                fee: Decimal::ZERO,
            },
            DistanceTier {
                min_distance: Decimal::from(40),
                max_distance: Some(Decimal::from(60)),
                fee: Decimal::from(49),
            },
        ],
        ..PricingPolicy::default()
    };

    let err = policy.validate().unwrap_err();
    assert_eq!(err.code, 103);
}

#[test]
fn tier_after_open_ended_tier_is_rejected() {
    let policy = PricingPolicy {
        distance_tiers: vec![
            DistanceTier {
                min_distance: Decimal::from(60),
                max_distance: Some(Decimal::from(100)),
                fee: Decimal::from(99),
            },
            DistanceTier {
                min_distance: Decimal::from(0),
                max_distance: None,
                fee: Decimal::ZERO,
            },
        ],
        ..PricingPolicy::default()
    };

    assert!(policy.validate().is_err());
}

#[test]
fn unordered_contiguous_tiers_are_accepted() {
    let policy = PricingPolicy {
        distance_tiers: vec![
            DistanceTier {
                min_distance: Decimal::from(40),
                max_distance: Some(Decimal::from(60)),
                fee: Decimal::from(49),
            },
            DistanceTier {
                min_distance: Decimal::from(0),
                max_distance: Some(Decimal::from(40)),
                fee: Decimal::ZERO,
            },
        ],
        ..PricingPolicy::default()
    };

    assert!(policy.validate().is_ok());
}

#[test]
fn empty_tier_is_rejected() {
    let policy = PricingPolicy {
        distance_tiers: vec![DistanceTier {
            min_distance: Decimal::from(10),
            max_distance: Some(Decimal::from(10)),
            fee: Decimal::ONE,
        }],
        ..PricingPolicy::default()
    };

    assert!(policy.validate().is_err());
}

#[test]
fn negative_fees_are_rejected() {
    let policy = PricingPolicy {
        stop_price: Decimal::from(-5),
        ..PricingPolicy::default()
    };

    let err = policy.validate().unwrap_err();
    assert!(err.message.contains("stopPrice"));
}

#[test]
fn min_fee_above_max_fee_is_rejected() {
    let policy = PricingPolicy {
        min_fee: Decimal::from(200),
        max_fee: Decimal::from(100),
        ..PricingPolicy::default()
    };
    assert!(policy.validate().is_err());

    let uncapped = PricingPolicy {
        min_fee: Decimal::from(200),
        max_fee: Decimal::ZERO,
        ..PricingPolicy::default()
    };
    assert!(uncapped.validate().is_ok());
}

#[test]
fn unparseable_fee_rule_is_rejected() {
    let policy = PricingPolicy {
        fee_rules: vec![FeeRule {
            name: "airport".into(),
            condition: "distance >>> 5".into(),
            fee: Decimal::from(15),
        }],
        ..PricingPolicy::default()
    };

    assert!(policy.validate().is_err());
}

#[test]
fn oversized_amounts_are_rejected() {
    let policy = PricingPolicy {
        stop_price: Decimal::from(MAX_AMOUNT) + Decimal::ONE,
        ..PricingPolicy::default()
    };
    let err = policy.validate().unwrap_err();
    assert!(err.message.contains("stopPrice"));

    let policy = PricingPolicy {
        per_mile_fee: Decimal::MAX,
        ..PricingPolicy::default()
    };
    assert!(policy.validate().is_err());

    let policy = PricingPolicy {
        distance_tiers: vec![DistanceTier {
            min_distance: Decimal::ZERO,
            max_distance: Some(Decimal::MAX),
            fee: Decimal::ONE,
        }],
        ..PricingPolicy::default()
    };
    assert!(policy.validate().is_err());

    let policy = PricingPolicy {
        fee_rules: vec![FeeRule {
            name: "airport".into(),
            condition: String::new(),
            fee: Decimal::MAX,
        }],
        ..PricingPolicy::default()
    };
    assert!(policy.validate().is_err());
}

#[test]
fn amounts_at_the_limit_are_accepted() {
    let policy = PricingPolicy {
        stop_price: Decimal::from(MAX_AMOUNT),
        distance_threshold: Decimal::from(MAX_DISTANCE),
        ..PricingPolicy::default()
    };

    assert!(policy.validate().is_ok());
}
