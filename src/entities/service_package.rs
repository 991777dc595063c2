use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{MAX_AMOUNT, MAX_HOURS};
use crate::error::{invalid_invocation_error, invalid_request_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServicePackage {
    pub id: Uuid,
    pub name: String,
    pub pricing: PackagePricing,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PackagePricing {
    Flat {
        price: Decimal,
    },
    Hourly {
        #[serde(rename = "basePrice")]
        base_price: Decimal,
        #[serde(rename = "minimumHours")]
        minimum_hours: Decimal,
    },
}

impl PackagePricing {
    /// Flat packages ignore `hours`; hourly packages bill at least their
    /// minimum. `None` when the amount overflows.
    pub fn base_amount(&self, hours: Option<Decimal>) -> Option<Decimal> {
        match self {
            Self::Flat { price } => Some(*price),
            Self::Hourly {
                base_price,
                minimum_hours,
            } => {
                let billed_hours = hours.unwrap_or(Decimal::ZERO).max(*minimum_hours);
                base_price.checked_mul(billed_hours)
            }
        }
    }
}

impl ServicePackage {
    pub fn new(name: String, pricing: PackagePricing) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(invalid_request_error("package name must not be empty"));
        }

        let negative = match &pricing {
            PackagePricing::Flat { price } => *price < Decimal::ZERO,
            PackagePricing::Hourly {
                base_price,
                minimum_hours,
            } => *base_price < Decimal::ZERO || *minimum_hours < Decimal::ZERO,
        };

        if negative {
            return Err(invalid_request_error("package pricing must not be negative"));
        }

        let out_of_range = match &pricing {
            PackagePricing::Flat { price } => *price > Decimal::from(MAX_AMOUNT),
            PackagePricing::Hourly {
                base_price,
                minimum_hours,
            } => {
                *base_price > Decimal::from(MAX_AMOUNT)
                    || *minimum_hours > Decimal::from(MAX_HOURS)
            }
        };

        if out_of_range {
            return Err(invalid_request_error("package pricing is out of range"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            pricing,
            active: true,
        })
    }

    #[tracing::instrument]
    pub fn deactivate(&mut self) -> Result<(), Error> {
        if !self.active {
            return Err(invalid_invocation_error());
        }

        self.active = false;
        Ok(())
    }
}

#[test]
fn flat_package_ignores_hours() {
    let pricing = PackagePricing::Flat {
        price: Decimal::from(350),
    };

    assert_eq!(pricing.base_amount(None), Some(Decimal::from(350)));
    assert_eq!(
        pricing.base_amount(Some(Decimal::from(8))),
        Some(Decimal::from(350))
    );
}

#[test]
fn hourly_package_bills_at_least_minimum_hours() {
    let pricing = PackagePricing::Hourly {
        base_price: Decimal::from(95),
        minimum_hours: Decimal::from(3),
    };

    assert_eq!(pricing.base_amount(None), Some(Decimal::from(285)));
    assert_eq!(
        pricing.base_amount(Some(Decimal::from(2))),
        Some(Decimal::from(285))
    );
    assert_eq!(
        pricing.base_amount(Some(Decimal::from(5))),
        Some(Decimal::from(475))
    );
    assert_eq!(
        pricing.base_amount(Some(Decimal::new(45, 1))),
        Some(Decimal::new(4275, 1))
    );
}

#[test]
fn package_pricing_is_tagged_by_type() {
    let pricing: PackagePricing =
        serde_json::from_str(r#"{ "type": "hourly", "basePrice": "95.00", "minimumHours": 3 }"#)
            .unwrap();

    assert_eq!(
        pricing,
        PackagePricing::Hourly {
            base_price: Decimal::new(9500, 2),
            minimum_hours: Decimal::from(3),
        }
    );
}

#[test]
fn negative_package_pricing_is_rejected() {
    let result = ServicePackage::new(
        "Airport Transfer".into(),
        PackagePricing::Flat {
            price: Decimal::from(-1),
        },
    );

    assert!(result.is_err());
}

#[test]
fn hourly_amount_overflow_yields_none() {
    let pricing = PackagePricing::Hourly {
        base_price: Decimal::MAX,
        minimum_hours: Decimal::ONE,
    };

    assert_eq!(pricing.base_amount(Some(Decimal::from(2))), None);
}

#[test]
fn oversized_package_pricing_is_rejected() {
    let price = ServicePackage::new(
        "Airport Transfer".into(),
        PackagePricing::Flat {
            price: Decimal::from(MAX_AMOUNT) + Decimal::ONE,
        },
    );
    assert!(price.is_err());

    let hours = ServicePackage::new(
        "As Directed".into(),
        PackagePricing::Hourly {
            base_price: Decimal::from(95),
            minimum_hours: Decimal::from(MAX_HOURS + 1),
        },
    );
    assert!(hours.is_err());
}
