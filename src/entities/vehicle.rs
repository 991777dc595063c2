use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{invalid_invocation_error, invalid_request_error, Error};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub name: String,
    pub class: VehicleClass,
    pub passenger_capacity: u32,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    Sedan,
    Suv,
    StretchLimousine,
    Sprinter,
    PartyBus,
    Coach,
}

impl VehicleClass {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sedan => "sedan",
            Self::Suv => "suv",
            Self::StretchLimousine => "stretch_limousine",
            Self::Sprinter => "sprinter",
            Self::PartyBus => "party_bus",
            Self::Coach => "coach",
        }
    }
}

impl Vehicle {
    pub fn new(name: String, class: VehicleClass, passenger_capacity: u32) -> Result<Self, Error> {
        if name.trim().is_empty() {
            return Err(invalid_request_error("vehicle name must not be empty"));
        }

        if passenger_capacity == 0 {
            return Err(invalid_request_error("vehicle must seat at least one passenger"));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            class,
            passenger_capacity,
            active: true,
        })
    }

    pub fn seats(&self, passengers: u32) -> bool {
        passengers <= self.passenger_capacity
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
fn vehicle_requires_name_and_capacity() {
    assert!(Vehicle::new("".into(), VehicleClass::Sedan, 3).is_err());
    assert!(Vehicle::new("Lincoln Continental".into(), VehicleClass::Sedan, 0).is_err());

    let vehicle = Vehicle::new("Lincoln Continental".into(), VehicleClass::Sedan, 3).unwrap();
    assert!(vehicle.active);
    assert!(vehicle.seats(3));
    assert!(!vehicle.seats(4));
}

#[test]
fn vehicle_can_only_be_deactivated_once() {
    let mut vehicle = Vehicle::new("Party Bus".into(), VehicleClass::PartyBus, 30).unwrap();

    assert!(vehicle.deactivate().is_ok());
    assert!(!vehicle.active);
    assert!(vehicle.deactivate().unwrap_err().is_invalid_invocation_error());
}

#[test]
fn vehicle_class_uses_snake_case_names() {
    let json = serde_json::to_value(VehicleClass::StretchLimousine).unwrap();

    assert_eq!(json, "stretch_limousine");
    assert_eq!(VehicleClass::StretchLimousine.name(), "stretch_limousine");
}
