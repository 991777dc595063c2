use std::str::FromStr;

use chrono::{Datelike, Timelike};
use rust_decimal::Decimal;

use super::TripDescriptor;
use crate::error::{invalid_policy_error, Error};

/// A parsed fee rule condition: clauses joined by `and`, e.g.
/// `distance > 50 and vehicle == suv`. An empty condition matches every trip.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    clauses: Vec<Clause>,
}

#[derive(Clone, Debug, PartialEq)]
struct Clause {
    field: Field,
    operator: Operator,
    value: Value,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    Distance,
    Passengers,
    Stops,
    Hours,
    CarSeats,
    BoosterSeats,
    PickupHour,
    Weekday,
    Vehicle,
    Package,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Operator {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Number(Decimal),
    Text(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Symbol(String),
}

const WEEKDAYS: [&str; 7] = ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl Field {
    fn is_numeric(&self) -> bool {
        !matches!(self, Self::Weekday | Self::Vehicle | Self::Package)
    }
}

impl FromStr for Field {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "distance" => Ok(Self::Distance),
            "passengers" => Ok(Self::Passengers),
            "stops" => Ok(Self::Stops),
            "hours" => Ok(Self::Hours),
            "car_seats" => Ok(Self::CarSeats),
            "booster_seats" => Ok(Self::BoosterSeats),
            "pickup_hour" => Ok(Self::PickupHour),
            "weekday" => Ok(Self::Weekday),
            "vehicle" => Ok(Self::Vehicle),
            "package" => Ok(Self::Package),
            _ => Err(()),
        }
    }
}

impl FromStr for Operator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "=" | "==" => Ok(Self::Eq),
            "!=" => Ok(Self::Ne),
            ">" => Ok(Self::Gt),
            ">=" => Ok(Self::Ge),
            "<" => Ok(Self::Lt),
            "<=" => Ok(Self::Le),
            _ => Err(()),
        }
    }
}

impl Operator {
    fn compare(&self, left: Decimal, right: Decimal) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
            Self::Lt => left < right,
            Self::Le => left <= right,
        }
    }
}

impl Condition {
    pub fn parse(input: &str) -> Result<Self, Error> {
        let fail = |reason: &str| invalid_policy_error(format!("condition `{}`: {}", input, reason));

        let tokens = tokenize(input).map_err(|reason| fail(&reason))?;
        let mut tokens = tokens.into_iter().peekable();
        let mut clauses = vec![];

        while tokens.peek().is_some() {
            if !clauses.is_empty() {
                match tokens.next() {
                    Some(Token::Word(word)) if word.eq_ignore_ascii_case("and") => {}
                    Some(Token::Symbol(symbol)) if symbol == "&&" => {}
                    _ => return Err(fail("expected `and` between clauses")),
                }
            }

            let field = match tokens.next() {
                Some(Token::Word(word)) => word
                    .parse::<Field>()
                    .map_err(|_| fail(&format!("unknown field `{}`", word)))?,
                _ => return Err(fail("expected a field name")),
            };

            let operator = match tokens.next() {
                Some(Token::Symbol(symbol)) => symbol
                    .parse::<Operator>()
                    .map_err(|_| fail(&format!("unknown operator `{}`", symbol)))?,
                _ => return Err(fail("expected a comparison operator")),
            };

            let value = match tokens.next() {
                Some(Token::Quoted(text)) => Value::Text(text.to_lowercase()),
                Some(Token::Word(word)) => match Decimal::from_str(&word) {
                    Ok(number) => Value::Number(number),
                    Err(_) => Value::Text(word.to_lowercase()),
                },
                _ => return Err(fail("expected a value")),
            };

            clauses.push(check_clause(field, operator, value).map_err(|reason| fail(&reason))?);
        }

        Ok(Self { clauses })
    }

    pub fn matches(&self, trip: &TripDescriptor<'_>) -> bool {
        self.clauses.iter().all(|clause| clause.matches(trip))
    }
}

fn check_clause(field: Field, operator: Operator, value: Value) -> Result<Clause, String> {
    match (&value, field.is_numeric()) {
        (Value::Number(_), true) => {}
        (Value::Text(_), false) if matches!(operator, Operator::Eq | Operator::Ne) => {}
        (Value::Text(_), false) => {
            return Err("text fields only support `==` and `!=`".into());
        }
        (Value::Text(text), true) => {
            return Err(format!("expected a number, got `{}`", text));
        }
        (Value::Number(number), false) => {
            return Err(format!("expected text, got `{}`", number));
        }
    }

    if let (Field::Weekday, Value::Text(text)) = (field, &value) {
        let index = WEEKDAYS
            .iter()
            .position(|day| *day == text.as_str())
            .or_else(|| WEEKDAY_NAMES.iter().position(|day| *day == text.as_str()))
            .ok_or_else(|| format!("unknown weekday `{}`", text))?;

        return Ok(Clause {
            field,
            operator,
            value: Value::Text(WEEKDAYS[index].to_string()),
        });
    }

    Ok(Clause {
        field,
        operator,
        value,
    })
}

impl Clause {
    fn matches(&self, trip: &TripDescriptor<'_>) -> bool {
        match &self.value {
            Value::Number(expected) => match self.numeric_fact(trip) {
                Some(actual) => self.operator.compare(actual, *expected),
                None => false,
            },
            Value::Text(expected) => {
                let found = self
                    .text_facts(trip)
                    .iter()
                    .any(|fact| fact.eq_ignore_ascii_case(expected));

                match self.operator {
                    Operator::Eq => found,
                    Operator::Ne => !found,
                    _ => false,
                }
            }
        }
    }

    fn numeric_fact(&self, trip: &TripDescriptor<'_>) -> Option<Decimal> {
        let fact = match self.field {
            Field::Distance => trip.distance,
            Field::Passengers => Decimal::from(trip.passengers),
            Field::Stops => Decimal::from(trip.stops),
            Field::Hours => trip.hours.unwrap_or(Decimal::ZERO),
            Field::CarSeats => Decimal::from(trip.car_seats),
            Field::BoosterSeats => Decimal::from(trip.booster_seats),
            Field::PickupHour => Decimal::from(trip.pickup_time.hour()),
            _ => return None,
        };

        Some(fact)
    }

    fn text_facts(&self, trip: &TripDescriptor<'_>) -> Vec<String> {
        match self.field {
            Field::Vehicle => vec![
                trip.vehicle.name.clone(),
                trip.vehicle.class.name().to_string(),
            ],
            Field::Package => trip
                .package
                .map(|package| vec![package.name.clone()])
                .unwrap_or_default(),
            Field::Weekday => {
                let index = trip.pickup_time.weekday().num_days_from_monday() as usize;
                WEEKDAYS
                    .get(index)
                    .map(|day| vec![day.to_string()])
                    .unwrap_or_default()
            }
            _ => vec![],
        }
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = vec![];
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' || c == '\'' {
            chars.next();
            let mut text = String::new();
            loop {
                match chars.next() {
                    Some(next) if next == c => break,
                    Some(next) => text.push(next),
                    None => return Err("unterminated string".into()),
                }
            }
            tokens.push(Token::Quoted(text));
        } else if is_symbol_char(c) {
            let mut symbol = String::new();
            while let Some(&next) = chars.peek() {
                if !is_symbol_char(next) {
                    break;
                }
                symbol.push(next);
                chars.next();
            }
            tokens.push(Token::Symbol(symbol));
        } else {
            let mut word = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() || is_symbol_char(next) || next == '"' || next == '\'' {
                    break;
                }
                word.push(next);
                chars.next();
            }
            tokens.push(Token::Word(word));
        }
    }

    Ok(tokens)
}

fn is_symbol_char(c: char) -> bool {
    matches!(c, '=' | '!' | '<' | '>' | '&')
}

#[cfg(test)]
fn sample_trip_matches(condition: &str) -> bool {
    use crate::entities::{Gratuity, PackagePricing, ServicePackage, Vehicle, VehicleClass};
    use chrono::NaiveDate;

    let vehicle = Vehicle::new("Escalade".into(), VehicleClass::Suv, 6).unwrap();
    let package = ServicePackage::new(
        "Wine Tour".into(),
        PackagePricing::Flat {
            price: Decimal::from(600),
        },
    )
    .unwrap();

    // 2026-10-16 is a Friday.
    let trip = TripDescriptor {
        distance: Decimal::from(52),
        pickup_time: NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(23, 15, 0)
            .unwrap(),
        vehicle: &vehicle,
        package: Some(&package),
        hours: Some(Decimal::from(4)),
        stops: 2,
        passengers: 5,
        car_seats: 1,
        booster_seats: 0,
        gratuity: &Gratuity::None,
    };

    Condition::parse(condition).unwrap().matches(&trip)
}

#[test]
fn empty_condition_always_matches() {
    assert!(sample_trip_matches(""));
    assert!(sample_trip_matches("   "));
}

#[test]
fn numeric_clauses_compare_trip_facts() {
    assert!(sample_trip_matches("distance > 50"));
    assert!(!sample_trip_matches("distance <= 50"));
    assert!(sample_trip_matches("passengers >= 5"));
    assert!(sample_trip_matches("stops == 2"));
    assert!(sample_trip_matches("hours = 4"));
    assert!(sample_trip_matches("car_seats != 0"));
    assert!(sample_trip_matches("booster_seats < 1"));
    assert!(sample_trip_matches("pickup_hour >= 22"));
}

#[test]
fn text_clauses_are_case_insensitive() {
    assert!(sample_trip_matches("vehicle == suv"));
    assert!(sample_trip_matches("vehicle == \"ESCALADE\""));
    assert!(sample_trip_matches("vehicle != sedan"));
    assert!(sample_trip_matches("package == 'wine tour'"));
    assert!(sample_trip_matches("weekday == Friday"));
    assert!(!sample_trip_matches("weekday == sat"));
}

#[test]
fn clauses_are_conjunctive() {
    assert!(sample_trip_matches("distance > 50 and vehicle == suv"));
    assert!(sample_trip_matches("distance > 50 && pickup_hour >= 22 AND stops >= 1"));
    assert!(!sample_trip_matches("distance > 50 and vehicle == sedan"));
}

#[test]
fn malformed_conditions_are_rejected() {
    for condition in [
        "distance >>> 5",
        "speed > 5",
        "distance > fast",
        "vehicle > suv",
        "vehicle == 5",
        "weekday == someday",
        "weekday == monkey",
        "distance > 5 or stops > 1",
        "distance >",
        "vehicle == \"suv",
    ] {
        assert!(
            Condition::parse(condition).is_err(),
            "`{}` should not parse",
            condition
        );
    }
}
