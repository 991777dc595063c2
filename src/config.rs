use std::env;
use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::error::{config_error, Error};

pub const DEFAULT_MAX_CONNECTIONS: &str = "5";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub listen_addr: SocketAddr,
}

impl Config {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, Error> {
        if dotenv::dotenv().is_err() {
            tracing::info!("no .env file found, reading process environment only");
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: parse_or(
                "DATABASE_MAX_CONNECTIONS",
                env::var("DATABASE_MAX_CONNECTIONS").ok(),
                DEFAULT_MAX_CONNECTIONS,
            )?,
            listen_addr: parse_or("LISTEN_ADDR", env::var("LISTEN_ADDR").ok(), DEFAULT_LISTEN_ADDR)?,
        })
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = value.unwrap_or_else(|| {
        tracing::info!("{} not set, using default: {}", key, default);
        default.to_string()
    });

    raw.trim().parse().map_err(|e| {
        tracing::warn!("invalid {} value: {}", key, e);
        config_error(key)
    })
}

#[test]
fn unset_values_fall_back_to_defaults() {
    let max: u32 = parse_or("DATABASE_MAX_CONNECTIONS", None, DEFAULT_MAX_CONNECTIONS).unwrap();
    assert_eq!(max, 5);

    let addr: SocketAddr = parse_or("LISTEN_ADDR", None, DEFAULT_LISTEN_ADDR).unwrap();
    assert_eq!(addr, SocketAddr::from(([127, 0, 0, 1], 3000)));
}

#[test]
fn set_values_override_defaults() {
    let max: u32 = parse_or("DATABASE_MAX_CONNECTIONS", Some(" 20 ".into()), "5").unwrap();
    assert_eq!(max, 20);

    let addr: SocketAddr = parse_or("LISTEN_ADDR", Some("0.0.0.0:8080".into()), "x").unwrap();
    assert_eq!(addr.port(), 8080);
}

#[test]
fn malformed_values_are_config_errors() {
    let err = parse_or::<u32>("DATABASE_MAX_CONNECTIONS", Some("many".into()), "5").unwrap_err();
    assert_eq!(err, config_error("DATABASE_MAX_CONNECTIONS"));
}
