use super::Database;

use sqlx::{types::Json, Executor, PgConnection, Row, Transaction};
use uuid::Uuid;

use crate::{
    entities::{Booking, PricingPolicy, ServicePackage, Vehicle},
    error::{invalid_input_error, invalid_request_error, Error},
};

pub const PRICING_POLICY_KEY: &str = "pricing_policy";

/// Reads the stored policy. A missing row prices with the defaults.
#[tracing::instrument(skip(conn))]
pub async fn fetch_pricing_policy(conn: &mut PgConnection) -> Result<PricingPolicy, Error> {
    let maybe_result = conn
        .fetch_optional(
            sqlx::query("SELECT data FROM settings WHERE name = $1").bind(PRICING_POLICY_KEY),
        )
        .await?;

    match maybe_result {
        Some(result) => {
            let Json(policy): Json<PricingPolicy> = result.try_get("data")?;
            Ok(policy)
        }
        None => {
            tracing::warn!("no pricing policy stored, using defaults");
            Ok(PricingPolicy::default())
        }
    }
}

/// Vehicle referenced by a quote request; unknown ids are a request error.
#[tracing::instrument(skip(conn))]
pub async fn fetch_quoted_vehicle(conn: &mut PgConnection, id: &Uuid) -> Result<Vehicle, Error> {
    let Json(vehicle): Json<Vehicle> = conn
        .fetch_optional(sqlx::query("SELECT data FROM vehicles WHERE id = $1").bind(id))
        .await?
        .ok_or_else(|| invalid_request_error(format!("unknown vehicle {}", id)))?
        .try_get("data")?;

    Ok(vehicle)
}

#[tracing::instrument(skip(conn))]
pub async fn fetch_quoted_package(
    conn: &mut PgConnection,
    id: &Uuid,
) -> Result<ServicePackage, Error> {
    let Json(package): Json<ServicePackage> = conn
        .fetch_optional(sqlx::query("SELECT data FROM packages WHERE id = $1").bind(id))
        .await?
        .ok_or_else(|| invalid_request_error(format!("unknown service package {}", id)))?
        .try_get("data")?;

    Ok(package)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_vehicle_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Vehicle, Error> {
    let Json(vehicle): Json<Vehicle> = tx
        .fetch_optional(sqlx::query("SELECT data FROM vehicles WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| invalid_input_error())?
        .try_get("data")?;

    Ok(vehicle)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_package_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<ServicePackage, Error> {
    let Json(package): Json<ServicePackage> = tx
        .fetch_optional(sqlx::query("SELECT data FROM packages WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| invalid_input_error())?
        .try_get("data")?;

    Ok(package)
}

#[tracing::instrument(skip(tx))]
pub async fn fetch_booking_for_update(
    tx: &mut Transaction<'_, Database>,
    id: &Uuid,
) -> Result<Booking, Error> {
    let Json(booking): Json<Booking> = tx
        .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1 FOR UPDATE").bind(id))
        .await?
        .ok_or_else(|| invalid_input_error())?
        .try_get("data")?;

    Ok(booking)
}

#[tracing::instrument(skip(tx))]
pub async fn update_vehicle(
    tx: &mut Transaction<'_, Database>,
    vehicle: &Vehicle,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE vehicles SET active = $2, data = $3 WHERE id = $1")
            .bind(&vehicle.id)
            .bind(vehicle.active)
            .bind(Json(vehicle)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_package(
    tx: &mut Transaction<'_, Database>,
    package: &ServicePackage,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE packages SET active = $2, data = $3 WHERE id = $1")
            .bind(&package.id)
            .bind(package.active)
            .bind(Json(package)),
    )
    .await?;

    Ok(())
}

#[tracing::instrument(skip(tx))]
pub async fn update_booking(
    tx: &mut Transaction<'_, Database>,
    booking: &Booking,
) -> Result<(), Error> {
    tx.execute(
        sqlx::query("UPDATE bookings SET status = $2, driver_id = $3, data = $4 WHERE id = $1")
            .bind(&booking.id)
            .bind(booking.status.name())
            .bind(&booking.driver_id)
            .bind(Json(booking)),
    )
    .await?;

    Ok(())
}
