use super::helpers::{fetch_booking_for_update, update_booking};
use super::Engine;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::{BookingAPI, QuoteAPI},
    auth::{Platform, User},
    entities::{Booking, Canceller},
    error::{expired_quote_error, invalid_input_error, invalid_invocation_error, Error},
};

#[async_trait]
impl BookingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_booking(&self, user: User, quote_token: Uuid) -> Result<Booking, Error> {
        self.authorize(user.clone(), "create_booking", Platform::default())?;

        let quote = self.find_quote(user.clone(), quote_token).await?;

        if quote.is_expired_at(Utc::now()) {
            tracing::info!("quote expired at {}, refusing to book", quote.expires_at);
            return Err(expired_quote_error());
        }

        let booking = Booking::new(user.id, quote);

        let mut conn = self.pool.acquire().await?;

        // a quote can be booked at most once
        let result = conn
            .execute(
                sqlx::query(
                    "INSERT INTO bookings (id, status, customer_id, driver_id, quote_token, total, data) VALUES ($1, $2, $3, $4, $5, $6, $7) ON CONFLICT (quote_token) DO NOTHING",
                )
                .bind(&booking.id)
                .bind(booking.status.name())
                .bind(&booking.customer_id)
                .bind(&booking.driver_id)
                .bind(&booking.quote_token)
                .bind(booking.price.charged_total)
                .bind(Json(&booking)),
            )
            .await?;

        if result.rows_affected() == 0 {
            tracing::info!("quote has already been booked");
            return Err(invalid_invocation_error());
        }

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn find_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM bookings WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(|| invalid_input_error())?;
        let Json(booking): Json<Booking> = result.try_get("data")?;

        self.authorize(user.clone(), "read", booking.clone())?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn confirm_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "confirm", booking.clone())?;

        booking.confirm()?;
        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn assign_driver(
        &self,
        user: User,
        id: Uuid,
        driver_id: Uuid,
    ) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "assign_driver", booking.clone())?;

        if let Some(previous) = booking.assign_driver(driver_id)? {
            tracing::info!("driver {} replaced by {}", previous, driver_id);
        }

        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn complete_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "complete", booking.clone())?;

        booking.complete()?;
        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel_booking(&self, user: User, id: Uuid) -> Result<Booking, Error> {
        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut booking = fetch_booking_for_update(&mut tx, &id).await?;
        self.authorize(user.clone(), "cancel", booking.clone())?;

        let cancelled_by = if booking.customer_id == user.id {
            Canceller::Customer
        } else {
            Canceller::Admin
        };

        booking.cancel(cancelled_by)?;
        update_booking(&mut tx, &booking).await?;

        tx.commit().await?;

        Ok(booking)
    }

    #[tracing::instrument(skip(self))]
    async fn list_driver_bookings(&self, user: User) -> Result<Vec<Booking>, Error> {
        self.authorize(user.clone(), "read_driver_bookings", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM bookings WHERE driver_id = $1 AND status = 'driver_assigned' ORDER BY data->'request'->>'pickupTime' ASC",
                )
                .bind(&user.id),
            )
            .await?;

        let mut bookings = vec![];
        for result in results.iter() {
            let Json(booking): Json<Booking> = result.try_get("data")?;
            bookings.push(booking);
        }

        Ok(bookings)
    }
}
