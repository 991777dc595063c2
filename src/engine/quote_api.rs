use super::helpers::{fetch_pricing_policy, fetch_quoted_package, fetch_quoted_vehicle};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor, Row};
use uuid::Uuid;

use crate::{
    api::QuoteAPI,
    auth::{Platform, User},
    entities::{Quote, TripQuoteRequest},
    error::{invalid_input_error, Error},
    pricing::{compute_price, TripDescriptor},
};

#[async_trait]
impl QuoteAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_quote(&self, user: User, request: TripQuoteRequest) -> Result<Quote, Error> {
        self.authorize(user.clone(), "create_quote", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let vehicle = fetch_quoted_vehicle(&mut conn, &request.vehicle_id).await?;
        let package = match request.package_id {
            Some(id) => Some(fetch_quoted_package(&mut conn, &id).await?),
            None => None,
        };

        // snapshot of the policy at quote time; the quote keeps this price
        let policy = fetch_pricing_policy(&mut conn).await?;

        let trip = TripDescriptor::resolve(&request, &vehicle, package.as_ref())?;
        let price = compute_price(&trip, &policy)?;

        tracing::info!(
            subtotal = %price.subtotal,
            total = %price.total,
            charged_total = %price.charged_total,
            "priced trip"
        );

        let quote = Quote::new(request, price);

        conn.execute(
            sqlx::query("INSERT INTO quotes (token, data) VALUES ($1, $2)")
                .bind(&quote.token)
                .bind(Json(&quote)),
        )
        .await?;

        Ok(quote)
    }

    #[tracing::instrument(skip(self))]
    async fn find_quote(&self, user: User, token: Uuid) -> Result<Quote, Error> {
        self.authorize(user.clone(), "create_quote", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM quotes WHERE token = $1").bind(&token))
            .await?;

        let result = maybe_result.ok_or_else(|| invalid_input_error())?;
        let Json(quote) = result.try_get("data")?;

        Ok(quote)
    }
}
