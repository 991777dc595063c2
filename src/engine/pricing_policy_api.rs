use super::helpers::{fetch_pricing_policy, PRICING_POLICY_KEY};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Executor};

use crate::{
    api::PricingPolicyAPI,
    auth::{Platform, User},
    entities::PricingPolicy,
    error::Error,
};

#[async_trait]
impl PricingPolicyAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn initialize_pricing_policy(&self) -> Result<PricingPolicy, Error> {
        let mut conn = self.pool.acquire().await?;

        let result = conn
            .execute(
                sqlx::query(
                    "INSERT INTO settings (name, data) VALUES ($1, $2) ON CONFLICT (name) DO NOTHING",
                )
                .bind(PRICING_POLICY_KEY)
                .bind(Json(PricingPolicy::default())),
            )
            .await?;

        if result.rows_affected() > 0 {
            tracing::info!("stored default pricing policy");
        }

        let policy = fetch_pricing_policy(&mut conn).await?;

        if let Err(err) = policy.validate() {
            tracing::warn!("stored pricing policy is invalid: {}", err.message);
        }

        Ok(policy)
    }

    #[tracing::instrument(skip(self))]
    async fn find_pricing_policy(&self, user: User) -> Result<PricingPolicy, Error> {
        self.authorize(user.clone(), "read_pricing_policy", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        fetch_pricing_policy(&mut conn).await
    }

    #[tracing::instrument(skip(self, policy))]
    async fn update_pricing_policy(
        &self,
        user: User,
        policy: PricingPolicy,
    ) -> Result<PricingPolicy, Error> {
        self.authorize(user.clone(), "update_pricing_policy", Platform::default())?;

        policy.validate()?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query(
                "INSERT INTO settings (name, data) VALUES ($1, $2) ON CONFLICT (name) DO UPDATE SET data = EXCLUDED.data, updated_at = now()",
            )
            .bind(PRICING_POLICY_KEY)
            .bind(Json(&policy)),
        )
        .await?;

        tracing::info!(updated_by = %user.id, "pricing policy updated");

        Ok(policy)
    }
}
