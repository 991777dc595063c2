mod booking_api;
mod helpers;
mod package_api;
mod pricing_policy_api;
mod quote_api;
mod vehicle_api;

use oso::Oso;
use sqlx::{Executor, Pool, Postgres};

use crate::{
    api::{PricingPolicyAPI, API},
    auth::authorizor,
    error::{unauthorized_error, Error},
};

type Database = Postgres;

pub struct Engine {
    pool: Pool<Database>,
    authorizor: Oso,
}

impl Engine {
    #[tracing::instrument(name = "Engine::new", skip_all)]
    pub async fn new(pool: Pool<Database>) -> Result<Self, Error> {
        // pricing policy service (singleton KV store)
        pool.execute("CREATE TABLE IF NOT EXISTS settings (name VARCHAR PRIMARY KEY, data JSONB NOT NULL, updated_at TIMESTAMPTZ NOT NULL DEFAULT now())")
            .await?;

        // catalogue services (KV store)
        pool.execute("CREATE TABLE IF NOT EXISTS vehicles (id UUID PRIMARY KEY, active BOOLEAN NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE TABLE IF NOT EXISTS packages (id UUID PRIMARY KEY, active BOOLEAN NOT NULL, data JSONB NOT NULL)")
            .await?;

        // quote service (KV store)
        pool.execute("CREATE TABLE IF NOT EXISTS quotes (token UUID PRIMARY KEY, data JSONB NOT NULL)")
            .await?;

        // booking service
        pool.execute("CREATE TABLE IF NOT EXISTS bookings (id UUID PRIMARY KEY, status VARCHAR NOT NULL, customer_id UUID NOT NULL, driver_id UUID, quote_token UUID NOT NULL UNIQUE, total NUMERIC NOT NULL, data JSONB NOT NULL)")
            .await?;
        pool.execute("CREATE INDEX IF NOT EXISTS bookings_driver_id_idx ON bookings (driver_id)")
            .await?;

        let engine = Self {
            pool,
            authorizor: authorizor::new()?,
        };

        engine.initialize_pricing_policy().await?;

        Ok(engine)
    }
}

impl Engine {
    pub fn authorize<Actor, Action, Resource>(
        &self,
        actor: Actor,
        action: Action,
        resource: Resource,
    ) -> Result<(), Error>
    where
        Actor: oso::ToPolar,
        Action: oso::ToPolar,
        Resource: oso::ToPolar,
    {
        if self.authorizor.is_allowed(actor, action, resource)? {
            return Ok(());
        }

        Err(unauthorized_error())
    }
}

impl API for Engine {}
