use super::helpers::{fetch_vehicle_for_update, update_vehicle};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::VehicleAPI,
    auth::{Platform, User},
    entities::{Vehicle, VehicleClass},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl VehicleAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_vehicle(
        &self,
        user: User,
        name: String,
        class: VehicleClass,
        passenger_capacity: u32,
    ) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), "manage_catalogue", Platform::default())?;

        let vehicle = Vehicle::new(name, class, passenger_capacity)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO vehicles (id, active, data) VALUES ($1, $2, $3)")
                .bind(&vehicle.id)
                .bind(vehicle.active)
                .bind(Json(&vehicle)),
        )
        .await?;

        Ok(vehicle)
    }

    #[tracing::instrument(skip(self))]
    async fn find_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), "read_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let Json(vehicle): Json<Vehicle> = conn
            .fetch_optional(sqlx::query("SELECT data FROM vehicles WHERE id = $1").bind(&id))
            .await?
            .ok_or_else(|| invalid_input_error())?
            .try_get("data")?;

        Ok(vehicle)
    }

    /// Admins see the whole fleet; everyone else only what can be quoted.
    #[tracing::instrument(skip(self))]
    async fn list_vehicles(&self, user: User) -> Result<Vec<Vehicle>, Error> {
        self.authorize(user.clone(), "read_catalogue", Platform::default())?;

        let include_inactive =
            self.authorizor
                .is_allowed(user.clone(), "manage_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM vehicles WHERE active OR $1 ORDER BY data->>'name' ASC",
                )
                .bind(include_inactive),
            )
            .await?;

        let mut vehicles = vec![];
        for result in results.iter() {
            let Json(vehicle): Json<Vehicle> = result.try_get("data")?;
            vehicles.push(vehicle);
        }

        Ok(vehicles)
    }

    #[tracing::instrument(skip(self))]
    async fn deactivate_vehicle(&self, user: User, id: Uuid) -> Result<Vehicle, Error> {
        self.authorize(user.clone(), "manage_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut vehicle = fetch_vehicle_for_update(&mut tx, &id).await?;
        vehicle.deactivate()?;
        update_vehicle(&mut tx, &vehicle).await?;

        tx.commit().await?;

        tracing::info!("vehicle {} deactivated", vehicle.id);

        Ok(vehicle)
    }
}
