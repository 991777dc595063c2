use super::helpers::{fetch_package_for_update, update_package};
use super::Engine;

use async_trait::async_trait;
use sqlx::{types::Json, Acquire, Executor, Row};
use uuid::Uuid;

use crate::{
    api::PackageAPI,
    auth::{Platform, User},
    entities::{PackagePricing, ServicePackage},
    error::{invalid_input_error, Error},
};

#[async_trait]
impl PackageAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn create_package(
        &self,
        user: User,
        name: String,
        pricing: PackagePricing,
    ) -> Result<ServicePackage, Error> {
        self.authorize(user.clone(), "manage_catalogue", Platform::default())?;

        let package = ServicePackage::new(name, pricing)?;

        let mut conn = self.pool.acquire().await?;

        conn.execute(
            sqlx::query("INSERT INTO packages (id, active, data) VALUES ($1, $2, $3)")
                .bind(&package.id)
                .bind(package.active)
                .bind(Json(&package)),
        )
        .await?;

        Ok(package)
    }

    #[tracing::instrument(skip(self))]
    async fn find_package(&self, user: User, id: Uuid) -> Result<ServicePackage, Error> {
        self.authorize(user.clone(), "read_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let maybe_result = conn
            .fetch_optional(sqlx::query("SELECT data FROM packages WHERE id = $1").bind(&id))
            .await?;

        let result = maybe_result.ok_or_else(|| invalid_input_error())?;
        let Json(package) = result.try_get("data")?;

        Ok(package)
    }

    #[tracing::instrument(skip(self))]
    async fn list_packages(&self, user: User) -> Result<Vec<ServicePackage>, Error> {
        self.authorize(user.clone(), "read_catalogue", Platform::default())?;

        let include_inactive =
            self.authorizor
                .is_allowed(user.clone(), "manage_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;

        let results = conn
            .fetch_all(
                sqlx::query(
                    "SELECT data FROM packages WHERE active OR $1 ORDER BY data->>'name' ASC",
                )
                .bind(include_inactive),
            )
            .await?;

        let mut packages = vec![];
        for result in results.iter() {
            let Json(package): Json<ServicePackage> = result.try_get("data")?;
            packages.push(package);
        }

        Ok(packages)
    }

    #[tracing::instrument(skip(self))]
    async fn deactivate_package(&self, user: User, id: Uuid) -> Result<ServicePackage, Error> {
        self.authorize(user.clone(), "manage_catalogue", Platform::default())?;

        let mut conn = self.pool.acquire().await?;
        let mut tx = conn.begin().await?;

        let mut package = fetch_package_for_update(&mut tx, &id).await?;
        package.deactivate()?;
        update_package(&mut tx, &package).await?;

        tx.commit().await?;

        tracing::info!("service package {} deactivated", package.id);

        Ok(package)
    }
}
