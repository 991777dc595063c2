use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{PackagePricing, ServicePackage};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    name: String,
    pricing: PackagePricing,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<ServicePackage>, Error> {
    let package = api.create_package(user, params.name, params.pricing).await?;

    Ok(package.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<ServicePackage>, Error> {
    let package = api.find_package(user, id).await?;

    Ok(package.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<ServicePackage>>, Error> {
    let packages = api.list_packages(user).await?;

    Ok(packages.into())
}

pub async fn deactivate(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<ServicePackage>, Error> {
    let package = api.deactivate_package(user, id).await?;

    Ok(package.into())
}
