use axum::extract::{Extension, Json, Path};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::User;
use crate::entities::{Vehicle, VehicleClass};
use crate::error::Error;
use crate::server::DynAPI;

#[derive(Serialize, Deserialize)]
pub struct CreateParams {
    name: String,
    class: VehicleClass,
    passenger_capacity: u32,
}

pub async fn create(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(params): Json<CreateParams>,
) -> Result<Json<Vehicle>, Error> {
    let vehicle = api
        .create_vehicle(user, params.name, params.class, params.passenger_capacity)
        .await?;

    Ok(vehicle.into())
}

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, Error> {
    let vehicle = api.find_vehicle(user, id).await?;

    Ok(vehicle.into())
}

pub async fn list(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<Vec<Vehicle>>, Error> {
    let vehicles = api.list_vehicles(user).await?;

    Ok(vehicles.into())
}

pub async fn deactivate(
    Extension(api): Extension<DynAPI>,
    user: User,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, Error> {
    let vehicle = api.deactivate_vehicle(user, id).await?;

    Ok(vehicle.into())
}
