use axum::extract::{Extension, Json};

use crate::auth::User;
use crate::entities::PricingPolicy;
use crate::error::Error;
use crate::server::DynAPI;

pub async fn find(
    Extension(api): Extension<DynAPI>,
    user: User,
) -> Result<Json<PricingPolicy>, Error> {
    let policy = api.find_pricing_policy(user).await?;

    Ok(policy.into())
}

pub async fn update(
    Extension(api): Extension<DynAPI>,
    user: User,
    Json(policy): Json<PricingPolicy>,
) -> Result<Json<PricingPolicy>, Error> {
    let policy = api.update_pricing_policy(user, policy).await?;

    Ok(policy.into())
}
