mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::error::{server_error, Error};
use crate::server::handlers::{bookings, packages, pricing_policy, quotes, vehicles};

type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router<T: API + Sync + Send + 'static>(api: T) -> Router {
    let api = Arc::new(api) as DynAPI;

    Router::new()
        .route(
            "/settings/pricing",
            get(pricing_policy::find).put(pricing_policy::update),
        )
        .route("/quotes", post(quotes::create))
        .route("/quotes/:token", get(quotes::find))
        .route("/vehicles", post(vehicles::create).get(vehicles::list))
        .route("/vehicles/:id", get(vehicles::find))
        .route("/vehicles/:id/deactivate", patch(vehicles::deactivate))
        .route("/packages", post(packages::create).get(packages::list))
        .route("/packages/:id", get(packages::find))
        .route("/packages/:id/deactivate", patch(packages::deactivate))
        .route("/bookings", post(bookings::create))
        .route("/bookings/:id", get(bookings::find))
        .route("/bookings/:id/confirm", patch(bookings::confirm))
        .route("/bookings/:id/driver", patch(bookings::assign_driver))
        .route("/bookings/:id/complete", patch(bookings::complete))
        .route("/bookings/:id/cancel", patch(bookings::cancel))
        .route("/driver/bookings", get(bookings::list_for_driver))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) -> Result<(), Error> {
    let app = router(api);

    tracing::info!("listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
        .map_err(server_error)
}
