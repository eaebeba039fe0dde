use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use super::{guarded, AppState, ANY_USER};
use crate::{
    error::AppError,
    models::{lease::LeaseDetails, payment::Payment},
    services::leases,
};

pub fn routes(secret: Option<&str>) -> Router<AppState> {
    Router::new()
        .route("/leases", guarded(get(list_leases), ANY_USER, secret))
        .route(
            "/leases/:id/payments",
            guarded(get(lease_payments), ANY_USER, secret),
        )
}

async fn list_leases(State(state): State<AppState>) -> Result<Json<Vec<LeaseDetails>>, AppError> {
    state.blocking(|repo| leases::list(repo)).await.map(Json)
}

async fn lease_payments(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Vec<Payment>>, AppError> {
    state
        .blocking(move |repo| leases::payments(repo, id))
        .await
        .map(Json)
}
