use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::{guarded, AppState, TENANT};
use crate::{
    error::AppError,
    models::{
        profile::{NewProfile, ProfileChanges},
        property::PropertyWithLocation,
        tenant::{Tenant, TenantWithFavorites},
    },
    services::tenants,
};

pub fn routes(secret: Option<&str>) -> Router<AppState> {
    Router::new()
        .route("/tenants", guarded(post(create_tenant), TENANT, secret))
        .route(
            "/tenants/:cognito_id",
            guarded(get(get_tenant).put(update_tenant), TENANT, secret),
        )
        .route(
            "/tenants/:cognito_id/current-residences",
            guarded(get(current_residences), TENANT, secret),
        )
        .route(
            "/tenants/:cognito_id/favorites/:property_id",
            guarded(
                post(add_favorite).delete(remove_favorite),
                TENANT,
                secret,
            ),
        )
}

async fn get_tenant(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
) -> Result<Json<TenantWithFavorites>, AppError> {
    state
        .blocking(move |repo| tenants::get(repo, &cognito_id))
        .await
        .map(Json)
}

async fn create_tenant(
    State(state): State<AppState>,
    Json(profile): Json<NewProfile>,
) -> Result<(StatusCode, Json<Tenant>), AppError> {
    state
        .blocking(move |repo| tenants::create(repo, profile))
        .await
        .map(|tenant| (StatusCode::CREATED, Json(tenant)))
}

async fn update_tenant(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<Tenant>, AppError> {
    state
        .blocking(move |repo| tenants::update(repo, &cognito_id, changes))
        .await
        .map(Json)
}

async fn current_residences(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
) -> Result<Json<Vec<PropertyWithLocation>>, AppError> {
    state
        .blocking(move |repo| tenants::current_residences(repo, &cognito_id))
        .await
        .map(Json)
}

async fn add_favorite(
    State(state): State<AppState>,
    Path((cognito_id, property_id)): Path<(String, i32)>,
) -> Result<Json<TenantWithFavorites>, AppError> {
    state
        .blocking(move |repo| tenants::add_favorite(repo, &cognito_id, property_id))
        .await
        .map(Json)
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path((cognito_id, property_id)): Path<(String, i32)>,
) -> Result<Json<TenantWithFavorites>, AppError> {
    state
        .blocking(move |repo| tenants::remove_favorite(repo, &cognito_id, property_id))
        .await
        .map(Json)
}
