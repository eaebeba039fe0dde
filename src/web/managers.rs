use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::{guarded, AppState, MANAGER};
use crate::{
    error::AppError,
    models::{
        manager::Manager,
        profile::{NewProfile, ProfileChanges},
        property::PropertyWithLocation,
    },
    services::managers,
};

pub fn routes(secret: Option<&str>) -> Router<AppState> {
    Router::new()
        .route("/managers", guarded(post(create_manager), MANAGER, secret))
        .route(
            "/managers/:cognito_id",
            guarded(get(get_manager).put(update_manager), MANAGER, secret),
        )
        .route(
            "/managers/:cognito_id/properties",
            guarded(get(manager_properties), MANAGER, secret),
        )
}

async fn get_manager(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
) -> Result<Json<Manager>, AppError> {
    state
        .blocking(move |repo| managers::get(repo, &cognito_id))
        .await
        .map(Json)
}

async fn create_manager(
    State(state): State<AppState>,
    Json(profile): Json<NewProfile>,
) -> Result<(StatusCode, Json<Manager>), AppError> {
    state
        .blocking(move |repo| managers::create(repo, profile))
        .await
        .map(|manager| (StatusCode::CREATED, Json(manager)))
}

async fn update_manager(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
    Json(changes): Json<ProfileChanges>,
) -> Result<Json<Manager>, AppError> {
    state
        .blocking(move |repo| managers::update(repo, &cognito_id, changes))
        .await
        .map(Json)
}

async fn manager_properties(
    State(state): State<AppState>,
    Path(cognito_id): Path<String>,
) -> Result<Json<Vec<PropertyWithLocation>>, AppError> {
    state
        .blocking(move |repo| managers::properties(repo, &cognito_id))
        .await
        .map(Json)
}
