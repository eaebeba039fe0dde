use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use super::{guarded, AppState, MANAGER};
use crate::{
    error::AppError,
    models::{
        location::{Address, Coordinates},
        property::{CreatePropertyRequest, PropertyWithLocation},
    },
    search::SearchParams,
    services::properties,
};

pub fn routes(secret: Option<&str>) -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(search_properties).merge(guarded(post(create_property), MANAGER, secret)),
        )
        .route("/properties/:id", get(get_property))
}

async fn search_properties(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<PropertyWithLocation>>, AppError> {
    let radius_km = state.config.search_radius_km;
    state
        .blocking(move |repo| properties::search(repo, &params, radius_km))
        .await
        .map(Json)
}

async fn get_property(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PropertyWithLocation>, AppError> {
    state
        .blocking(move |repo| properties::get(repo, id))
        .await
        .map(Json)
}

async fn create_property(
    State(state): State<AppState>,
    Json(request): Json<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<PropertyWithLocation>), AppError> {
    let address = Address {
        street: request.address.clone(),
        city: request.city.clone(),
        state: request.state.clone(),
        country: request.country.clone(),
        postal_code: request.postal_code.clone(),
    };

    let coordinates = match (request.longitude, request.latitude) {
        (Some(longitude), Some(latitude)) => Coordinates::new(longitude, latitude),
        _ => state
            .geocoder
            .geocode(&address)
            .await
            .map_err(|err| AppError::internal("Error creating property", err))?,
    };

    let location = address.into_location(coordinates);
    state
        .blocking(move |repo| properties::create(repo, &request, location))
        .await
        .map(|property| (StatusCode::CREATED, Json(property)))
}
