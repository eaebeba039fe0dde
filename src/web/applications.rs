use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;

use super::{guarded, AppState, ANY_USER, MANAGER, TENANT};
use crate::{
    error::AppError,
    models::application::{
        ApplicationDetails, ApplicationFilter, ApplicationListing, CreateApplicationRequest,
        StatusUpdate,
    },
    services::applications,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    user_id: Option<String>,
    user_type: Option<String>,
}

pub fn routes(secret: Option<&str>) -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            guarded(get(list_applications), ANY_USER, secret)
                .merge(guarded(post(create_application), TENANT, secret)),
        )
        .route(
            "/applications/:id/status",
            guarded(put(update_application_status), MANAGER, secret),
        )
}

async fn list_applications(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ApplicationListing>>, AppError> {
    let filter = ApplicationFilter::from_query(query.user_id.as_deref(), query.user_type.as_deref());
    state
        .blocking(move |repo| applications::list(repo, &filter, Utc::now()))
        .await
        .map(Json)
}

async fn create_application(
    State(state): State<AppState>,
    Json(request): Json<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<ApplicationDetails>), AppError> {
    state
        .blocking(move |repo| applications::create(repo, request, Utc::now()))
        .await
        .map(|details| (StatusCode::CREATED, Json(details)))
}

async fn update_application_status(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(StatusUpdate { status }): Json<StatusUpdate>,
) -> Result<Json<ApplicationDetails>, AppError> {
    state
        .blocking(move |repo| applications::update_status(repo, id, status, Utc::now()))
        .await
        .map(Json)
}
