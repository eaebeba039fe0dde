mod applications;
mod leases;
mod managers;
mod properties;
mod tenants;

use std::{sync::Arc, time::Instant};

use anyhow::Context;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, MethodRouter},
    Router,
};
use log::info;
use tokio::{net::TcpListener, sync::broadcast};

use crate::{
    auth::{require_roles, AuthGuard, Role},
    config::Config,
    db::Repository,
    error::AppError,
    geocoder::Geocoder,
};

const TENANT: &[Role] = &[Role::Tenant];
const MANAGER: &[Role] = &[Role::Manager];
const ANY_USER: &[Role] = &[Role::Manager, Role::Tenant];

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub repo: Arc<dyn Repository>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl AppState {
    /// Runs `f` against the repository on the blocking pool.
    async fn blocking<T, F>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&dyn Repository) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let repo = self.repo.clone();
        tokio::task::spawn_blocking(move || f(repo.as_ref()))
            .await
            .map_err(|err| AppError::internal("Request worker failed", err))?
    }
}

/// Only callers whose token carries one of `roles` reach `method_router`.
fn guarded(
    method_router: MethodRouter<AppState>,
    roles: &'static [Role],
    secret: Option<&str>,
) -> MethodRouter<AppState> {
    method_router.route_layer(middleware::from_fn_with_state(
        AuthGuard::new(roles, secret),
        require_roles,
    ))
}

pub fn router(state: AppState) -> Router {
    let secret = state.config.auth_hmac_secret.clone();
    let secret = secret.as_deref();

    Router::new()
        .route("/", get(hello))
        .merge(properties::routes(secret))
        .merge(tenants::routes(secret))
        .merge(managers::routes(secret))
        .merge(leases::routes(secret))
        .merge(applications::routes(secret))
        .layer(middleware::from_fn(log_requests))
        .layer(middleware::from_fn(cors_layer))
        .with_state(state)
}

pub async fn start_http_server(
    state: AppState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> anyhow::Result<()> {
    let bind_addr = state.config.http_bind_address.clone();

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind http listener on {bind_addr}"))?;
    info!("Server is running on {bind_addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
        })
        .await
        .context("HTTP server crashed")
}

async fn hello() -> &'static str {
    "Hello World"
}

async fn log_requests(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;
    info!(
        "{method} {path} {} {}",
        response.status().as_u16(),
        humantime::format_duration(started.elapsed())
    );
    response
}

async fn cors_layer(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        apply_cors_headers(response.headers_mut());
        *response.status_mut() = StatusCode::NO_CONTENT;
        response
    } else {
        let mut response = next.run(req).await;
        apply_cors_headers(response.headers_mut());
        response
    }
}

fn apply_cors_headers(headers: &mut axum::http::HeaderMap) {
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, content-type"),
    );
    headers.insert(
        axum::http::header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
}
