use anyhow::{Context, Result};
use log::debug;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use super::filters::FilterState;
use crate::models::{
    application::{
        ApplicationDetails, ApplicationListing, CreateApplicationRequest, StatusUpdate,
    },
    enums::ApplicationStatus,
    lease::LeaseDetails,
    manager::Manager,
    payment::Payment,
    profile::ProfileChanges,
    property::PropertyWithLocation,
    tenant::{Tenant, TenantWithFavorites},
};

/// Query parameters of `GET /properties` for the given filters. Filters left
/// at "any" are omitted.
pub fn search_params(filters: &FilterState, favorite_ids: &[i32]) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    let mut push = |key: &'static str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            params.push((key, value));
        }
    };

    push("location", Some(filters.location.clone()));
    push("priceMin", filters.price_range.min.map(|v| v.to_string()));
    push("priceMax", filters.price_range.max.map(|v| v.to_string()));
    push("beds", filters.beds.map(|v| v.to_string()));
    push("baths", filters.baths.map(|v| v.to_string()));
    push(
        "propertyType",
        filters.property_type.map(|v| v.as_str().to_string()),
    );
    push("squareFeetMin", filters.square_feet.min.map(|v| v.to_string()));
    push("squareFeetMax", filters.square_feet.max.map(|v| v.to_string()));
    push(
        "favoritesIds",
        Some(
            favorite_ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(","),
        ),
    );
    push(
        "amenities",
        Some(
            filters
                .amenities
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(","),
        ),
    );
    push(
        "availableFrom",
        filters
            .available_from
            .map(|d| d.format("%Y-%m-%d").to_string()),
    );
    push("latitude", Some(filters.coordinates.latitude.to_string()));
    push("longitude", Some(filters.coordinates.longitude.to_string()));

    params
}

/// Typed client for the rentals HTTP API.
pub struct ApiClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        }
    }

    /// Sends `token` as a bearer token on every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, what: &str) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("Request for {what} failed"))?
            .error_for_status()
            .with_context(|| format!("Server rejected request for {what}"))?;
        debug!("Fetched {what}");
        response
            .json()
            .await
            .with_context(|| format!("Malformed response for {what}"))
    }

    pub async fn get_properties(
        &self,
        filters: &FilterState,
        favorite_ids: &[i32],
    ) -> Result<Vec<PropertyWithLocation>> {
        let builder = self
            .request(reqwest::Method::GET, "/properties")
            .query(&search_params(filters, favorite_ids));
        self.send(builder, "properties").await
    }

    pub async fn get_property(&self, id: i32) -> Result<PropertyWithLocation> {
        let builder = self.request(reqwest::Method::GET, &format!("/properties/{id}"));
        self.send(builder, "property").await
    }

    pub async fn get_tenant(&self, cognito_id: &str) -> Result<TenantWithFavorites> {
        let builder = self.request(reqwest::Method::GET, &format!("/tenants/{cognito_id}"));
        self.send(builder, "tenant").await
    }

    pub async fn update_tenant(&self, cognito_id: &str, changes: &ProfileChanges) -> Result<Tenant> {
        let builder = self
            .request(reqwest::Method::PUT, &format!("/tenants/{cognito_id}"))
            .json(changes);
        self.send(builder, "tenant update").await
    }

    pub async fn get_current_residences(
        &self,
        cognito_id: &str,
    ) -> Result<Vec<PropertyWithLocation>> {
        let builder = self.request(
            reqwest::Method::GET,
            &format!("/tenants/{cognito_id}/current-residences"),
        );
        self.send(builder, "current residences").await
    }

    pub async fn add_favorite(
        &self,
        cognito_id: &str,
        property_id: i32,
    ) -> Result<TenantWithFavorites> {
        let builder = self.request(
            reqwest::Method::POST,
            &format!("/tenants/{cognito_id}/favorites/{property_id}"),
        );
        self.send(builder, "favorite").await
    }

    pub async fn remove_favorite(
        &self,
        cognito_id: &str,
        property_id: i32,
    ) -> Result<TenantWithFavorites> {
        let builder = self.request(
            reqwest::Method::DELETE,
            &format!("/tenants/{cognito_id}/favorites/{property_id}"),
        );
        self.send(builder, "favorite removal").await
    }

    pub async fn get_manager(&self, cognito_id: &str) -> Result<Manager> {
        let builder = self.request(reqwest::Method::GET, &format!("/managers/{cognito_id}"));
        self.send(builder, "manager").await
    }

    pub async fn get_manager_properties(
        &self,
        cognito_id: &str,
    ) -> Result<Vec<PropertyWithLocation>> {
        let builder = self.request(
            reqwest::Method::GET,
            &format!("/managers/{cognito_id}/properties"),
        );
        self.send(builder, "manager properties").await
    }

    pub async fn get_leases(&self) -> Result<Vec<LeaseDetails>> {
        let builder = self.request(reqwest::Method::GET, "/leases");
        self.send(builder, "leases").await
    }

    pub async fn get_payments(&self, lease_id: i32) -> Result<Vec<Payment>> {
        let builder = self.request(reqwest::Method::GET, &format!("/leases/{lease_id}/payments"));
        self.send(builder, "payments").await
    }

    pub async fn get_applications(
        &self,
        user_id: &str,
        user_type: &str,
    ) -> Result<Vec<ApplicationListing>> {
        let builder = self
            .request(reqwest::Method::GET, "/applications")
            .query(&[("userId", user_id), ("userType", user_type)]);
        self.send(builder, "applications").await
    }

    pub async fn create_application(
        &self,
        application: &CreateApplicationRequest,
    ) -> Result<ApplicationDetails> {
        let builder = self
            .request(reqwest::Method::POST, "/applications")
            .json(application);
        self.send(builder, "new application").await
    }

    pub async fn update_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<ApplicationDetails> {
        let builder = self
            .request(reqwest::Method::PUT, &format!("/applications/{id}/status"))
            .json(&StatusUpdate { status });
        self.send(builder, "application status").await
    }
}
