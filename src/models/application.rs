use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{
    enums::ApplicationStatus,
    lease::{Lease, LeaseWithNextPayment},
    manager::Manager,
    property::PropertyWithLocation,
    tenant::Tenant,
};
use crate::db::schema::applications;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = applications)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: i32,
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub property_id: i32,
    pub tenant_cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: Option<String>,
    pub lease_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = applications)]
pub struct NewApplication {
    pub application_date: DateTime<Utc>,
    pub status: ApplicationStatus,
    pub property_id: i32,
    pub tenant_cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: Option<String>,
}

/// Body of `POST /applications`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplicationRequest {
    pub application_date: DateTime<Utc>,
    #[serde(default = "pending")]
    pub status: ApplicationStatus,
    pub property_id: i32,
    pub tenant_cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub message: Option<String>,
}

fn pending() -> ApplicationStatus {
    ApplicationStatus::Pending
}

impl CreateApplicationRequest {
    pub fn new_application(self) -> NewApplication {
        NewApplication {
            application_date: self.application_date,
            status: self.status,
            property_id: self.property_id,
            tenant_cognito_id: self.tenant_cognito_id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            message: self.message,
        }
    }
}

/// Body of `PUT /applications/:id/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: ApplicationStatus,
}

/// Which applications `GET /applications` returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationFilter {
    All,
    Tenant(String),
    Manager(String),
}

impl ApplicationFilter {
    /// Unknown user types, or a missing half of the pair, list everything.
    pub fn from_query(user_id: Option<&str>, user_type: Option<&str>) -> Self {
        match (user_id, user_type) {
            (Some(id), Some("tenant")) if !id.is_empty() => ApplicationFilter::Tenant(id.to_string()),
            (Some(id), Some("manager")) if !id.is_empty() => ApplicationFilter::Manager(id.to_string()),
            _ => ApplicationFilter::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedProperty {
    #[serde(flatten)]
    pub property: PropertyWithLocation,
    pub address: String,
}

/// One entry of `GET /applications`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationListing {
    #[serde(flatten)]
    pub application: Application,
    pub property: ListedProperty,
    pub manager: Option<Manager>,
    pub tenant: Option<Tenant>,
    pub lease: Option<LeaseWithNextPayment>,
}

/// An application with its relations, as returned after create and status updates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationDetails {
    #[serde(flatten)]
    pub application: Application,
    pub property: Option<PropertyWithLocation>,
    pub tenant: Option<Tenant>,
    pub lease: Option<Lease>,
}
