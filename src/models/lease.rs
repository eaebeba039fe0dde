use chrono::{DateTime, Months, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::{property::Property, property::PropertyWithLocation, tenant::Tenant};
use crate::db::schema::leases;

pub const LEASE_TERM_MONTHS: u32 = 12;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = leases)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    pub id: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent: f64,
    pub deposit: f64,
    pub property_id: i32,
    pub tenant_cognito_id: String,
}

#[derive(Debug, Clone, PartialEq, Insertable)]
#[diesel(table_name = leases)]
pub struct NewLease {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub rent: f64,
    pub deposit: f64,
    pub property_id: i32,
    pub tenant_cognito_id: String,
}

impl NewLease {
    /// A one year lease starting `now`, priced from the property as it is right now.
    pub fn for_property(property: &Property, tenant_cognito_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            start_date: now,
            end_date: now
                .checked_add_months(Months::new(LEASE_TERM_MONTHS))
                .unwrap_or(now),
            rent: property.price_per_month,
            deposit: property.security_deposit,
            property_id: property.id,
            tenant_cognito_id: tenant_cognito_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseWithNextPayment {
    #[serde(flatten)]
    pub lease: Lease,
    pub next_payment_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseDetails {
    #[serde(flatten)]
    pub lease: Lease,
    pub property: Option<PropertyWithLocation>,
    pub tenant: Option<Tenant>,
}

/// First monthly anniversary of `start` strictly after `today`.
pub fn next_payment_date(start: DateTime<Utc>, today: DateTime<Utc>) -> DateTime<Utc> {
    let mut months = 0;
    let mut next = start;
    while next <= today {
        months += 1;
        next = match start.checked_add_months(Months::new(months)) {
            Some(date) => date,
            None => return next,
        };
    }
    next
}
