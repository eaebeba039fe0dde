use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::enums::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::db::schema::payments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i32,
    pub amount_due: f64,
    pub amount_paid: f64,
    pub due_date: DateTime<Utc>,
    pub payment_date: DateTime<Utc>,
    pub payment_status: PaymentStatus,
    pub lease_id: i32,
}
