use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::property::Property;

#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = crate::db::schema::tenants)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: i32,
    pub cognito_id: String,
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenantWithFavorites {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub favorites: Vec<Property>,
}
