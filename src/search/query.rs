use chrono::{DateTime, Utc};

use super::PropertySearch;

/// Selects every property column plus its location as a JSON object with the
/// point split into longitude and latitude. Callers append their own WHERE.
pub const PROPERTY_WITH_LOCATION: &str = r#"SELECT p.*, json_build_object(
    'id', l.id,
    'address', l.address,
    'city', l.city,
    'state', l.state,
    'country', l.country,
    'postalCode', l.postal_code,
    'coordinates', json_build_object(
        'longitude', ST_X(l.coordinates::geometry),
        'latitude', ST_Y(l.coordinates::geometry)
    )
) AS location
FROM properties p
JOIN locations l ON p.location_id = l.id"#;

/// A value bound to a `$n` placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int4(i32),
    Int4Array(Vec<i32>),
    Float8(f64),
    Text(String),
    TextArray(Vec<String>),
    Timestamptz(DateTime<Utc>),
}

/// SQL text with numbered placeholders and the values for them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub sql: String,
    pub binds: Vec<SqlValue>,
}

impl SqlQuery {
    pub fn has_where_clause(&self) -> bool {
        self.sql.contains("WHERE")
    }
}

#[derive(Default)]
struct Conditions {
    clauses: Vec<String>,
    binds: Vec<SqlValue>,
}

impl Conditions {
    fn bind(&mut self, value: SqlValue) -> String {
        self.binds.push(value);
        format!("${}", self.binds.len())
    }

    fn push(&mut self, clause: String) {
        self.clauses.push(clause);
    }

    fn finish(self, base: &str) -> SqlQuery {
        let sql = if self.clauses.is_empty() {
            base.to_string()
        } else {
            format!("{base}\nWHERE {}", self.clauses.join(" AND "))
        };
        SqlQuery {
            sql,
            binds: self.binds,
        }
    }
}

/// Renders `search` as one statement over [`PROPERTY_WITH_LOCATION`]. Only the
/// filters that are set contribute a predicate.
pub fn build_search_query(search: &PropertySearch) -> SqlQuery {
    let mut conditions = Conditions::default();

    if let Some(ids) = &search.favorite_ids {
        let p = conditions.bind(SqlValue::Int4Array(ids.clone()));
        conditions.push(format!("p.id = ANY({p})"));
    }
    if let Some(min) = search.price_min {
        let p = conditions.bind(SqlValue::Float8(min));
        conditions.push(format!("p.price_per_month >= {p}"));
    }
    if let Some(max) = search.price_max {
        let p = conditions.bind(SqlValue::Float8(max));
        conditions.push(format!("p.price_per_month <= {p}"));
    }
    if let Some(beds) = search.beds {
        let p = conditions.bind(SqlValue::Int4(beds));
        conditions.push(format!("p.beds >= {p}"));
    }
    if let Some(baths) = search.baths {
        let p = conditions.bind(SqlValue::Float8(baths));
        conditions.push(format!("p.baths >= {p}"));
    }
    if let Some(kind) = search.property_type {
        let p = conditions.bind(SqlValue::Text(kind.as_str().to_string()));
        conditions.push(format!("p.property_type = {p}"));
    }
    if let Some(min) = search.square_feet_min {
        let p = conditions.bind(SqlValue::Float8(min));
        conditions.push(format!("p.square_feet >= {p}"));
    }
    if let Some(max) = search.square_feet_max {
        let p = conditions.bind(SqlValue::Float8(max));
        conditions.push(format!("p.square_feet <= {p}"));
    }
    if let Some(amenities) = &search.amenities {
        let p = conditions.bind(SqlValue::TextArray(amenities.clone()));
        conditions.push(format!("p.amenities @> {p}"));
    }
    if let Some(from) = search.available_from {
        let p = conditions.bind(SqlValue::Timestamptz(from));
        conditions.push(format!(
            "EXISTS (SELECT 1 FROM leases le WHERE le.property_id = p.id AND le.start_date >= {p})"
        ));
    }
    if let Some(center) = search.center {
        let lon = conditions.bind(SqlValue::Float8(center.longitude));
        let lat = conditions.bind(SqlValue::Float8(center.latitude));
        let radius = conditions.bind(SqlValue::Float8(search.radius_degrees()));
        conditions.push(format!(
            "ST_DWithin(l.coordinates::geometry, ST_SetSRID(ST_MakePoint({lon}, {lat}), 4326), {radius})"
        ));
    }

    conditions.finish(PROPERTY_WITH_LOCATION)
}

/// One property by id.
pub fn property_by_id(id: i32) -> SqlQuery {
    let mut conditions = Conditions::default();
    let p = conditions.bind(SqlValue::Int4(id));
    conditions.push(format!("p.id = {p}"));
    conditions.finish(PROPERTY_WITH_LOCATION)
}

/// Properties owned by a manager.
pub fn properties_of_manager(manager_cognito_id: &str) -> SqlQuery {
    let mut conditions = Conditions::default();
    let p = conditions.bind(SqlValue::Text(manager_cognito_id.to_string()));
    conditions.push(format!("p.manager_cognito_id = {p}"));
    conditions.finish(PROPERTY_WITH_LOCATION)
}

/// Properties a tenant currently lives in.
pub fn residences_of_tenant(tenant_cognito_id: &str) -> SqlQuery {
    let mut conditions = Conditions::default();
    let p = conditions.bind(SqlValue::Text(tenant_cognito_id.to_string()));
    conditions.push(format!(
        "EXISTS (SELECT 1 FROM property_tenants pt JOIN tenants t ON t.id = pt.tenant_id \
         WHERE pt.property_id = p.id AND t.cognito_id = {p})"
    ));
    conditions.finish(PROPERTY_WITH_LOCATION)
}
