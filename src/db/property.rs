use anyhow::{Context, Result};
use diesel::{
    pg::Pg,
    prelude::*,
    query_builder::{BoxedSqlQuery, SqlQuery as RawQuery},
    sql_types::{Array, Float8, Int4, Json, Text, Timestamptz},
};
use log::info;

use super::schema::{properties, property_tenants};
use crate::{
    models::{
        location::{Location, NewLocation},
        property::{NewProperty, Property, PropertyWithLocation},
    },
    search::{
        query::{self, SqlQuery, SqlValue},
        PropertySearch,
    },
};

#[derive(QueryableByName)]
struct PropertyRow {
    #[diesel(embed)]
    property: Property,
    #[diesel(sql_type = Json)]
    location: serde_json::Value,
}

impl PropertyRow {
    fn into_model(self) -> Result<PropertyWithLocation> {
        let location: Location = serde_json::from_value(self.location)
            .with_context(|| format!("Malformed location of property {}", self.property.id))?;
        Ok(PropertyWithLocation {
            property: self.property,
            location,
        })
    }
}

#[derive(QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = Int4)]
    id: i32,
}

/// Attaches the bind values of `query` to a raw diesel statement.
pub fn statement(query: SqlQuery) -> BoxedSqlQuery<'static, Pg, RawQuery> {
    let mut statement = diesel::sql_query(query.sql).into_boxed::<Pg>();
    for value in query.binds {
        statement = match value {
            SqlValue::Int4(v) => statement.bind::<Int4, _>(v),
            SqlValue::Int4Array(v) => statement.bind::<Array<Int4>, _>(v),
            SqlValue::Float8(v) => statement.bind::<Float8, _>(v),
            SqlValue::Text(v) => statement.bind::<Text, _>(v),
            SqlValue::TextArray(v) => statement.bind::<Array<Text>, _>(v),
            SqlValue::Timestamptz(v) => statement.bind::<Timestamptz, _>(v),
        };
    }
    statement
}

fn load(conn: &mut PgConnection, query: SqlQuery) -> Result<Vec<PropertyWithLocation>> {
    statement(query)
        .load::<PropertyRow>(conn)?
        .into_iter()
        .map(PropertyRow::into_model)
        .collect()
}

pub fn search(conn: &mut PgConnection, search: &PropertySearch) -> Result<Vec<PropertyWithLocation>> {
    load(conn, query::build_search_query(search))
}

pub fn get(conn: &mut PgConnection, id: i32) -> Result<Option<PropertyWithLocation>> {
    Ok(load(conn, query::property_by_id(id))?.into_iter().next())
}

pub fn for_manager(
    conn: &mut PgConnection,
    manager_cognito_id: &str,
) -> Result<Vec<PropertyWithLocation>> {
    load(conn, query::properties_of_manager(manager_cognito_id))
}

pub fn residences(
    conn: &mut PgConnection,
    tenant_cognito_id: &str,
) -> Result<Vec<PropertyWithLocation>> {
    load(conn, query::residences_of_tenant(tenant_cognito_id))
}

pub fn insert(
    conn: &mut PgConnection,
    new_property: NewProperty,
    location: NewLocation,
) -> Result<PropertyWithLocation> {
    let location_id = diesel::sql_query(
        "INSERT INTO locations (address, city, state, country, postal_code, coordinates) \
         VALUES ($1, $2, $3, $4, $5, ST_SetSRID(ST_MakePoint($6, $7), 4326)) \
         RETURNING id",
    )
    .bind::<Text, _>(&location.address)
    .bind::<Text, _>(&location.city)
    .bind::<Text, _>(&location.state)
    .bind::<Text, _>(&location.country)
    .bind::<Text, _>(&location.postal_code)
    .bind::<Float8, _>(location.coordinates.longitude)
    .bind::<Float8, _>(location.coordinates.latitude)
    .get_result::<InsertedId>(conn)?
    .id;

    let property_id: i32 = diesel::insert_into(properties::table)
        .values((&new_property, properties::location_id.eq(location_id)))
        .returning(properties::id)
        .get_result(conn)?;

    info!("Inserted property {property_id} at location {location_id}");

    get(conn, property_id)?.with_context(|| format!("Property {property_id} vanished after insert"))
}

pub fn add_occupant(conn: &mut PgConnection, property_id: i32, tenant_id: i32) -> Result<()> {
    diesel::insert_into(property_tenants::table)
        .values((
            property_tenants::property_id.eq(property_id),
            property_tenants::tenant_id.eq(tenant_id),
        ))
        .on_conflict_do_nothing()
        .execute(conn)?;

    Ok(())
}
