use anyhow::Result;
use diesel::prelude::*;
use log::info;

use super::schema::{properties, tenant_favorites, tenants};
use crate::models::{
    profile::{NewProfile, ProfileChanges},
    property::Property,
    tenant::Tenant,
};

pub fn get(conn: &mut PgConnection, target_cognito_id: &str) -> Result<Option<Tenant>> {
    let tenant = tenants::table
        .filter(tenants::cognito_id.eq(target_cognito_id))
        .select(Tenant::as_select())
        .first(conn)
        .optional()?;

    Ok(tenant)
}

pub fn insert(conn: &mut PgConnection, profile: NewProfile) -> Result<Tenant> {
    let tenant = diesel::insert_into(tenants::table)
        .values((
            tenants::cognito_id.eq(profile.cognito_id),
            tenants::name.eq(profile.name),
            tenants::email.eq(profile.email),
            tenants::phone_number.eq(profile.phone_number),
        ))
        .returning(Tenant::as_returning())
        .get_result(conn)?;

    info!("Inserted tenant {}", tenant.id);
    Ok(tenant)
}

pub fn update(
    conn: &mut PgConnection,
    target_cognito_id: &str,
    changes: ProfileChanges,
) -> Result<Option<Tenant>> {
    if changes.is_empty() {
        return get(conn, target_cognito_id);
    }

    let tenant = diesel::update(tenants::table.filter(tenants::cognito_id.eq(target_cognito_id)))
        .set((
            changes.name.map(|v| tenants::name.eq(v)),
            changes.email.map(|v| tenants::email.eq(v)),
            changes.phone_number.map(|v| tenants::phone_number.eq(v)),
        ))
        .returning(Tenant::as_returning())
        .get_result(conn)
        .optional()?;

    Ok(tenant)
}

pub fn favorites(conn: &mut PgConnection, target_tenant_id: i32) -> Result<Vec<Property>> {
    let favorites = tenant_favorites::table
        .inner_join(properties::table)
        .filter(tenant_favorites::tenant_id.eq(target_tenant_id))
        .order(properties::id)
        .select(Property::as_select())
        .load(conn)?;

    Ok(favorites)
}

pub fn add_favorite(conn: &mut PgConnection, target_tenant_id: i32, target_property_id: i32) -> Result<()> {
    let n = diesel::insert_into(tenant_favorites::table)
        .values((
            tenant_favorites::tenant_id.eq(target_tenant_id),
            tenant_favorites::property_id.eq(target_property_id),
        ))
        .on_conflict_do_nothing()
        .execute(conn)?;

    info!("Inserted {n} favorites for tenant {target_tenant_id}");
    Ok(())
}

pub fn remove_favorite(
    conn: &mut PgConnection,
    target_tenant_id: i32,
    target_property_id: i32,
) -> Result<()> {
    let n = diesel::delete(
        tenant_favorites::table
            .filter(tenant_favorites::tenant_id.eq(target_tenant_id))
            .filter(tenant_favorites::property_id.eq(target_property_id)),
    )
    .execute(conn)?;

    info!("Deleted {n} favorites for tenant {target_tenant_id}");
    Ok(())
}
