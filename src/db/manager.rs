use anyhow::Result;
use diesel::prelude::*;
use log::info;

use super::schema::managers;
use crate::models::{
    manager::Manager,
    profile::{NewProfile, ProfileChanges},
};

pub fn get(conn: &mut PgConnection, target_cognito_id: &str) -> Result<Option<Manager>> {
    let manager = managers::table
        .filter(managers::cognito_id.eq(target_cognito_id))
        .select(Manager::as_select())
        .first(conn)
        .optional()?;

    Ok(manager)
}

pub fn insert(conn: &mut PgConnection, profile: NewProfile) -> Result<Manager> {
    let manager = diesel::insert_into(managers::table)
        .values((
            managers::cognito_id.eq(profile.cognito_id),
            managers::name.eq(profile.name),
            managers::email.eq(profile.email),
            managers::phone_number.eq(profile.phone_number),
        ))
        .returning(Manager::as_returning())
        .get_result(conn)?;

    info!("Inserted manager {}", manager.id);
    Ok(manager)
}

pub fn update(
    conn: &mut PgConnection,
    target_cognito_id: &str,
    changes: ProfileChanges,
) -> Result<Option<Manager>> {
    if changes.is_empty() {
        return get(conn, target_cognito_id);
    }

    let manager =
        diesel::update(managers::table.filter(managers::cognito_id.eq(target_cognito_id)))
            .set((
                changes.name.map(|v| managers::name.eq(v)),
                changes.email.map(|v| managers::email.eq(v)),
                changes.phone_number.map(|v| managers::phone_number.eq(v)),
            ))
            .returning(Manager::as_returning())
            .get_result(conn)
            .optional()?;

    Ok(manager)
}
