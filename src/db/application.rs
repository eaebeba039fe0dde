use anyhow::Result;
use diesel::prelude::*;
use log::info;

use super::schema::{applications, properties};
use crate::models::{
    application::{Application, ApplicationFilter, NewApplication},
    enums::ApplicationStatus,
};

pub fn insert(
    conn: &mut PgConnection,
    new_application: &NewApplication,
    target_lease_id: i32,
) -> Result<Application> {
    let application = diesel::insert_into(applications::table)
        .values((new_application, applications::lease_id.eq(target_lease_id)))
        .returning(Application::as_returning())
        .get_result(conn)?;

    info!(
        "Inserted application {} for property {}",
        application.id, application.property_id
    );
    Ok(application)
}

pub fn get(conn: &mut PgConnection, target_id: i32) -> Result<Option<Application>> {
    let application = applications::table
        .find(target_id)
        .select(Application::as_select())
        .first(conn)
        .optional()?;

    Ok(application)
}

pub fn get_all(conn: &mut PgConnection, filter: &ApplicationFilter) -> Result<Vec<Application>> {
    let all = match filter {
        ApplicationFilter::All => applications::table
            .order(applications::id)
            .select(Application::as_select())
            .load(conn)?,
        ApplicationFilter::Tenant(cognito_id) => applications::table
            .filter(applications::tenant_cognito_id.eq(cognito_id))
            .order(applications::id)
            .select(Application::as_select())
            .load(conn)?,
        ApplicationFilter::Manager(cognito_id) => applications::table
            .inner_join(properties::table)
            .filter(properties::manager_cognito_id.eq(cognito_id))
            .order(applications::id)
            .select(Application::as_select())
            .load(conn)?,
    };

    Ok(all)
}

/// Reads the application and locks its row until the surrounding
/// transaction ends. `None` unless it exists and is still pending.
pub fn lock_pending(conn: &mut PgConnection, target_id: i32) -> Result<Option<Application>> {
    let application = applications::table
        .find(target_id)
        .filter(applications::status.eq(ApplicationStatus::Pending))
        .select(Application::as_select())
        .for_update()
        .first(conn)
        .optional()?;

    Ok(application)
}

/// Sets the status of a pending application, and the lease when one is
/// given. `None` when no pending application has `target_id`.
pub fn decide(
    conn: &mut PgConnection,
    target_id: i32,
    new_status: ApplicationStatus,
    new_lease_id: Option<i32>,
) -> Result<Option<Application>> {
    let target = applications::table
        .find(target_id)
        .filter(applications::status.eq(ApplicationStatus::Pending));

    let application = match new_lease_id {
        Some(lease) => diesel::update(target)
            .set((
                applications::status.eq(new_status),
                applications::lease_id.eq(lease),
            ))
            .returning(Application::as_returning())
            .get_result(conn)
            .optional()?,
        None => diesel::update(target)
            .set(applications::status.eq(new_status))
            .returning(Application::as_returning())
            .get_result(conn)
            .optional()?,
    };

    match &application {
        Some(_) => info!("Application {target_id} is now {new_status}"),
        None => info!("Application {target_id} was no longer pending"),
    }
    Ok(application)
}
