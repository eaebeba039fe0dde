use anyhow::Result;
use diesel::prelude::*;
use log::info;

use super::schema::{leases, payments};
use crate::models::{
    lease::{Lease, NewLease},
    payment::Payment,
};

pub fn insert(conn: &mut PgConnection, new_lease: &NewLease) -> Result<Lease> {
    let lease = diesel::insert_into(leases::table)
        .values(new_lease)
        .returning(Lease::as_returning())
        .get_result(conn)?;

    info!(
        "Inserted lease {} for tenant {} on property {}",
        lease.id, lease.tenant_cognito_id, lease.property_id
    );
    Ok(lease)
}

pub fn get_all(conn: &mut PgConnection) -> Result<Vec<Lease>> {
    let all = leases::table
        .order(leases::id)
        .select(Lease::as_select())
        .load(conn)?;

    Ok(all)
}

pub fn get(conn: &mut PgConnection, target_id: i32) -> Result<Option<Lease>> {
    let lease = leases::table
        .find(target_id)
        .select(Lease::as_select())
        .first(conn)
        .optional()?;

    Ok(lease)
}

pub fn latest_for(
    conn: &mut PgConnection,
    target_tenant_cognito_id: &str,
    target_property_id: i32,
) -> Result<Option<Lease>> {
    let lease = leases::table
        .filter(leases::tenant_cognito_id.eq(target_tenant_cognito_id))
        .filter(leases::property_id.eq(target_property_id))
        .order(leases::start_date.desc())
        .select(Lease::as_select())
        .first(conn)
        .optional()?;

    Ok(lease)
}

pub fn payments(conn: &mut PgConnection, target_lease_id: i32) -> Result<Vec<Payment>> {
    let all = payments::table
        .filter(payments::lease_id.eq(target_lease_id))
        .order(payments::due_date)
        .select(Payment::as_select())
        .load(conn)?;

    Ok(all)
}
