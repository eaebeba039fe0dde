use std::collections::HashMap;

use crate::{
    db::Repository,
    error::{AppError, OrInternal},
    models::{lease::LeaseDetails, payment::Payment},
};

pub fn list(repo: &dyn Repository) -> Result<Vec<LeaseDetails>, AppError> {
    const MESSAGE: &str = "Error getting leases";

    let leases = repo.list_leases().or_internal(MESSAGE)?;

    // Leases of the same property or tenant share one lookup.
    let mut properties = HashMap::new();
    let mut tenants = HashMap::new();
    let mut details = Vec::with_capacity(leases.len());
    for lease in leases {
        if !properties.contains_key(&lease.property_id) {
            let property = repo.get_property(lease.property_id).or_internal(MESSAGE)?;
            properties.insert(lease.property_id, property);
        }
        if !tenants.contains_key(&lease.tenant_cognito_id) {
            let tenant = repo
                .get_tenant(&lease.tenant_cognito_id)
                .or_internal(MESSAGE)?;
            tenants.insert(lease.tenant_cognito_id.clone(), tenant);
        }

        details.push(LeaseDetails {
            property: properties.get(&lease.property_id).cloned().flatten(),
            tenant: tenants.get(&lease.tenant_cognito_id).cloned().flatten(),
            lease,
        });
    }

    Ok(details)
}

pub fn payments(repo: &dyn Repository, lease_id: i32) -> Result<Vec<Payment>, AppError> {
    repo.get_payments(lease_id)
        .or_internal("Error getting lease payments")
}
