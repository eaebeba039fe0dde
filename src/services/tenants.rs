use crate::{
    db::Repository,
    error::{AppError, OrInternal},
    models::{
        profile::{NewProfile, ProfileChanges},
        property::PropertyWithLocation,
        tenant::{Tenant, TenantWithFavorites},
    },
};

const TENANT_NOT_FOUND: AppError = AppError::NotFound("Tenant not found");

fn with_favorites(repo: &dyn Repository, tenant: Tenant) -> anyhow::Result<TenantWithFavorites> {
    let favorites = repo.get_favorites(tenant.id)?;
    Ok(TenantWithFavorites { tenant, favorites })
}

fn find(repo: &dyn Repository, cognito_id: &str, message: &'static str) -> Result<Tenant, AppError> {
    repo.get_tenant(cognito_id)
        .or_internal(message)?
        .ok_or(TENANT_NOT_FOUND)
}

pub fn get(repo: &dyn Repository, cognito_id: &str) -> Result<TenantWithFavorites, AppError> {
    const MESSAGE: &str = "Error getting tenant";

    let tenant = find(repo, cognito_id, MESSAGE)?;
    with_favorites(repo, tenant).or_internal(MESSAGE)
}

pub fn create(repo: &dyn Repository, profile: NewProfile) -> Result<Tenant, AppError> {
    repo.create_tenant(profile).or_internal("Error creating tenant")
}

pub fn update(
    repo: &dyn Repository,
    cognito_id: &str,
    changes: ProfileChanges,
) -> Result<Tenant, AppError> {
    repo.update_tenant(cognito_id, changes)
        .or_internal("Error updating tenant")?
        .ok_or(TENANT_NOT_FOUND)
}

pub fn current_residences(
    repo: &dyn Repository,
    cognito_id: &str,
) -> Result<Vec<PropertyWithLocation>, AppError> {
    repo.get_tenant_residences(cognito_id)
        .or_internal("Error retrieving tenant properties")
}

/// Adding a property that is already a favorite is a conflict, not a no-op.
pub fn add_favorite(
    repo: &dyn Repository,
    cognito_id: &str,
    property_id: i32,
) -> Result<TenantWithFavorites, AppError> {
    const MESSAGE: &str = "Error adding favorite property";

    let tenant = find(repo, cognito_id, MESSAGE)?;
    let current = with_favorites(repo, tenant).or_internal(MESSAGE)?;
    if current.favorites.iter().any(|p| p.id == property_id) {
        return Err(AppError::Conflict("Property already added as favorite"));
    }

    repo.add_favorite(current.tenant.id, property_id)
        .or_internal(MESSAGE)?;
    with_favorites(repo, current.tenant).or_internal(MESSAGE)
}

pub fn remove_favorite(
    repo: &dyn Repository,
    cognito_id: &str,
    property_id: i32,
) -> Result<TenantWithFavorites, AppError> {
    const MESSAGE: &str = "Error removing favorite property";

    let tenant = find(repo, cognito_id, MESSAGE)?;
    repo.remove_favorite(tenant.id, property_id)
        .or_internal(MESSAGE)?;
    with_favorites(repo, tenant).or_internal(MESSAGE)
}
