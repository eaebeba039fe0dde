use crate::{
    db::Repository,
    error::{AppError, OrInternal},
    models::{
        manager::Manager,
        profile::{NewProfile, ProfileChanges},
        property::PropertyWithLocation,
    },
};

const MANAGER_NOT_FOUND: AppError = AppError::NotFound("Manager not found");

pub fn get(repo: &dyn Repository, cognito_id: &str) -> Result<Manager, AppError> {
    repo.get_manager(cognito_id)
        .or_internal("Error getting manager")?
        .ok_or(MANAGER_NOT_FOUND)
}

pub fn create(repo: &dyn Repository, profile: NewProfile) -> Result<Manager, AppError> {
    repo.create_manager(profile).or_internal("Error creating manager")
}

pub fn update(
    repo: &dyn Repository,
    cognito_id: &str,
    changes: ProfileChanges,
) -> Result<Manager, AppError> {
    repo.update_manager(cognito_id, changes)
        .or_internal("Error updating manager")?
        .ok_or(MANAGER_NOT_FOUND)
}

pub fn properties(
    repo: &dyn Repository,
    cognito_id: &str,
) -> Result<Vec<PropertyWithLocation>, AppError> {
    const MESSAGE: &str = "Error retrieving manager properties";

    if repo.get_manager(cognito_id).or_internal(MESSAGE)?.is_none() {
        return Err(MANAGER_NOT_FOUND);
    }
    repo.get_manager_properties(cognito_id).or_internal(MESSAGE)
}
