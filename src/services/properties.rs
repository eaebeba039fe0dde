use crate::{
    db::Repository,
    error::{AppError, OrInternal},
    models::{
        location::NewLocation,
        property::{CreatePropertyRequest, PropertyWithLocation},
    },
    search::{PropertySearch, SearchParams},
};

pub fn search(
    repo: &dyn Repository,
    params: &SearchParams,
    radius_km: f64,
) -> Result<Vec<PropertyWithLocation>, AppError> {
    const MESSAGE: &str = "Error getting properties";

    let search = PropertySearch::from_params(params, radius_km).or_internal(MESSAGE)?;
    repo.search_properties(&search).or_internal(MESSAGE)
}

pub fn get(repo: &dyn Repository, id: i32) -> Result<PropertyWithLocation, AppError> {
    repo.get_property(id)
        .or_internal("Error getting property")?
        .ok_or(AppError::NotFound("Property not found"))
}

pub fn create(
    repo: &dyn Repository,
    request: &CreatePropertyRequest,
    location: NewLocation,
) -> Result<PropertyWithLocation, AppError> {
    repo.create_property(request.new_property(), location)
        .or_internal("Error creating property")
}
