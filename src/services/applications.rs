use chrono::{DateTime, Utc};
use log::info;

use crate::{
    db::Repository,
    error::{AppError, OrInternal},
    models::{
        application::{
            Application, ApplicationDetails, ApplicationFilter, ApplicationListing,
            CreateApplicationRequest, ListedProperty,
        },
        enums::ApplicationStatus,
        lease::{next_payment_date, LeaseWithNextPayment, NewLease},
    },
};

const APPLICATION_NOT_FOUND: AppError = AppError::NotFound("Application not found");
const PROPERTY_NOT_FOUND: AppError = AppError::NotFound("Property not found");
const ALREADY_DECIDED: AppError = AppError::Conflict("Application has already been decided");

pub fn list(
    repo: &dyn Repository,
    filter: &ApplicationFilter,
    today: DateTime<Utc>,
) -> Result<Vec<ApplicationListing>, AppError> {
    const MESSAGE: &str = "Error getting applications";

    let applications = repo.list_applications(filter).or_internal(MESSAGE)?;
    let mut listings = Vec::with_capacity(applications.len());

    for application in applications {
        let property = repo
            .get_property(application.property_id)
            .or_internal(MESSAGE)?
            .ok_or(PROPERTY_NOT_FOUND)?;
        let manager = repo
            .get_manager(&property.property.manager_cognito_id)
            .or_internal(MESSAGE)?;
        let tenant = repo
            .get_tenant(&application.tenant_cognito_id)
            .or_internal(MESSAGE)?;
        let lease = repo
            .latest_lease(&application.tenant_cognito_id, application.property_id)
            .or_internal(MESSAGE)?
            .map(|lease| LeaseWithNextPayment {
                next_payment_date: next_payment_date(lease.start_date, today),
                lease,
            });

        listings.push(ApplicationListing {
            application,
            property: ListedProperty {
                address: property.location.address.clone(),
                property,
            },
            manager,
            tenant,
            lease,
        });
    }

    Ok(listings)
}

fn details(repo: &dyn Repository, application: Application) -> anyhow::Result<ApplicationDetails> {
    let property = repo.get_property(application.property_id)?;
    let tenant = repo.get_tenant(&application.tenant_cognito_id)?;
    let lease = match application.lease_id {
        Some(id) => repo.get_lease(id)?,
        None => None,
    };

    Ok(ApplicationDetails {
        application,
        property,
        tenant,
        lease,
    })
}

/// Creates the application together with a lease priced from the property.
pub fn create(
    repo: &dyn Repository,
    request: CreateApplicationRequest,
    now: DateTime<Utc>,
) -> Result<ApplicationDetails, AppError> {
    const MESSAGE: &str = "Error creating application";

    let property = repo
        .get_property(request.property_id)
        .or_internal(MESSAGE)?
        .ok_or(PROPERTY_NOT_FOUND)?;

    let lease = NewLease::for_property(&property.property, &request.tenant_cognito_id, now);
    let application = repo
        .create_application(request.new_application(), lease)
        .or_internal(MESSAGE)?;

    details(repo, application).or_internal(MESSAGE)
}

/// Moves a pending application to `status`. Approving creates the lease and
/// makes the tenant an occupant; applications that were already decided are
/// left alone.
pub fn update_status(
    repo: &dyn Repository,
    id: i32,
    status: ApplicationStatus,
    now: DateTime<Utc>,
) -> Result<ApplicationDetails, AppError> {
    const MESSAGE: &str = "Error updating application status";

    let application = repo
        .get_application(id)
        .or_internal(MESSAGE)?
        .ok_or(APPLICATION_NOT_FOUND)?;

    if application.status != ApplicationStatus::Pending {
        return Err(ALREADY_DECIDED);
    }

    let updated = match status {
        ApplicationStatus::Approved => {
            let property = repo
                .get_property(application.property_id)
                .or_internal(MESSAGE)?
                .ok_or(PROPERTY_NOT_FOUND)?;
            let lease =
                NewLease::for_property(&property.property, &application.tenant_cognito_id, now);
            repo.approve_application(id, lease).or_internal(MESSAGE)?
        }
        other => repo.set_application_status(id, other).or_internal(MESSAGE)?,
    }
    .ok_or(ALREADY_DECIDED)?;

    info!("Application {id} moved from Pending to {}", updated.status);
    details(repo, updated).or_internal(MESSAGE)
}
