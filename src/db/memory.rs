//! In-process [`Repository`] used by the test suite and by `database_url = "memory"`.
//! It applies the same search predicates as the SQL builder through
//! [`PropertySearch::matches`].

use std::{
    collections::BTreeSet,
    sync::{Mutex, MutexGuard},
};

use anyhow::{anyhow, Result};
use chrono::Utc;

use super::Repository;
use crate::{
    models::{
        application::{Application, ApplicationFilter, NewApplication},
        enums::ApplicationStatus,
        lease::{Lease, NewLease},
        location::{Location, NewLocation},
        manager::Manager,
        payment::Payment,
        profile::{NewProfile, ProfileChanges},
        property::{NewProperty, Property, PropertyWithLocation},
        tenant::Tenant,
    },
    search::PropertySearch,
};

#[derive(Default)]
struct Tables {
    properties: Vec<Property>,
    locations: Vec<Location>,
    tenants: Vec<Tenant>,
    managers: Vec<Manager>,
    leases: Vec<Lease>,
    applications: Vec<Application>,
    payments: Vec<Payment>,
    /// (tenant_id, property_id)
    favorites: BTreeSet<(i32, i32)>,
    /// (property_id, tenant_id)
    occupants: BTreeSet<(i32, i32)>,
}

fn next_id(len: usize) -> i32 {
    len as i32 + 1
}

impl Tables {
    fn with_location(&self, property: &Property) -> Result<PropertyWithLocation> {
        let location = self
            .locations
            .iter()
            .find(|l| l.id == property.location_id)
            .ok_or_else(|| anyhow!("Location {} of property {} missing", property.location_id, property.id))?;

        Ok(PropertyWithLocation {
            property: property.clone(),
            location: location.clone(),
        })
    }

    fn collect<'a>(
        &self,
        properties: impl Iterator<Item = &'a Property>,
    ) -> Result<Vec<PropertyWithLocation>> {
        properties.map(|p| self.with_location(p)).collect()
    }

    fn insert_lease(&mut self, new_lease: NewLease) -> Lease {
        let lease = Lease {
            id: next_id(self.leases.len()),
            start_date: new_lease.start_date,
            end_date: new_lease.end_date,
            rent: new_lease.rent,
            deposit: new_lease.deposit,
            property_id: new_lease.property_id,
            tenant_cognito_id: new_lease.tenant_cognito_id,
        };
        self.leases.push(lease.clone());
        lease
    }

    fn pending_application(&mut self, id: i32) -> Option<&mut Application> {
        self.applications
            .iter_mut()
            .find(|a| a.id == id && a.status == ApplicationStatus::Pending)
    }

    fn application_mut(&mut self, id: i32) -> Result<&mut Application> {
        self.applications
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| anyhow!("Application {id} not found"))
    }
}

#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| anyhow!("memory repository lock poisoned"))
    }

    /// Seeds a payment; payments have no write endpoint.
    pub fn insert_payment(&self, mut payment: Payment) -> Result<Payment> {
        let mut tables = self.tables()?;
        payment.id = next_id(tables.payments.len());
        tables.payments.push(payment.clone());
        Ok(payment)
    }
}

impl Repository for MemoryRepository {
    fn search_properties(&self, search: &PropertySearch) -> Result<Vec<PropertyWithLocation>> {
        let tables = self.tables()?;
        let mut found = Vec::new();
        for property in &tables.properties {
            let with_location = tables.with_location(property)?;
            if search.matches(property, &with_location.location, &tables.leases) {
                found.push(with_location);
            }
        }
        Ok(found)
    }

    fn get_property(&self, id: i32) -> Result<Option<PropertyWithLocation>> {
        let tables = self.tables()?;
        tables
            .properties
            .iter()
            .find(|p| p.id == id)
            .map(|p| tables.with_location(p))
            .transpose()
    }

    fn create_property(
        &self,
        new_property: NewProperty,
        new_location: NewLocation,
    ) -> Result<PropertyWithLocation> {
        let mut tables = self.tables()?;

        let location = Location {
            id: next_id(tables.locations.len()),
            address: new_location.address,
            city: new_location.city,
            state: new_location.state,
            country: new_location.country,
            postal_code: new_location.postal_code,
            coordinates: new_location.coordinates,
        };
        let property = Property {
            id: next_id(tables.properties.len()),
            name: new_property.name,
            description: new_property.description,
            price_per_month: new_property.price_per_month,
            security_deposit: new_property.security_deposit,
            application_fee: new_property.application_fee,
            photo_urls: new_property.photo_urls,
            amenities: new_property.amenities,
            highlights: new_property.highlights,
            is_pets_allowed: new_property.is_pets_allowed,
            is_parking_included: new_property.is_parking_included,
            beds: new_property.beds,
            baths: new_property.baths,
            square_feet: new_property.square_feet,
            property_type: new_property.property_type,
            posted_date: Utc::now(),
            average_rating: Some(0.0),
            number_of_reviews: Some(0),
            location_id: location.id,
            manager_cognito_id: new_property.manager_cognito_id,
        };

        tables.locations.push(location.clone());
        tables.properties.push(property.clone());

        Ok(PropertyWithLocation { property, location })
    }

    fn get_manager_properties(&self, manager_cognito_id: &str) -> Result<Vec<PropertyWithLocation>> {
        let tables = self.tables()?;
        tables.collect(
            tables
                .properties
                .iter()
                .filter(|p| p.manager_cognito_id == manager_cognito_id),
        )
    }

    fn get_tenant_residences(&self, tenant_cognito_id: &str) -> Result<Vec<PropertyWithLocation>> {
        let tables = self.tables()?;
        let Some(tenant) = tables.tenants.iter().find(|t| t.cognito_id == tenant_cognito_id) else {
            return Ok(Vec::new());
        };
        let tenant_id = tenant.id;
        tables.collect(
            tables
                .properties
                .iter()
                .filter(|p| tables.occupants.contains(&(p.id, tenant_id))),
        )
    }

    fn get_tenant(&self, cognito_id: &str) -> Result<Option<Tenant>> {
        let tables = self.tables()?;
        Ok(tables.tenants.iter().find(|t| t.cognito_id == cognito_id).cloned())
    }

    fn create_tenant(&self, profile: NewProfile) -> Result<Tenant> {
        let mut tables = self.tables()?;
        if tables.tenants.iter().any(|t| t.cognito_id == profile.cognito_id) {
            return Err(anyhow!("Tenant {} already exists", profile.cognito_id));
        }
        let tenant = Tenant {
            id: next_id(tables.tenants.len()),
            cognito_id: profile.cognito_id,
            name: profile.name,
            email: profile.email,
            phone_number: profile.phone_number,
        };
        tables.tenants.push(tenant.clone());
        Ok(tenant)
    }

    fn update_tenant(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Tenant>> {
        let mut tables = self.tables()?;
        let Some(tenant) = tables.tenants.iter_mut().find(|t| t.cognito_id == cognito_id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            tenant.name = name;
        }
        if let Some(email) = changes.email {
            tenant.email = email;
        }
        if let Some(phone_number) = changes.phone_number {
            tenant.phone_number = phone_number;
        }
        Ok(Some(tenant.clone()))
    }

    fn get_favorites(&self, tenant_id: i32) -> Result<Vec<Property>> {
        let tables = self.tables()?;
        Ok(tables
            .properties
            .iter()
            .filter(|p| tables.favorites.contains(&(tenant_id, p.id)))
            .cloned()
            .collect())
    }

    fn add_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()> {
        let mut tables = self.tables()?;
        if !tables.properties.iter().any(|p| p.id == property_id) {
            return Err(anyhow!("Property {property_id} not found"));
        }
        tables.favorites.insert((tenant_id, property_id));
        Ok(())
    }

    fn remove_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()> {
        self.tables()?.favorites.remove(&(tenant_id, property_id));
        Ok(())
    }

    fn get_manager(&self, cognito_id: &str) -> Result<Option<Manager>> {
        let tables = self.tables()?;
        Ok(tables.managers.iter().find(|m| m.cognito_id == cognito_id).cloned())
    }

    fn create_manager(&self, profile: NewProfile) -> Result<Manager> {
        let mut tables = self.tables()?;
        if tables.managers.iter().any(|m| m.cognito_id == profile.cognito_id) {
            return Err(anyhow!("Manager {} already exists", profile.cognito_id));
        }
        let manager = Manager {
            id: next_id(tables.managers.len()),
            cognito_id: profile.cognito_id,
            name: profile.name,
            email: profile.email,
            phone_number: profile.phone_number,
        };
        tables.managers.push(manager.clone());
        Ok(manager)
    }

    fn update_manager(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Manager>> {
        let mut tables = self.tables()?;
        let Some(manager) = tables.managers.iter_mut().find(|m| m.cognito_id == cognito_id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            manager.name = name;
        }
        if let Some(email) = changes.email {
            manager.email = email;
        }
        if let Some(phone_number) = changes.phone_number {
            manager.phone_number = phone_number;
        }
        Ok(Some(manager.clone()))
    }

    fn list_leases(&self) -> Result<Vec<Lease>> {
        Ok(self.tables()?.leases.clone())
    }

    fn get_lease(&self, id: i32) -> Result<Option<Lease>> {
        Ok(self.tables()?.leases.iter().find(|l| l.id == id).cloned())
    }

    fn latest_lease(&self, tenant_cognito_id: &str, property_id: i32) -> Result<Option<Lease>> {
        let tables = self.tables()?;
        Ok(tables
            .leases
            .iter()
            .filter(|l| l.tenant_cognito_id == tenant_cognito_id && l.property_id == property_id)
            .max_by_key(|l| l.start_date)
            .cloned())
    }

    fn get_payments(&self, lease_id: i32) -> Result<Vec<Payment>> {
        let tables = self.tables()?;
        Ok(tables
            .payments
            .iter()
            .filter(|p| p.lease_id == lease_id)
            .cloned()
            .collect())
    }

    fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        let tables = self.tables()?;
        let managed_by = |application: &Application, manager: &str| {
            tables
                .properties
                .iter()
                .any(|p| p.id == application.property_id && p.manager_cognito_id == manager)
        };

        Ok(tables
            .applications
            .iter()
            .filter(|a| match filter {
                ApplicationFilter::All => true,
                ApplicationFilter::Tenant(tenant) => &a.tenant_cognito_id == tenant,
                ApplicationFilter::Manager(manager) => managed_by(a, manager),
            })
            .cloned()
            .collect())
    }

    fn get_application(&self, id: i32) -> Result<Option<Application>> {
        Ok(self.tables()?.applications.iter().find(|a| a.id == id).cloned())
    }

    fn create_application(
        &self,
        new_application: NewApplication,
        new_lease: NewLease,
    ) -> Result<Application> {
        let mut tables = self.tables()?;
        if !tables
            .tenants
            .iter()
            .any(|t| t.cognito_id == new_application.tenant_cognito_id)
        {
            return Err(anyhow!("Tenant {} not found", new_application.tenant_cognito_id));
        }
        if !tables
            .properties
            .iter()
            .any(|p| p.id == new_application.property_id)
        {
            return Err(anyhow!("Property {} not found", new_application.property_id));
        }
        let lease = tables.insert_lease(new_lease);
        let application = Application {
            id: next_id(tables.applications.len()),
            application_date: new_application.application_date,
            status: new_application.status,
            property_id: new_application.property_id,
            tenant_cognito_id: new_application.tenant_cognito_id,
            name: new_application.name,
            email: new_application.email,
            phone_number: new_application.phone_number,
            message: new_application.message,
            lease_id: Some(lease.id),
        };
        tables.applications.push(application.clone());
        Ok(application)
    }

    fn approve_application(&self, id: i32, new_lease: NewLease) -> Result<Option<Application>> {
        let mut tables = self.tables()?;
        let current = match tables.pending_application(id) {
            Some(current) => current.clone(),
            None => return Ok(None),
        };
        let tenant_id = tables
            .tenants
            .iter()
            .find(|t| t.cognito_id == current.tenant_cognito_id)
            .map(|t| t.id)
            .ok_or_else(|| anyhow!("Tenant {} not found", current.tenant_cognito_id))?;

        let lease = tables.insert_lease(new_lease);
        tables.occupants.insert((current.property_id, tenant_id));

        let application = tables.application_mut(id)?;
        application.status = ApplicationStatus::Approved;
        application.lease_id = Some(lease.id);
        Ok(Some(application.clone()))
    }

    fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        let mut tables = self.tables()?;
        Ok(tables.pending_application(id).map(|application| {
            application.status = status;
            application.clone()
        }))
    }
}
