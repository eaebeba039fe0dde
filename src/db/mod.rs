pub mod application;
pub mod lease;
pub mod manager;
pub mod memory;
pub mod property;
pub mod schema;
pub mod tenant;

use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use diesel::{
    r2d2::{ConnectionManager, Pool, PooledConnection},
    Connection, PgConnection,
};
use log::info;

use crate::{
    config::{Config, MEMORY_DATABASE_URL},
    models::{
        application::{Application, ApplicationFilter, NewApplication},
        enums::ApplicationStatus,
        lease::{Lease, NewLease},
        location::NewLocation,
        manager::Manager,
        payment::Payment,
        profile::{NewProfile, ProfileChanges},
        property::{NewProperty, Property, PropertyWithLocation},
        tenant::Tenant,
    },
    search::PropertySearch,
};

pub use memory::MemoryRepository;

/// Everything the HTTP layer reads from or writes to storage.
///
/// Calls are blocking; async callers go through `spawn_blocking`.
pub trait Repository: Send + Sync {
    fn search_properties(&self, search: &PropertySearch) -> Result<Vec<PropertyWithLocation>>;
    fn get_property(&self, id: i32) -> Result<Option<PropertyWithLocation>>;
    fn create_property(
        &self,
        property: NewProperty,
        location: NewLocation,
    ) -> Result<PropertyWithLocation>;
    fn get_manager_properties(&self, manager_cognito_id: &str) -> Result<Vec<PropertyWithLocation>>;
    fn get_tenant_residences(&self, tenant_cognito_id: &str) -> Result<Vec<PropertyWithLocation>>;

    fn get_tenant(&self, cognito_id: &str) -> Result<Option<Tenant>>;
    fn create_tenant(&self, profile: NewProfile) -> Result<Tenant>;
    fn update_tenant(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Tenant>>;
    fn get_favorites(&self, tenant_id: i32) -> Result<Vec<Property>>;
    fn add_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()>;
    fn remove_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()>;

    fn get_manager(&self, cognito_id: &str) -> Result<Option<Manager>>;
    fn create_manager(&self, profile: NewProfile) -> Result<Manager>;
    fn update_manager(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Manager>>;

    fn list_leases(&self) -> Result<Vec<Lease>>;
    fn get_lease(&self, id: i32) -> Result<Option<Lease>>;
    fn latest_lease(&self, tenant_cognito_id: &str, property_id: i32) -> Result<Option<Lease>>;
    fn get_payments(&self, lease_id: i32) -> Result<Vec<Payment>>;

    fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>>;
    fn get_application(&self, id: i32) -> Result<Option<Application>>;
    /// Creates the lease and the application pointing at it, atomically.
    fn create_application(&self, application: NewApplication, lease: NewLease)
        -> Result<Application>;
    /// Creates the lease, adds the tenant to the property's occupants and marks
    /// the application approved, atomically. `None` when the application is
    /// no longer pending at the time of the write; nothing is written then.
    fn approve_application(&self, id: i32, lease: NewLease) -> Result<Option<Application>>;
    /// Moves a pending application to `status`. `None` when it is no longer
    /// pending.
    fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<Option<Application>>;
}

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(Duration::from_secs(5))
            .build(manager)
            .context("Failed to build the Postgres connection pool")?;

        info!("Connected to Postgres with a pool of {pool_size} connections");
        Ok(Self { pool })
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>> {
        self.pool
            .get()
            .context("Failed to check out a Postgres connection")
    }
}

/// Picks the backend named by `database_url`.
pub fn open_repository(config: &Config) -> Result<Arc<dyn Repository>> {
    if config.database_url == MEMORY_DATABASE_URL {
        info!("Using the in-memory repository");
        return Ok(Arc::new(MemoryRepository::new()));
    }
    Ok(Arc::new(PgRepository::connect(
        &config.database_url,
        config.db_pool_size,
    )?))
}

impl Repository for PgRepository {
    fn search_properties(&self, search: &PropertySearch) -> Result<Vec<PropertyWithLocation>> {
        property::search(&mut *self.conn()?, search)
    }

    fn get_property(&self, id: i32) -> Result<Option<PropertyWithLocation>> {
        property::get(&mut *self.conn()?, id)
    }

    fn create_property(
        &self,
        new_property: NewProperty,
        location: NewLocation,
    ) -> Result<PropertyWithLocation> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| property::insert(conn, new_property, location))
    }

    fn get_manager_properties(&self, manager_cognito_id: &str) -> Result<Vec<PropertyWithLocation>> {
        property::for_manager(&mut *self.conn()?, manager_cognito_id)
    }

    fn get_tenant_residences(&self, tenant_cognito_id: &str) -> Result<Vec<PropertyWithLocation>> {
        property::residences(&mut *self.conn()?, tenant_cognito_id)
    }

    fn get_tenant(&self, cognito_id: &str) -> Result<Option<Tenant>> {
        tenant::get(&mut *self.conn()?, cognito_id)
    }

    fn create_tenant(&self, profile: NewProfile) -> Result<Tenant> {
        tenant::insert(&mut *self.conn()?, profile)
    }

    fn update_tenant(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Tenant>> {
        tenant::update(&mut *self.conn()?, cognito_id, changes)
    }

    fn get_favorites(&self, tenant_id: i32) -> Result<Vec<Property>> {
        tenant::favorites(&mut *self.conn()?, tenant_id)
    }

    fn add_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()> {
        tenant::add_favorite(&mut *self.conn()?, tenant_id, property_id)
    }

    fn remove_favorite(&self, tenant_id: i32, property_id: i32) -> Result<()> {
        tenant::remove_favorite(&mut *self.conn()?, tenant_id, property_id)
    }

    fn get_manager(&self, cognito_id: &str) -> Result<Option<Manager>> {
        manager::get(&mut *self.conn()?, cognito_id)
    }

    fn create_manager(&self, profile: NewProfile) -> Result<Manager> {
        manager::insert(&mut *self.conn()?, profile)
    }

    fn update_manager(&self, cognito_id: &str, changes: ProfileChanges) -> Result<Option<Manager>> {
        manager::update(&mut *self.conn()?, cognito_id, changes)
    }

    fn list_leases(&self) -> Result<Vec<Lease>> {
        lease::get_all(&mut *self.conn()?)
    }

    fn get_lease(&self, id: i32) -> Result<Option<Lease>> {
        lease::get(&mut *self.conn()?, id)
    }

    fn latest_lease(&self, tenant_cognito_id: &str, property_id: i32) -> Result<Option<Lease>> {
        lease::latest_for(&mut *self.conn()?, tenant_cognito_id, property_id)
    }

    fn get_payments(&self, lease_id: i32) -> Result<Vec<Payment>> {
        lease::payments(&mut *self.conn()?, lease_id)
    }

    fn list_applications(&self, filter: &ApplicationFilter) -> Result<Vec<Application>> {
        application::get_all(&mut *self.conn()?, filter)
    }

    fn get_application(&self, id: i32) -> Result<Option<Application>> {
        application::get(&mut *self.conn()?, id)
    }

    fn create_application(
        &self,
        new_application: NewApplication,
        new_lease: NewLease,
    ) -> Result<Application> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let lease = lease::insert(conn, &new_lease)?;
            application::insert(conn, &new_application, lease.id)
        })
    }

    fn approve_application(&self, id: i32, new_lease: NewLease) -> Result<Option<Application>> {
        let mut conn = self.conn()?;
        conn.transaction(|conn| {
            let current = match application::lock_pending(conn, id)? {
                Some(current) => current,
                None => return Ok(None),
            };
            let tenant = tenant::get(conn, &current.tenant_cognito_id)?.with_context(|| {
                format!("Tenant {} of application {id} not found", current.tenant_cognito_id)
            })?;
            let lease = lease::insert(conn, &new_lease)?;
            property::add_occupant(conn, current.property_id, tenant.id)?;
            application::decide(conn, id, ApplicationStatus::Approved, Some(lease.id))
        })
    }

    fn set_application_status(
        &self,
        id: i32,
        status: ApplicationStatus,
    ) -> Result<Option<Application>> {
        application::decide(&mut *self.conn()?, id, status, None)
    }
}
