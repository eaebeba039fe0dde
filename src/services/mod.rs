//! Request-independent business rules. Every function takes the repository
//! explicitly and returns an [`AppError`](crate::error::AppError) the HTTP
//! layer can render as is.

pub mod applications;
pub mod leases;
pub mod managers;
pub mod properties;
pub mod tenants;
