pub mod application;
pub mod enums;
pub mod lease;
pub mod location;
pub mod manager;
pub mod payment;
pub mod profile;
pub mod property;
pub mod tenant;
