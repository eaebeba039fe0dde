extern crate chrono;
extern crate diesel;
extern crate tokio;
pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod geocoder;
pub mod logger;
pub mod models;
pub mod search;
pub mod services;
pub mod web;
