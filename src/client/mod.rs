//! The search page side of the marketplace: filter state, its mirror in the
//! page URL, and a typed client for the HTTP API.

pub mod api;
pub mod filters;
pub mod url_sync;
