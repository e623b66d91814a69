//! Users REST API service.
//!
//! Handlers return `Result`s; [`api::respond::fallible`] turns their errors
//! into JSON bodies through [`api::error::classify`].

pub mod api;
pub mod config;
pub mod doc;
pub mod middleware;
pub mod models;
pub mod storage;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
