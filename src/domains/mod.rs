//! Domains module containing the registrar's logic organized by bounded contexts.
//!
//! - **location**: finding resource files on disk and in the packaged namespace
//! - **kinds**: the resource kinds and how their registry keys are derived
//! - **backends**: the registries resources end up in
//! - **registration**: driving every kind through registration and teardown

pub mod backends;
pub mod kinds;
pub mod location;
pub mod registration;
