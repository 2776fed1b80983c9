//! Domain layer for the pokedex module
//!
//! Contains the catalog and the lookup logic.

pub mod catalog;
pub mod service;

pub use catalog::{Catalog, CatalogEntry, CatalogError, CatalogRecord};
pub use service::Service;
