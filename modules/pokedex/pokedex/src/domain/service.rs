//! Domain service for the pokedex
//!
//! Answers name queries against the catalog. Stateless apart from the
//! read-only catalog, so one instance serves every request concurrently.

use std::sync::Arc;

use tracing::info;

use super::catalog::{Catalog, CatalogRecord};

/// Sprite location used when the configuration does not override it.
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/";

/// Lookup service over a shared catalog.
#[derive(Debug, Clone)]
pub struct Service {
    catalog: Arc<Catalog>,
    image_base_url: String,
}

impl Service {
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, image_base_url: impl Into<String>) -> Self {
        Self {
            catalog,
            image_base_url: image_base_url.into(),
        }
    }

    /// Find the record whose english name equals `query_name`, ignoring case.
    ///
    /// The whole catalog is scanned and the last match wins. The query is
    /// used as given; callers are expected to have trimmed it.
    #[must_use]
    pub fn lookup(&self, query_name: &str) -> Option<&CatalogRecord> {
        info!(query_name, "lookup requested");

        let wanted = query_name.to_lowercase();
        self.catalog
            .iter()
            .filter(|record| record.english_name.to_lowercase() == wanted)
            .last()
    }

    /// Sprite URL for a catalog id.
    #[must_use]
    pub fn image_url(&self, id: i32) -> String {
        format!("{}{id}.png", self.image_base_url)
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
