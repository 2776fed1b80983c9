//! Species catalog
//!
//! Built once at startup from an ordered YAML table and never mutated
//! afterwards. Entries either carry named fields or the legacy delimited
//! string `"category, localized name, image suffix"`; both are validated up
//! front so a bad row stops the server before it binds.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Catalog compiled into the server.
const EMBEDDED_CATALOG: &str = include_str!("../../catalog.yaml");

/// One species the service can answer for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRecord {
    /// Positive id, also the sprite number.
    pub id: i32,
    /// Lookup key, compared case-insensitively.
    pub english_name: String,
    pub localized_name: String,
    pub category: String,
}

/// A raw catalog row as written in the source table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogEntry {
    /// English name, the lookup key.
    pub name: String,
    /// Delimited form: `"category, localized name, image suffix"`.
    pub value: Option<String>,
    pub category: Option<String>,
    pub localized_name: Option<String>,
    pub image_suffix: Option<String>,
}

/// Malformed catalog source.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}'")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog: {0}")]
    Parse(String),

    #[error("catalog entry #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("catalog entry '{name}' has {found} comma-separated fields, expected 3")]
    MissingFields { name: String, found: usize },

    #[error(
        "catalog entry '{name}' needs either `value` or all of `category`, `localized_name`, `image_suffix`"
    )]
    IncompleteEntry { name: String },

    #[error("catalog entry '{name}' has image suffix '{suffix}', expected a positive integer")]
    InvalidImageSuffix { name: String, suffix: String },
}

/// Fields of a row after the delimited form has been split.
struct RowFields {
    category: String,
    localized_name: String,
    image_suffix: String,
}

impl CatalogEntry {
    /// Entry in the legacy delimited form.
    pub fn delimited(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    fn fields(&self, name: &str) -> Result<RowFields, CatalogError> {
        if let Some(value) = &self.value {
            let parts: Vec<&str> = value.split(',').map(str::trim).collect();
            let [category, localized_name, image_suffix, ..] = parts.as_slice() else {
                return Err(CatalogError::MissingFields {
                    name: name.to_owned(),
                    found: parts.len(),
                });
            };
            return Ok(RowFields {
                category: (*category).to_owned(),
                localized_name: (*localized_name).to_owned(),
                image_suffix: (*image_suffix).to_owned(),
            });
        }

        match (&self.category, &self.localized_name, &self.image_suffix) {
            (Some(category), Some(localized_name), Some(image_suffix)) => Ok(RowFields {
                category: category.trim().to_owned(),
                localized_name: localized_name.trim().to_owned(),
                image_suffix: image_suffix.trim().to_owned(),
            }),
            _ => Err(CatalogError::IncompleteEntry {
                name: name.to_owned(),
            }),
        }
    }

    fn into_record(self, index: usize) -> Result<CatalogRecord, CatalogError> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(CatalogError::EmptyName { index });
        }

        let fields = self.fields(&name)?;
        let id = fields
            .image_suffix
            .parse::<i32>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| CatalogError::InvalidImageSuffix {
                name: name.clone(),
                suffix: fields.image_suffix.clone(),
            })?;

        Ok(CatalogRecord {
            id,
            english_name: name,
            localized_name: fields.localized_name,
            category: fields.category,
        })
    }
}

/// Ordered, immutable set of records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CatalogRecord>,
}

impl Catalog {
    /// Build a catalog from entries, keeping their order.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed entry.
    pub fn load(entries: impl IntoIterator<Item = CatalogEntry>) -> Result<Self, CatalogError> {
        let records = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_record(index))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id) {
                tracing::warn!(id = record.id, name = %record.english_name, "duplicate catalog id");
            }
        }

        Ok(Self { records })
    }

    /// Parse and load a YAML sequence of entries.
    ///
    /// # Errors
    ///
    /// Fails if the text is not a sequence of entries or any entry is malformed.
    pub fn from_yaml(text: &str) -> Result<Self, CatalogError> {
        let entries: Vec<CatalogEntry> =
            serde_saphyr::from_str(text).map_err(|e| CatalogError::Parse(e.to_string()))?;
        Self::load(entries)
    }

    /// Load a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or its content is malformed.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// The catalog compiled into the binary.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded table is malformed.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_yaml(EMBEDDED_CATALOG)
    }

    /// Records in source order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
