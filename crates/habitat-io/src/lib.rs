//! # Habitat I/O
//!
//! The persisted layout document (versioned JSON) and the catalog provider
//! that turns external module/parameter tables into a `HabitatConfig`.

pub mod catalog_source;
pub mod document;
pub mod error;

pub use catalog_source::{build_config, CatalogProvider, JsonCatalogSource};
pub use document::{export_json, import_for, import_json, LayoutDocument, SCHEMA_VERSION};
pub use error::{ConfigError, DocumentError};
