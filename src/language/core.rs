use include_dir::{include_dir, Dir};
use serde::Deserialize;
use serde_json::from_str;

use crate::error::ConfigError;

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

/// Name of the catalog shipped with the binary.
pub const BUILTIN_CATALOG: &str = "turkish";

#[derive(Deserialize, Clone, Debug)]
pub struct Catalog {
    pub name: String,
    pub words: Vec<String>,
}

impl Catalog {
    /// Load one of the catalogs embedded under `src/lang`.
    pub fn load(name: &str) -> Result<Self, ConfigError> {
        read_catalog_from_file(&format!("{name}.json"))
    }

    pub fn builtin() -> Result<Self, ConfigError> {
        Self::load(BUILTIN_CATALOG)
    }
}

fn read_catalog_from_file(file_name: &str) -> Result<Catalog, ConfigError> {
    let file = LANG_DIR
        .get_file(file_name)
        .ok_or_else(|| ConfigError::CatalogNotFound(file_name.to_string()))?;

    let file_as_str = file
        .contents_utf8()
        .ok_or_else(|| ConfigError::CatalogNotFound(file_name.to_string()))?;

    Ok(from_str(file_as_str)?)
}
