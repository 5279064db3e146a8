//! Catalog provider and configuration assembly.
//!
//! Providers hand over module rows and global parameters. Rows are accepted
//! one at a time: a malformed row is skipped and reported, the rest of the
//! load continues.

use std::collections::BTreeMap;

use serde_json::Value;

use habitat_core::{Catalog, GlobalParams, HabitatConfig, ModuleTypeDef};

use crate::error::ConfigError;

/// Source of module definitions and global parameters.
pub trait CatalogProvider {
    fn list_module_types(&self) -> Vec<ModuleTypeDef>;
    fn global_param(&self, key: &str) -> Option<Value>;
    fn global_keys(&self) -> Vec<String>;
}

/// Provider backed by a JSON document of the form
/// `{ "globals": { key: value, ... }, "modules": [ row, ... ] }`.
#[derive(Debug, Default)]
pub struct JsonCatalogSource {
    modules: Vec<ModuleTypeDef>,
    globals: BTreeMap<String, Value>,
    skipped: Vec<ConfigError>,
}

fn check_row(def: &ModuleTypeDef) -> Result<(), String> {
    if def.key.trim().is_empty() {
        return Err("empty key".to_string());
    }
    let numbers = [
        ("referenceVolumeM3", def.reference_volume_m3),
        ("minVolumeM3", def.min_volume_m3),
        ("massKg", def.mass_kg),
        ("crewCapacity", def.crew_capacity),
    ];
    for (name, v) in numbers {
        if !v.is_finite() || v < 0.0 {
            return Err(format!("{} must be a non-negative number", name));
        }
    }
    Ok(())
}

impl JsonCatalogSource {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let doc: Value = serde_json::from_str(json)?;
        let obj = doc.as_object().ok_or(ConfigError::InvalidDocument)?;

        let mut source = Self::default();
        if let Some(rows) = obj.get("modules") {
            let rows = rows.as_array().ok_or(ConfigError::InvalidDocument)?;
            for (index, row) in rows.iter().enumerate() {
                let parsed = serde_json::from_value::<ModuleTypeDef>(row.clone())
                    .map_err(|e| e.to_string())
                    .and_then(|def| check_row(&def).map(|_| def));
                match parsed {
                    Ok(def) => source.modules.push(def),
                    Err(reason) => source.skip(ConfigError::MalformedRow { index, reason }),
                }
            }
        }
        if let Some(globals) = obj.get("globals") {
            let globals = globals.as_object().ok_or(ConfigError::InvalidDocument)?;
            for (key, value) in globals {
                source.globals.insert(key.clone(), value.clone());
            }
        }
        log::info!(
            "Catalog source read: {} module types, {} globals, {} rows skipped",
            source.modules.len(),
            source.globals.len(),
            source.skipped.len()
        );
        Ok(source)
    }

    fn skip(&mut self, err: ConfigError) {
        log::warn!("{}", err);
        self.skipped.push(err);
    }

    /// Rows that were rejected while reading.
    pub fn skipped(&self) -> &[ConfigError] {
        &self.skipped
    }
}

impl CatalogProvider for JsonCatalogSource {
    fn list_module_types(&self) -> Vec<ModuleTypeDef> {
        self.modules.clone()
    }

    fn global_param(&self, key: &str) -> Option<Value> {
        self.globals.get(key).cloned()
    }

    fn global_keys(&self) -> Vec<String> {
        self.globals.keys().cloned().collect()
    }
}

/// Fold a provider's output over the default parameters. Each global is
/// applied on its own; unknown or ill-typed ones are skipped and returned.
pub fn build_config(provider: &dyn CatalogProvider) -> (HabitatConfig, Vec<ConfigError>) {
    let mut problems = Vec::new();
    let mut params = GlobalParams::default();

    for key in provider.global_keys() {
        let Some(value) = provider.global_param(&key) else {
            continue;
        };
        match apply_global(&params, &key, value) {
            Ok(next) => params = next,
            Err(err) => {
                log::warn!("{}", err);
                problems.push(err);
            }
        }
    }

    let catalog = Catalog::new(provider.list_module_types());
    if catalog.is_empty() {
        log::warn!("Catalog provider returned no module types");
    }
    (HabitatConfig::new(catalog, params), problems)
}

fn apply_global(params: &GlobalParams, key: &str, value: Value) -> Result<GlobalParams, ConfigError> {
    let mut object = match serde_json::to_value(params)? {
        Value::Object(map) => map,
        _ => return Err(ConfigError::InvalidDocument),
    };
    if !object.contains_key(key) {
        return Err(ConfigError::UnknownGlobal(key.to_string()));
    }
    object.insert(key.to_string(), value);
    serde_json::from_value(Value::Object(object)).map_err(|e| ConfigError::WrongGlobalType {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
