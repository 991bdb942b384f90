//! Configuration file upgrades: detect keys added in newer versions and
//! fill them in with their defaults, leaving existing values untouched.

use super::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{info, success};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path)?;
    let yaml: Value = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;

    match yaml {
        Value::Mapping(map) => Ok(map),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{}: expected a YAML mapping at top level",
            path.display()
        ))),
    }
}

fn defaults_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default()) {
        Ok(Value::Mapping(map)) => Ok(map),
        Ok(_) => Err(AppError::Config("default configuration is not a mapping".into())),
        Err(e) => Err(AppError::Config(e.to_string())),
    }
}

/// Recursively add keys of `defaults` missing from `target`.
/// Returns the dotted paths of the keys that were added.
fn merge_missing(target: &mut Mapping, defaults: &Mapping, prefix: &str, added: &mut Vec<String>) {
    for (key, default_value) in defaults {
        let name = key.as_str().unwrap_or_default();
        let dotted = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}.{name}")
        };

        match target.get_mut(key) {
            None => {
                target.insert(key.clone(), default_value.clone());
                added.push(dotted);
            }
            Some(Value::Mapping(existing)) => {
                if let Value::Mapping(nested_defaults) = default_value {
                    merge_missing(existing, nested_defaults, &dotted, added);
                }
            }
            Some(_) => {}
        }
    }
}

/// List the keys missing from the config file at `path`.
pub fn missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(path)?;
    let mut added = Vec::new();
    merge_missing(&mut current, &defaults_mapping()?, "", &mut added);
    Ok(added)
}

/// Add every missing key to the config file at `path`.
/// Returns the keys that were written; the file is untouched when none are missing.
pub fn migrate_config_file(path: &Path) -> AppResult<Vec<String>> {
    let mut current = read_mapping(path)?;
    let mut added = Vec::new();
    merge_missing(&mut current, &defaults_mapping()?, "", &mut added);

    if added.is_empty() {
        info("Configuration file is up to date.");
        return Ok(added);
    }

    let serialized = serde_yaml::to_string(&Value::Mapping(current))
        .map_err(|e| AppError::Config(format!("{}: {e}", path.display())))?;
    fs::write(path, serialized)?;

    success(format!("Configuration migrated, added: {}", added.join(", ")));
    Ok(added)
}
