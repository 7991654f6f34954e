//! Configuration file checks: detect keys missing from an older file and
//! write them back with their default values.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

fn default_mapping() -> AppResult<Mapping> {
    match serde_yaml::to_value(Config::default())? {
        Value::Mapping(m) => Ok(m),
        _ => Err(AppError::Config("default configuration is not a mapping".into())),
    }
}

fn read_mapping(path: &Path) -> AppResult<Mapping> {
    let content = fs::read_to_string(path).map_err(|e| AppError::ConfigLoad(e.to_string()))?;
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(AppError::Config(format!(
            "{} does not contain a YAML mapping",
            path.display()
        ))),
    }
}

/// Collect dotted paths (`retry.max_attempts`) present in `defaults` but not in `actual`.
fn missing_in(defaults: &Mapping, actual: &Mapping, prefix: &str, out: &mut Vec<String>) {
    for (k, v) in defaults {
        let Some(key) = k.as_str() else { continue };
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        match (v, actual.get(k)) {
            (_, None) => out.push(path),
            (Value::Mapping(dm), Some(Value::Mapping(am))) => missing_in(dm, am, &path, out),
            _ => {}
        }
    }
}

fn fill_missing(defaults: &Mapping, actual: &mut Mapping) {
    for (k, v) in defaults {
        match actual.get_mut(k) {
            None => {
                actual.insert(k.clone(), v.clone());
            }
            Some(Value::Mapping(am)) => {
                if let Value::Mapping(dm) = v {
                    fill_missing(dm, am);
                }
            }
            Some(_) => {}
        }
    }
}

/// Keys missing from the configuration file at `path`.
pub fn check_missing_keys(path: &Path) -> AppResult<Vec<String>> {
    let actual = read_mapping(path)?;
    let mut missing = Vec::new();
    missing_in(&default_mapping()?, &actual, "", &mut missing);
    Ok(missing)
}

/// Add missing keys with default values.
/// Returns:
///   Ok(true)  → file rewritten
///   Ok(false) → nothing to do
pub fn migrate_config_file(path: &Path) -> AppResult<bool> {
    let mut actual = read_mapping(path)?;
    let defaults = default_mapping()?;

    let mut missing = Vec::new();
    missing_in(&defaults, &actual, "", &mut missing);
    if missing.is_empty() {
        return Ok(false);
    }

    fill_missing(&defaults, &mut actual);
    let yaml = serde_yaml::to_string(&Value::Mapping(actual))?;
    fs::write(path, yaml).map_err(|_| AppError::ConfigSave)?;
    Ok(true)
}
