use crate::features::settings::models::{ExtractionOutcome, ExtractionResult};
use crate::shared::config::SettingsFileSpec;
use crate::shared::error::CollectionError;
use crate::shared::utils::{file_times, join_relative};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

fn restrict_object(object: &Map<String, Value>, keys: &[String]) -> Map<String, Value> {
    keys.iter()
        .filter_map(|key| object.get(key).map(|value| (key.clone(), value.clone())))
        .collect()
}

/// Restricts `data` to the requested keys.
///
/// Objects keep only the requested keys that are present. Lists keep only the
/// objects holding at least one requested key, each restricted the same way.
/// Any other shape returns `None`.
pub fn extract_keys(data: &Value, keys: &[String]) -> Option<Value> {
    match data {
        Value::Array(items) => Some(Value::Array(
            items
                .iter()
                .filter_map(Value::as_object)
                .filter(|item| keys.iter().any(|key| item.contains_key(key)))
                .map(|item| Value::Object(restrict_object(item, keys)))
                .collect(),
        )),
        Value::Object(object) => Some(Value::Object(restrict_object(object, keys))),
        _ => None,
    }
}

fn is_empty_match(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.is_empty(),
        Value::Object(object) => object.is_empty(),
        _ => true,
    }
}

fn extract_from_file(path: &Path, keys: &[String]) -> Result<Option<String>, CollectionError> {
    let raw = fs::read_to_string(path)?;
    // Some clients write a UTF-8 BOM
    let data: Value = serde_json::from_str(raw.trim_start_matches('\u{feff}'))?;

    match extract_keys(&data, keys) {
        Some(extracted) if !is_empty_match(&extracted) => {
            Ok(Some(serde_json::to_string_pretty(&extracted)?))
        }
        _ => Ok(None),
    }
}

pub fn read_settings_file(target_folder: &Path, spec: &SettingsFileSpec) -> ExtractionResult {
    let file_path = join_relative(target_folder, &spec.file_name);
    let (created_date, modified_date) = file_times(&file_path);

    let outcome = if !file_path.is_file() {
        debug!("Settings file does not exist: {}", file_path.display());
        ExtractionOutcome::Missing
    } else {
        match extract_from_file(&file_path, &spec.keys) {
            Ok(Some(content)) => ExtractionOutcome::Extracted(content),
            Ok(None) => ExtractionOutcome::NoMatchingKeys,
            Err(e) => {
                warn!("Failed to read settings file {}: {}", file_path.display(), e);
                ExtractionOutcome::Failed(e)
            }
        }
    };

    ExtractionResult {
        file_name: spec.file_name.clone(),
        file_path: file_path.display().to_string(),
        outcome,
        created_date,
        modified_date,
    }
}

/// One result per configured file, in configuration order.
pub fn read_settings_files(target_folder: &Path, specs: &[SettingsFileSpec]) -> Vec<ExtractionResult> {
    specs
        .iter()
        .map(|spec| read_settings_file(target_folder, spec))
        .collect()
}
