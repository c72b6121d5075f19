use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    JsonDecode(serde_json::Error),
    JsonEncode(serde_json::Error),
    TomlDecode(toml::de::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::Io(err) => write!(f, "io error: {err}"),
            StorageError::JsonDecode(err) => write!(f, "failed to parse JSON collection: {err}"),
            StorageError::JsonEncode(err) => write!(f, "failed to encode JSON collection: {err}"),
            StorageError::TomlDecode(err) => write!(f, "failed to parse TOML config: {err}"),
        }
    }
}

impl std::error::Error for StorageError {}

pub fn load_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StorageError::Io(err)),
    };

    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(&raw).map_err(StorageError::JsonDecode)
}

pub fn load_or_empty<T: DeserializeOwned>(path: &Path) -> Vec<T> {
    match load_collection(path) {
        Ok(items) => items,
        Err(err) => {
            eprintln!(
                "warning: failed to load {}: {err}; starting with an empty collection",
                path.display()
            );
            Vec::new()
        }
    }
}

pub fn save_collection<T: Serialize>(path: &Path, items: &[T]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(StorageError::Io)?;
        }
    }

    let body = serde_json::to_string_pretty(items).map_err(StorageError::JsonEncode)?;
    fs::write(path, body).map_err(StorageError::Io)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub day_start_hour: u32,
    pub day_end_hour: u32,
    pub hour_height: u32,
    pub stats_window_days: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            day_start_hour: 8,
            day_end_hour: 22,
            hour_height: 2,
            stats_window_days: 7,
        }
    }
}

pub fn load_config(path: &Path) -> Config {
    let raw = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == ErrorKind::NotFound => return Config::default(),
        Err(err) => {
            eprintln!("warning: failed to read {}: {err}; using defaults", path.display());
            return Config::default();
        }
    };

    match toml::from_str(&raw).map_err(StorageError::TomlDecode) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("warning: {err} in {}; using defaults", path.display());
            Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use chrono::NaiveDate;

    use crate::domain::{Priority, Task};

    use super::{Config, load_collection, load_config, load_or_empty, save_collection};

    fn temp_file(name: &str) -> PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("{}_{}", name, std::process::id()));
        path
    }

    fn sample_task() -> Task {
        Task {
            id: "t1".to_string(),
            title: "Morning meditation".to_string(),
            category_id: "c1".to_string(),
            priority: Priority::Medium,
            completed: false,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 4).expect("date should be valid"),
            start_time: Some("08:00".to_string()),
            end_time: Some("08:15".to_string()),
            duration: 15,
        }
    }

    #[test]
    fn round_trips_a_task_collection() {
        let path = temp_file("tempo_storage_roundtrip.json");
        let tasks = vec![sample_task()];
        save_collection(&path, &tasks).expect("save should succeed");

        let loaded: Vec<Task> = load_collection(&path).expect("load should succeed");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "t1");
        assert_eq!(loaded[0].due_date, tasks[0].due_date);
        assert_eq!(loaded[0].start_time.as_deref(), Some("08:00"));
        assert_eq!(loaded[0].end_time.as_deref(), Some("08:15"));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn serializes_camel_case_fields_and_iso_dates() {
        let path = temp_file("tempo_storage_shape.json");
        save_collection(&path, &[sample_task()]).expect("save should succeed");
        let raw = fs::read_to_string(&path).expect("file should exist");
        assert!(raw.contains("\"categoryId\""));
        assert!(raw.contains("\"dueDate\": \"2026-03-04\""));
        assert!(raw.contains("\"startTime\""));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_loads_as_empty() {
        let path = temp_file("tempo_storage_missing.json");
        let _ = fs::remove_file(&path);
        let loaded: Vec<Task> = load_collection(&path).expect("missing file should not error");
        assert!(loaded.is_empty());
    }

    #[test]
    fn malformed_json_degrades_to_empty() {
        let path = temp_file("tempo_storage_malformed.json");
        fs::write(&path, "{not json").expect("write should succeed");
        let loaded: Vec<Task> = load_or_empty(&path);
        assert!(loaded.is_empty());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn config_defaults_when_file_absent() {
        let path = temp_file("tempo_config_missing.toml");
        let _ = fs::remove_file(&path);
        let config = load_config(&path);
        assert_eq!(config.day_start_hour, 8);
        assert_eq!(config.day_end_hour, 22);
        assert_eq!(config.hour_height, 2);
        assert_eq!(config.stats_window_days, 7);
    }

    #[test]
    fn config_accepts_partial_overrides() {
        let path = temp_file("tempo_config_partial.toml");
        fs::write(&path, "day_start_hour = 6\n").expect("write should succeed");
        let config = load_config(&path);
        assert_eq!(config.day_start_hour, 6);
        assert_eq!(config.day_end_hour, Config::default().day_end_hour);
        let _ = fs::remove_file(path);
    }
}
