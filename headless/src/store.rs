use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde_json::Value;
use snake3d_core::{GameError, Storage};

/// [`Storage`] kept in a single JSON object on disk, rewritten on every change.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl JsonFileStorage {
    /// Opens `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let values = match fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)
                .with_context(|| format!("Store {} is not a JSON object", path.display()))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err).with_context(|| format!("Could not read store {}", path.display()));
            }
        };
        log::debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> io::Result<()> {
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, text)
    }
}

impl Storage for JsonFileStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.values.get(key).map(Value::to_string)
    }

    fn set_raw(&mut self, key: &str, value: String) -> snake3d_core::Result<()> {
        let value: Value =
            serde_json::from_str(&value).map_err(|err| GameError::Storage(err.to_string()))?;
        self.values.insert(key.to_owned(), value);
        self.save().map_err(|err| GameError::Storage(err.to_string()))
    }
}
