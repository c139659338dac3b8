use alloc::string::{String, ToString};
use hashbrown::HashMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::*;

/// Value type stored under a fixed key.
pub trait StorageKey {
    const KEY: &'static str;
}

/// Key/value store handed to the core by its host.
///
/// Values are JSON text. The typed helpers fall back to the default when a key is missing or
/// does not decode.
pub trait Storage {
    fn get_raw(&self, key: &str) -> Option<String>;

    fn set_raw(&mut self, key: &str, value: String) -> Result<()>;

    fn get_or_default<T>(&self) -> T
    where
        T: StorageKey + DeserializeOwned + Default,
    {
        let Some(raw) = self.get_raw(T::KEY) else {
            return T::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            log::warn!("Could not decode {}: {}", T::KEY, err);
            T::default()
        })
    }

    fn set<T>(&mut self, value: &T) -> Result<()>
    where
        T: StorageKey + Serialize,
    {
        let raw = serde_json::to_string(value).map_err(|err| GameError::Storage(err.to_string()))?;
        self.set_raw(T::KEY, raw)
    }
}

/// Volatile store, for tests and hosts without persistence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_raw(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set_raw(&mut self, key: &str, value: String) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BestScore(pub u32);

impl StorageKey for BestScore {
    const KEY: &'static str = "snake3d:best-score";
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstructionsSeen(pub bool);

impl StorageKey for InstructionsSeen {
    const KEY: &'static str = "snake3d:instructions-seen";
}

/// Best score and first-run flag, kept in the host's store.
#[derive(Clone, Debug, Default)]
pub struct Records<S> {
    store: S,
}

impl<S: Storage> Records<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn best_score(&self) -> u32 {
        self.store.get_or_default::<BestScore>().0
    }

    /// Stores `score` if it beats the best one, returns whether it did.
    pub fn record_final_score(&mut self, score: u32) -> Result<bool> {
        let best = self.best_score();
        if score <= best {
            return Ok(false);
        }
        log::info!("New best score {} (was {})", score, best);
        self.store.set(&BestScore(score))?;
        Ok(true)
    }

    pub fn instructions_seen(&self) -> bool {
        self.store.get_or_default::<InstructionsSeen>().0
    }

    pub fn mark_instructions_seen(&mut self) -> Result<()> {
        self.store.set(&InstructionsSeen(true))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}
