// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Durable local key-value store.
//!
//! Persists JSON-serializable values under string keys and survives process
//! restarts. Every collection mutation is written through immediately, so a
//! restart mid-drain resumes with an accurate queue.
//!
//! Two implementations are provided: [`MemoryStore`] for tests and ephemeral
//! use, and [`FileStore`] which keeps one fsynced JSON file per key.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Storage keys used by the sync engine.
pub mod keys {
    /// Task collection.
    pub const TASKS: &str = "tasks";
    /// List collection.
    pub const LISTS: &str = "lists";
    /// Moment collection.
    pub const MOMENTS: &str = "moments";
    /// User profile.
    pub const PROFILE: &str = "profile";
    /// Offline operation queue.
    pub const SYNC_QUEUE: &str = "sync_queue";
    /// Signed-in user id, for session restore.
    pub const SESSION: &str = "session";
}

/// Durable key-value store contract.
///
/// Synchronous from the caller's perspective; implementations may buffer
/// internally but must be readable at startup.
pub trait DurableStore: Send {
    /// Read the raw value stored under `key`, if any.
    fn get_value(&self, key: &str) -> Option<Value>;

    /// Write a raw value under `key`, replacing any previous value.
    fn set_value(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove the value stored under `key`.
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Read and deserialize the value under `key`.
    ///
    /// Returns `None` on missing or corrupt data; corruption is logged and
    /// treated as absent rather than fatal.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T>
    where
        Self: Sized,
    {
        let value = self.get_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "discarding corrupt stored value");
                None
            }
        }
    }

    /// Serialize and write `value` under `key`.
    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()>
    where
        Self: Sized,
    {
        self.set_value(key, serde_json::to_value(value).map_err(crate::error::Error::Json)?)
    }
}

/// In-memory store. Contents do not survive the process; intended for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl DurableStore for MemoryStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// File-backed store: one JSON file per key, fsynced on every write.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(FileStore {
            dir: dir.to_path_buf(),
        })
    }

    /// Default data directory for the current platform.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daybook")
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl DurableStore for FileStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!(key, error = %e, "unreadable store file");
                None
            }
        }
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<()> {
        let mut file = File::create(self.path_for(key))?;
        serde_json::to_writer(&mut file, &value).map_err(crate::error::Error::Json)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
