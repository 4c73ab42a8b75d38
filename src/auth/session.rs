use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::config;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corrupt session file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// Key/value storage that survives between invocations (the CLI's equivalent
/// of browser session storage)
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&self, key: &str) -> Result<(), SessionError>;
}

/// JSON object on disk, rewritten on every change
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut map = self.load()?;
        map.insert(key.to_string(), value.to_string());
        self.save(&map)
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut map = self.load()?;
        if map.remove(key).is_some() {
            self.save(&map)?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, SessionError> {
        self.values
            .lock()
            .map_err(|_| SessionError::Unavailable("memory store poisoned".to_string()))
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.lock()?.remove(key);
        Ok(())
    }
}

/// Bearer token and active tenant, stored under the configured keys
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn SessionStore>,
}

impl Session {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySessionStore::new()))
    }

    pub fn token(&self) -> Result<Option<String>, SessionError> {
        let keys = &config::config().session;
        match self.store.get(&keys.token_key)? {
            Some(token) if !token.is_empty() => Ok(Some(token)),
            _ => Ok(self.store.get(&keys.legacy_token_key)?.filter(|t| !t.is_empty())),
        }
    }

    /// `None` clears both the current and the legacy token key
    pub fn set_token(&self, token: Option<&str>) -> Result<(), SessionError> {
        let keys = &config::config().session;
        match token {
            Some(token) => self.store.set(&keys.token_key, token),
            None => {
                self.store.remove(&keys.token_key)?;
                self.store.remove(&keys.legacy_token_key)
            }
        }
    }

    pub fn school_id(&self) -> Result<Option<String>, SessionError> {
        let key = &config::config().session.school_id_key;
        Ok(self.store.get(key)?.filter(|s| !s.is_empty()))
    }

    pub fn set_school_id(&self, school_id: Option<&str>) -> Result<(), SessionError> {
        let key = &config::config().session.school_id_key;
        match school_id {
            Some(id) => self.store.set(key, id),
            None => self.store.remove(key),
        }
    }

    pub fn clear(&self) -> Result<(), SessionError> {
        self.set_token(None)?;
        self.set_school_id(None)
    }
}
