//! Identity to name mapping backed by the host's `usercache.json`.

use crate::core::{Identity, RestoreError, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Looks up the last known username of an identity.
pub trait NameDirectory: Send + Sync {
    fn name_of(&self, identity: &Identity) -> Option<String>;

    /// Re-reads the backing record, if there is one.
    fn refresh(&self) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UserCacheEntry {
    name: String,
    uuid: String,
}

/// `usercache.json` reader. A missing file is an empty cache.
pub struct UserCache {
    path: PathBuf,
    names: RwLock<HashMap<Identity, String>>,
}

impl UserCache {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let cache = Self {
            path: path.as_ref().to_path_buf(),
            names: RwLock::new(HashMap::new()),
        };
        cache.refresh()?;
        Ok(cache)
    }

    pub fn len(&self) -> usize {
        self.names.read().map(|names| names.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_entries(&self) -> Result<HashMap<Identity, String>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(RestoreError::storage(&self.path, err)),
        };
        if raw.trim().is_empty() {
            return Ok(HashMap::new());
        }

        let entries: Vec<UserCacheEntry> =
            serde_json::from_str(&raw).map_err(|e| RestoreError::Storage {
                path: self.path.clone(),
                reason: format!("malformed user cache: {}", e),
            })?;

        let mut names = HashMap::with_capacity(entries.len());
        for entry in entries {
            match Identity::parse(&entry.uuid) {
                Some(identity) => {
                    names.insert(identity, entry.name);
                }
                None => debug!(uuid = %entry.uuid, "skipping user cache entry with bad uuid"),
            }
        }
        Ok(names)
    }
}

impl NameDirectory for UserCache {
    fn name_of(&self, identity: &Identity) -> Option<String> {
        self.names
            .read()
            .ok()
            .and_then(|names| names.get(identity).cloned())
    }

    fn refresh(&self) -> Result<()> {
        let fresh = self.read_entries()?;
        let mut names = self
            .names
            .write()
            .map_err(|e| RestoreError::Worker(format!("user cache lock poisoned: {}", e)))?;
        *names = fresh;
        Ok(())
    }
}

impl NameDirectory for HashMap<Identity, String> {
    fn name_of(&self, identity: &Identity) -> Option<String> {
        self.get(identity).cloned()
    }
}
