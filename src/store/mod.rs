use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

pub const USER_KEY: &str = "demo_user";
pub const PROJECTS_KEY: &str = "demo_projects";
pub const VOTES_KEY: &str = "demo_votes";
pub const PREFERENCES_KEY: &str = "userPreferences";

const KNOWN_KEYS: [&str; 4] = [USER_KEY, PROJECTS_KEY, VOTES_KEY, PREFERENCES_KEY];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Key/value store with one JSON document per key, standing in for the
/// browser's localStorage.
#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[cfg(test)]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Missing, unreadable and malformed entries all read as `None`.
    pub fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return None,
            Err(err) => {
                error!(key, error = %err, "error reading stored item");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                error!(key, error = %err, "error decoding stored item");
                None
            }
        }
    }

    pub fn set_item<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let encoded = serde_json::to_string_pretty(value).map_err(|source| {
            error!(key, error = %source, "error encoding item");
            StoreError::Encode {
                key: key.to_string(),
                source,
            }
        })?;

        // Write next to the target then rename so readers never see half a file.
        let target = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, encoded)
            .and_then(|_| fs::rename(&tmp, &target))
            .map_err(|source| {
                error!(key, error = %source, "error storing item");
                StoreError::Io {
                    key: key.to_string(),
                    source,
                }
            })?;

        debug!(key, "stored item");
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Drop every key the app knows about.
    pub fn clear(&self) -> Result<(), StoreError> {
        for key in KNOWN_KEYS {
            self.remove_item(key)?;
        }
        Ok(())
    }
}
