//! File-backed credential store
//!
//! One TOML document with `ssid` and `password` keys. The file only exists
//! while a committed credential set exists; saving writes a temporary file
//! and renames it over the old one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use tenbin_hal::{CredentialStore, StorageError, WifiCredentials};

/// On-disk layout
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredentials {
    ssid: String,
    password: String,
}

pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn decode(text: &str) -> Result<WifiCredentials, StorageError> {
    let stored: StoredCredentials = toml::from_str(text).map_err(|e| {
        warn!("Credential file unreadable: {}", e);
        StorageError::Corrupted
    })?;
    WifiCredentials::new(&stored.ssid, &stored.password).map_err(|_| StorageError::Corrupted)
}

fn encode(credentials: &WifiCredentials) -> Result<String, StorageError> {
    let stored = StoredCredentials {
        ssid: credentials.ssid().to_string(),
        password: credentials.password().to_string(),
    };
    toml::to_string(&stored).map_err(|_| StorageError::Backend)
}

impl CredentialStore for FileCredentialStore {
    fn load(&mut self) -> Result<Option<WifiCredentials>, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!("Reading {}: {}", self.path.display(), e);
                return Err(StorageError::Backend);
            }
        };
        decode(&text).map(Some)
    }

    fn store(&mut self, credentials: &WifiCredentials) -> Result<(), StorageError> {
        let text = encode(credentials)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, text)
            .and_then(|()| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                warn!("Writing {}: {}", self.path.display(), e);
                StorageError::Backend
            })
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => {
                warn!("Removing {}: {}", self.path.display(), e);
                Err(StorageError::Backend)
            }
        }
    }
}
