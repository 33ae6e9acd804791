//! Credential storage abstractions
//!
//! The credential set is persisted as three keyed entries. The
//! `WifiConfigured` flag is written last on save and first on clear, so a
//! torn write never leaves a half-configured device that believes it is
//! provisioned.

use crate::wifi::WifiCredentials;

/// Storage keys for credential data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Network SSID
    WifiSsid = 0,
    /// Network passphrase
    WifiPassword = 1,
    /// Commit marker; credentials are only valid while this is true
    WifiConfigured = 2,
}

impl StorageKey {
    /// Get the key as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create a key from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(StorageKey::WifiSsid),
            1 => Some(StorageKey::WifiPassword),
            2 => Some(StorageKey::WifiConfigured),
            _ => None,
        }
    }
}

/// Errors from credential storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Underlying medium failed (flash, filesystem)
    Backend,
    /// Stored data could not be decoded
    Corrupted,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
}

/// Persistent credential store
pub trait CredentialStore {
    /// Load the committed credential set
    ///
    /// Returns `Ok(None)` when nothing is stored or the commit marker is
    /// not set.
    fn load(&mut self) -> Result<Option<WifiCredentials>, StorageError>;

    /// Persist a credential set, replacing any existing one
    fn store(&mut self, credentials: &WifiCredentials) -> Result<(), StorageError>;

    /// Remove the stored credential set
    fn clear(&mut self) -> Result<(), StorageError>;

    /// Whether a committed credential set exists
    fn is_configured(&mut self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

// Implement the sequential-storage Key trait when the feature is enabled
#[cfg(feature = "sequential-storage")]
impl sequential_storage::map::Key for StorageKey {
    fn serialize_into(
        &self,
        buffer: &mut [u8],
    ) -> Result<usize, sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        buffer[0] = self.as_u8();
        Ok(1)
    }

    fn deserialize_from(
        buffer: &[u8],
    ) -> Result<(Self, usize), sequential_storage::map::SerializationError> {
        if buffer.is_empty() {
            return Err(sequential_storage::map::SerializationError::BufferTooSmall);
        }
        match StorageKey::from_u8(buffer[0]) {
            Some(key) => Ok((key, 1)),
            None => Err(sequential_storage::map::SerializationError::InvalidFormat),
        }
    }
}
