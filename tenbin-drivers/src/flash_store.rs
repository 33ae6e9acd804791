//! Flash-backed credential store
//!
//! Uses sequential-storage for wear-leveled key-value storage in a
//! dedicated flash partition. Values are postcard-encoded. The
//! `WifiConfigured` marker is the commit point: it is written after the
//! SSID and password on save, and cleared before anything is erased.

use core::ops::Range;

use embedded_storage_async::nor_flash::NorFlash;
use heapless::String;
use sequential_storage::cache::NoCache;
use sequential_storage::map;
use tenbin_hal::{
    CredentialError, CredentialStore, StorageError, StorageKey, WifiCredentials,
    MAX_PASSWORD_LEN, MAX_SSID_LEN,
};

/// Scratch buffer for one stored item (key, header, value)
const ITEM_BUF_LEN: usize = 128;
/// Largest encoded value: varint length plus a full password
const VALUE_BUF_LEN: usize = MAX_PASSWORD_LEN + 2;

/// Credential store over a NOR flash partition
pub struct FlashCredentialStore<F> {
    flash: F,
    range: Range<u32>,
}

impl<F: NorFlash> FlashCredentialStore<F> {
    /// Use `range` of `flash`; it must span at least two erase pages
    pub fn new(flash: F, range: Range<u32>) -> Self {
        Self { flash, range }
    }

    /// Give back the flash peripheral
    pub fn release(self) -> F {
        self.flash
    }

    async fn fetch_text<const N: usize>(
        &mut self,
        key: StorageKey,
    ) -> Result<Option<String<N>>, StorageError> {
        let mut buf = [0u8; ITEM_BUF_LEN];
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &key,
        )
        .await
        .map_err(|_| StorageError::Backend)?;

        let Some(bytes) = item else {
            return Ok(None);
        };
        let text: &str = postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted)?;
        let mut out = String::new();
        out.push_str(text).map_err(|_| StorageError::Corrupted)?;
        Ok(Some(out))
    }

    async fn fetch_flag(&mut self, key: StorageKey) -> Result<bool, StorageError> {
        let mut buf = [0u8; ITEM_BUF_LEN];
        let item = map::fetch_item::<StorageKey, &[u8], _>(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &key,
        )
        .await
        .map_err(|_| StorageError::Backend)?;

        match item {
            Some(bytes) => postcard::from_bytes(bytes).map_err(|_| StorageError::Corrupted),
            None => Ok(false),
        }
    }

    async fn store_text(&mut self, key: StorageKey, value: &str) -> Result<(), StorageError> {
        let mut encoded = [0u8; VALUE_BUF_LEN];
        let value = postcard::to_slice(value, &mut encoded).map_err(|_| StorageError::BufferTooSmall)?;
        self.store_raw(key, value).await
    }

    async fn store_flag(&mut self, key: StorageKey, value: bool) -> Result<(), StorageError> {
        let mut encoded = [0u8; 1];
        let value = postcard::to_slice(&value, &mut encoded).map_err(|_| StorageError::BufferTooSmall)?;
        self.store_raw(key, value).await
    }

    async fn store_raw(&mut self, key: StorageKey, value: &[u8]) -> Result<(), StorageError> {
        let mut buf = [0u8; ITEM_BUF_LEN];
        map::store_item(
            &mut self.flash,
            self.range.clone(),
            &mut NoCache::new(),
            &mut buf,
            &key,
            &value,
        )
        .await
        .map_err(|e| match e {
            sequential_storage::Error::FullStorage => StorageError::Full,
            _ => StorageError::Backend,
        })
    }

    async fn load_async(&mut self) -> Result<Option<WifiCredentials>, StorageError> {
        if !self.fetch_flag(StorageKey::WifiConfigured).await? {
            return Ok(None);
        }

        let ssid = self.fetch_text::<MAX_SSID_LEN>(StorageKey::WifiSsid).await?;
        let password = self
            .fetch_text::<MAX_PASSWORD_LEN>(StorageKey::WifiPassword)
            .await?;
        let (Some(ssid), Some(password)) = (ssid, password) else {
            warn!("Configured marker set without SSID/password");
            return Ok(None);
        };

        match WifiCredentials::new(&ssid, &password) {
            Ok(credentials) => Ok(Some(credentials)),
            Err(CredentialError::EmptySsid) => Ok(None),
            Err(_) => Err(StorageError::Corrupted),
        }
    }

    async fn store_async(&mut self, credentials: &WifiCredentials) -> Result<(), StorageError> {
        self.store_flag(StorageKey::WifiConfigured, false).await?;
        self.store_text(StorageKey::WifiSsid, credentials.ssid()).await?;
        self.store_text(StorageKey::WifiPassword, credentials.password())
            .await?;
        self.store_flag(StorageKey::WifiConfigured, true).await
    }

    async fn clear_async(&mut self) -> Result<(), StorageError> {
        self.store_flag(StorageKey::WifiConfigured, false).await?;
        self.flash
            .erase(self.range.start, self.range.end)
            .await
            .map_err(|_| StorageError::Backend)
    }
}

impl<F: NorFlash> CredentialStore for FlashCredentialStore<F> {
    fn load(&mut self) -> Result<Option<WifiCredentials>, StorageError> {
        embassy_futures::block_on(self.load_async())
    }

    fn store(&mut self, credentials: &WifiCredentials) -> Result<(), StorageError> {
        embassy_futures::block_on(self.store_async(credentials))
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        embassy_futures::block_on(self.clear_async())
    }
}
