//! Local key/value store for the client-side state blobs
//!
//! Each key holds one JSON document, mirroring what the web client kept in
//! browser local storage. There is no versioning: a blob that no longer
//! parses is reported and can be removed by the caller.

use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use thiserror::Error;

/// Key of the persisted cart
pub const CART_KEY: &str = "cart-storage";

/// Key of the admin session token and expiry
pub const ADMIN_SESSION_KEY: &str = "admin-session";

/// Key of the logged-in admin user record
pub const ADMIN_USER_KEY: &str = "admin-user";

/// Key of the admin settings object
pub const SETTINGS_KEY: &str = "admin-settings";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("Corrupt value under key '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// JSON document store on top of an embedded sled database
#[derive(Debug, Clone)]
pub struct LocalStore {
    db: sled::Db,
}

impl LocalStore {
    /// Open (or create) the store at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Throwaway store that disappears on drop, for tests and dry runs
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }

    /// Read and decode the value under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.db.get(key)? {
            Some(bytes) => serde_json::from_slice(&bytes)
                .map(Some)
                .map_err(|source| StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                }),
            None => Ok(None),
        }
    }

    /// Encode and write `value` under `key`, flushing to disk
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.db.insert(key, bytes)?;
        self.db.flush()?;
        tracing::debug!(key = %key, "Stored value");
        Ok(())
    }

    /// Delete `key`; returns whether something was there
    pub fn remove(&self, key: &str) -> Result<bool, StorageError> {
        let existed = self.db.remove(key)?.is_some();
        self.db.flush()?;
        Ok(existed)
    }

    pub fn contains(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.db.contains_key(key)?)
    }
}
