//! Cart Storage
//!
//! The cart survives reloads by being written, whole, under a fixed key after every change.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use rustc_hash::FxHashMap;

use crate::cart::{Cart, StorageError};

/// Key the cart is stored under.
pub const CART_STORAGE_KEY: &str = "dishpatch.cart";

/// Durable client-side storage for the cart.
pub trait CartStorage {
    /// Read the stored cart, if one has been saved.
    ///
    /// # Errors
    ///
    /// Returns an error when the stored data cannot be read or decoded.
    fn load(&self) -> Result<Option<Cart>, StorageError>;

    /// Replace the stored cart.
    ///
    /// # Errors
    ///
    /// Returns an error when the cart cannot be encoded or written.
    fn save(&mut self, cart: &Cart) -> Result<(), StorageError>;
}

/// Key-value storage held in memory.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl MemoryStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store a raw value under a key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        self.get(CART_STORAGE_KEY)
            .map(serde_json::from_str)
            .transpose()
            .map_err(StorageError::from)
    }

    fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;

        self.insert(CART_STORAGE_KEY, json);

        Ok(())
    }
}

/// JSON file storage inside a profile directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Store the cart inside `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the cart file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{CART_STORAGE_KEY}.json"))
    }
}

impl CartStorage for FileStorage {
    fn load(&self) -> Result<Option<Cart>, StorageError> {
        let json = match fs::read_to_string(self.path()) {
            Ok(json) => json,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(error) => return Err(error.into()),
        };

        Ok(Some(serde_json::from_str(&json)?))
    }

    fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;

        let path = self.path();
        let staging = staging_path(&path);

        fs::write(&staging, serde_json::to_vec(cart)?)?;
        fs::rename(&staging, &path)?;

        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}
