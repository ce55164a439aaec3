//! LocalStorage-backed high score (web only)

use crate::highscores::{HighScoreStore, STORAGE_KEY, StorageError};

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

impl HighScoreStore for LocalStorageStore {
    fn read(&self) -> Option<String> {
        Self::storage()?.get_item(STORAGE_KEY).ok()?
    }

    fn write(&mut self, raw: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(STORAGE_KEY, raw)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }
}
