//! Persisted best score
//!
//! A single numeric value stored under one key. Reads never fail: a missing
//! or unreadable value falls back to 0. Writes happen on every change.

use std::path::PathBuf;

use thiserror::Error;

/// Storage key shared by every backend
pub const STORAGE_KEY: &str = "fruitShooterHighScore";

/// Failures writing the persisted high score
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage write rejected: {0}")]
    Rejected(String),
    #[error("high score file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Key-value backend holding the raw persisted text
pub trait HighScoreStore {
    /// Raw stored value, if any
    fn read(&self) -> Option<String>;
    fn write(&mut self, raw: &str) -> Result<(), StorageError>;
}

/// Decode a stored value, accepting any non-negative JSON number
pub fn parse_high_score(raw: &str) -> Option<u64> {
    let value: f64 = serde_json::from_str(raw.trim()).ok()?;
    (value.is_finite() && value >= 0.0).then(|| value.floor() as u64)
}

/// The best score seen so far, backed by a store
#[derive(Debug)]
pub struct HighScore<S: HighScoreStore> {
    best: u64,
    store: S,
}

impl<S: HighScoreStore> HighScore<S> {
    /// Read the persisted value once; anything unusable counts as 0
    pub fn load(store: S) -> Self {
        let best = match store.read() {
            Some(raw) => parse_high_score(&raw).unwrap_or_else(|| {
                log::warn!("Ignoring unreadable high score {:?}", raw);
                0
            }),
            None => {
                log::info!("No high score found, starting fresh");
                0
            }
        };
        Self { best, store }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Record a finished run. Returns true when it beat the stored best.
    ///
    /// The in-memory best is updated even if persisting fails; the failure
    /// is logged and otherwise ignored.
    pub fn submit(&mut self, score: u64) -> bool {
        if score <= self.best {
            return false;
        }
        self.best = score;
        match self.store.write(&score.to_string()) {
            Ok(()) => log::info!("High score saved ({})", score),
            Err(e) => log::warn!("Failed to save high score: {}", e),
        }
        true
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Volatile store for tests and headless runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: Option<String>,
}

impl MemoryStore {
    pub fn with_value(raw: &str) -> Self {
        Self {
            value: Some(raw.to_string()),
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn read(&self) -> Option<String> {
        self.value.clone()
    }

    fn write(&mut self, raw: &str) -> Result<(), StorageError> {
        self.value = Some(raw.to_string());
        Ok(())
    }
}

/// Plain-text file holding the value (native builds)
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for FileStore {
    fn read(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }

    fn write(&mut self, raw: &str) -> Result<(), StorageError> {
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenStore;

    impl HighScoreStore for BrokenStore {
        fn read(&self) -> Option<String> {
            None
        }

        fn write(&mut self, _raw: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_parse_high_score() {
        assert_eq!(parse_high_score("500"), Some(500));
        assert_eq!(parse_high_score(" 750\n"), Some(750));
        assert_eq!(parse_high_score("12.9"), Some(12));
        assert_eq!(parse_high_score("-3"), None);
        assert_eq!(parse_high_score("\"abc\""), None);
        assert_eq!(parse_high_score("garbage"), None);
        assert_eq!(parse_high_score(""), None);
    }

    #[test]
    fn test_load_falls_back_to_zero() {
        assert_eq!(HighScore::load(MemoryStore::default()).best(), 0);
        assert_eq!(HighScore::load(MemoryStore::with_value("{oops")).best(), 0);
        assert_eq!(HighScore::load(MemoryStore::with_value("500")).best(), 500);
    }

    #[test]
    fn test_submit_only_persists_improvements() {
        let mut high = HighScore::load(MemoryStore::with_value("500"));

        assert!(!high.submit(300));
        assert_eq!(high.store().value.as_deref(), Some("500"));
        assert!(!high.submit(500));

        assert!(high.submit(750));
        assert_eq!(high.best(), 750);
        assert_eq!(high.store().value.as_deref(), Some("750"));
    }

    #[test]
    fn test_write_failure_is_not_fatal() {
        let mut high = HighScore::load(BrokenStore);
        assert!(high.submit(10));
        assert_eq!(high.best(), 10);
    }

    #[test]
    fn test_file_store_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "fruit-expansion-highscore-{}.txt",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        let mut high = HighScore::load(FileStore::new(&path));
        assert_eq!(high.best(), 0);
        assert!(high.submit(1234));

        let reloaded = HighScore::load(FileStore::new(&path));
        assert_eq!(reloaded.best(), 1234);
        let _ = std::fs::remove_file(&path);
    }
}
