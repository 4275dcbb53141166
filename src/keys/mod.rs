//! API-key rotation across scheduled invocations.
//!
//! [`KeyPool`] holds the ordered credential list from the environment.
//! [`RotationStore`] is the trait for persisting the rotation cursor;
//! [`FileRotationStore`] implements it with a locked JSON state file.
//! [`KeyRotator`] hands out the next key and keeps the store in sync.

mod file_store;
mod rotator;

pub use file_store::FileRotationStore;
pub use rotator::KeyRotator;

use std::path::PathBuf;

/// Errors surfaced by the rotation core.
///
/// A missing or unparseable state file is not represented here: reads heal
/// to cursor 0 so a lost state file only costs rotation fairness, never an
/// invocation.
#[derive(Debug, thiserror::Error)]
pub enum RotationError {
    #[error("no API keys configured; set ODDS_1, ODDS_2, ... in the environment")]
    EmptyPool,

    #[error("failed to persist rotation state to {}", path.display())]
    StateWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered pool of candidate API credentials.
#[derive(Debug, Clone)]
pub struct KeyPool(Vec<String>);

impl KeyPool {
    pub fn new(keys: Vec<String>) -> Self {
        Self(keys)
    }

    /// Collects keys from `ODDS_1`, `ODDS_2`, ... `ODDS_16`, skipping unset
    /// slots and preserving index order. Emptiness is checked by
    /// [`KeyRotator::new`], not here.
    pub fn from_env() -> Self {
        let keys = (1..=16)
            .filter_map(|i| std::env::var(format!("ODDS_{i}")).ok())
            .filter(|k| !k.is_empty())
            .collect();
        Self(keys)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }
}

/// Durable storage for the rotation cursor, shared by every invocation that
/// uses the same key pool.
pub trait RotationStore {
    /// Reads the persisted cursor. Missing or malformed state heals to 0.
    fn load(&self) -> usize;

    /// Overwrites the stored cursor wholesale. Unwritable storage is fatal.
    fn save(&self, cursor: usize) -> Result<(), RotationError>;

    /// Performs the paired load-increment-save as one step, returning the
    /// index handed out. Implementations that share state across processes
    /// must override this with mutual exclusion, otherwise two overlapping
    /// invocations can both observe the same cursor and hand out the same
    /// key. `modulus` must be non-zero.
    fn advance(&self, modulus: usize) -> Result<usize, RotationError> {
        let index = self.load() % modulus;
        self.save((index + 1) % modulus)?;
        Ok(index)
    }
}
