use tracing::debug;

use super::{KeyPool, RotationError, RotationStore};

/// Hands out keys from a [`KeyPool`] round-robin, persisting the cursor via
/// a [`RotationStore`] so the next invocation resumes where this one left
/// off.
///
/// Construct one per invocation and discard it after use; the authoritative
/// cursor lives in the store, not here.
pub struct KeyRotator<S: RotationStore> {
    pool: KeyPool,
    cursor: usize,
    store: S,
}

impl<S: RotationStore> KeyRotator<S> {
    /// Fails with [`RotationError::EmptyPool`] if no keys are configured.
    pub fn new(pool: KeyPool, store: S) -> Result<Self, RotationError> {
        if pool.is_empty() {
            return Err(RotationError::EmptyPool);
        }
        let cursor = store.load();
        Ok(Self { pool, cursor, store })
    }

    /// Index of the key the next `next_key` call would hand out.
    pub fn cursor(&self) -> usize {
        self.cursor % self.pool.len()
    }

    /// Returns the next key in rotation.
    ///
    /// The cursor advance is persisted synchronously before the key is
    /// returned; if persistence fails the error propagates and no key
    /// reaches the caller, since using it would silently skew rotation for
    /// every later invocation.
    pub fn next_key(&mut self) -> Result<String, RotationError> {
        let index = self.store.advance(self.pool.len())?;
        self.cursor = (index + 1) % self.pool.len();

        debug!(index, pool_size = self.pool.len(), "Key selected");

        // advance() returns load() % len, so the index is always in range.
        Ok(self
            .pool
            .get(index)
            .expect("rotation index within pool bounds")
            .to_string())
    }
}
