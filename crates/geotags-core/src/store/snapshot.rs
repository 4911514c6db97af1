// crates/geotags-core/src/store/snapshot.rs

use super::MemoryStore;
use crate::error::Result;
use crate::io::{self, CompressionMode};
use bincode::Options;
use std::path::Path;

/// Refuse to decode snapshots larger than this.
const SNAPSHOT_LIMIT: u64 = 256 * 1024 * 1024;

impl MemoryStore {
    /// Writes the store with bincode, gzipped when the `compact` feature is
    /// enabled.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        io::write_bincode(path, self, CompressionMode::preferred())?;
        tracing::info!(path = %path.display(), rows = self.row_count(), "saved snapshot");
        Ok(())
    }

    /// Reads a snapshot written by [`save_snapshot`](Self::save_snapshot).
    pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = io::read_all(path)?;
        let store = Self::from_bytes(&data)?;
        tracing::debug!(path = %path.display(), rows = store.row_count(), "loaded snapshot");
        Ok(store)
    }

    /// Decodes a snapshot from memory. Uses the same fixed-width integer
    /// encoding `bincode::serialize_into` writes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let store = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_limit(SNAPSHOT_LIMIT)
            .allow_trailing_bytes()
            .deserialize(data)?;
        Ok(store)
    }
}
