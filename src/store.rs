//! Persistence adapter: serialize/restore the colored-pixel map keyed by
//! image identity.
//!
//! The contract is deliberately forgiving — saving is best-effort (failures
//! are logged by the caller and painting continues in-memory), and loading
//! malformed or missing data yields an empty map, never an error.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::log_warn;

/// Key prefix for all stored coloring state.
pub const STORE_NAMESPACE: &str = "v2";

/// One persisted pixel: coordinate key and committed RGBA color.
pub type PixelEntry = ((u32, u32), [u8; 4]);

/// Magic header for the v1 state file layout.
const STATE_MAGIC_V1: &str = "CFE1";

/// Serializable state file: an ordered list of (key, color) entries.
#[derive(Serialize, Deserialize)]
struct StateFileV1 {
    magic: String,
    entries: Vec<PixelEntry>,
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(String),
    InvalidFormat(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "I/O error: {}", e),
            StoreError::Serialize(e) => write!(f, "Serialization error: {}", e),
            StoreError::InvalidFormat(e) => write!(f, "Invalid format: {}", e),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for StoreError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        StoreError::Serialize(e.to_string())
    }
}

/// Storage seam for colored-pixel state.  The engine treats the store as an
/// external collaborator: `save` may fail (non-fatal), `load` never does.
pub trait PixelStore {
    /// Persist the full entry list for an image.  Best-effort.
    fn save(&mut self, image_id: &str, entries: &[PixelEntry]) -> Result<(), StoreError>;

    /// Restore the entry list for an image.  Missing or malformed data is
    /// treated as absent: the result is simply empty.
    fn load(&self, image_id: &str) -> Vec<PixelEntry>;

    /// Remove stored state for an image.
    fn clear(&mut self, image_id: &str) -> Result<(), StoreError>;
}

/// Fully-qualified store key for an image: `"<namespace>:<imageId>"`.
pub fn store_key(image_id: &str) -> String {
    format!("{}:{}", STORE_NAMESPACE, image_id)
}

// ============================================================================
// FILE-BACKED STORE
// ============================================================================

/// One bincode file per store key under a root directory.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default root in the OS data directory.
    pub fn default_root() -> PathBuf {
        crate::logger::data_dir().join("ColorFE").join("state")
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// File path for a store key.  The key is sanitized to a flat file name
    /// (image identities are URLs/paths and may contain separators).
    fn file_path(&self, image_id: &str) -> PathBuf {
        let key = store_key(image_id);
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.root.join(format!("{}.cfe", name))
    }
}

impl PixelStore for FileStore {
    fn save(&mut self, image_id: &str, entries: &[PixelEntry]) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        let file = File::create(self.file_path(image_id))?;
        let writer = BufWriter::new(file);
        let state = StateFileV1 {
            magic: STATE_MAGIC_V1.to_string(),
            entries: entries.to_vec(),
        };
        bincode::serialize_into(writer, &state)?;
        Ok(())
    }

    fn load(&self, image_id: &str) -> Vec<PixelEntry> {
        let path = self.file_path(image_id);
        let file = match File::open(&path) {
            Ok(f) => f,
            // Nothing stored yet — the common case, not worth logging
            Err(_) => return Vec::new(),
        };
        let reader = BufReader::new(file);
        match bincode::deserialize_from::<_, StateFileV1>(reader) {
            Ok(state) if state.magic == STATE_MAGIC_V1 => state.entries,
            Ok(state) => {
                log_warn!(
                    "'{}': unknown state file magic '{}', starting empty",
                    image_id,
                    state.magic
                );
                Vec::new()
            }
            Err(e) => {
                log_warn!("'{}': malformed state file ({}), starting empty", image_id, e);
                Vec::new()
            }
        }
    }

    fn clear(&mut self, image_id: &str) -> Result<(), StoreError> {
        let path = self.file_path(image_id);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Volatile store for tests and hosts that bring their own persistence.
/// Entries round-trip through the same bincode codec as the file store.
#[derive(Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn contains(&self, image_id: &str) -> bool {
        self.blobs.contains_key(&store_key(image_id))
    }
}

impl PixelStore for MemoryStore {
    fn save(&mut self, image_id: &str, entries: &[PixelEntry]) -> Result<(), StoreError> {
        let state = StateFileV1 {
            magic: STATE_MAGIC_V1.to_string(),
            entries: entries.to_vec(),
        };
        let blob = bincode::serialize(&state)?;
        self.blobs.insert(store_key(image_id), blob);
        Ok(())
    }

    fn load(&self, image_id: &str) -> Vec<PixelEntry> {
        let Some(blob) = self.blobs.get(&store_key(image_id)) else {
            return Vec::new();
        };
        match bincode::deserialize::<StateFileV1>(blob) {
            Ok(state) if state.magic == STATE_MAGIC_V1 => state.entries,
            _ => {
                log_warn!("'{}': malformed in-memory state, starting empty", image_id);
                Vec::new()
            }
        }
    }

    fn clear(&mut self, image_id: &str) -> Result<(), StoreError> {
        self.blobs.remove(&store_key(image_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_key_carries_namespace() {
        assert_eq!(store_key("/drawing/eagle.png"), "v2:/drawing/eagle.png");
    }

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemoryStore::new();
        let entries = vec![((1, 2), [255, 0, 0, 204]), ((3, 4), [0, 0, 255, 204])];
        store.save("page", &entries).unwrap();
        assert_eq!(store.load("page"), entries);
        store.clear("page").unwrap();
        assert!(store.load("page").is_empty());
    }

    #[test]
    fn missing_key_loads_empty() {
        let store = MemoryStore::new();
        assert!(store.load("never-saved").is_empty());
    }
}
