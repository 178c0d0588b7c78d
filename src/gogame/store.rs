use crate::core::entities::GameId;
use crate::core::errors::GameError;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// A serialized game record, taken under the game lock and written after it
/// is released.
///
/// `version` grows with every snapshot of the same game, so a store can drop
/// a write that arrives after a newer one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub id: GameId,
    pub version: u64,
    pub blob: String,
}

/// Where game records are kept between runs.
pub trait Store: Send + Sync {
    fn save(&self, snapshot: &Snapshot) -> Result<(), GameError>;
    /// The latest snapshot of every stored game, in ascending id order.
    fn load_all(&self) -> Result<Vec<Snapshot>, GameError>;
}

/// Keeps serialized records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: Mutex<BTreeMap<GameId, (u64, String)>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn blob(&self, id: GameId) -> Option<String> {
        self.blobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&id)
            .map(|(_, blob)| blob.clone())
    }
}

impl Store for MemoryStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), GameError> {
        let mut blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        match blobs.get(&snapshot.id) {
            Some((version, _)) if *version >= snapshot.version => {}
            _ => {
                blobs.insert(snapshot.id, (snapshot.version, snapshot.blob.clone()));
            }
        }
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<Snapshot>, GameError> {
        let blobs = self.blobs.lock().unwrap_or_else(|e| e.into_inner());
        Ok(blobs
            .iter()
            .map(|(id, (version, blob))| Snapshot {
                id: *id,
                version: *version,
                blob: blob.clone(),
            })
            .collect())
    }
}
