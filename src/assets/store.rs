use std::{
    collections::HashMap,
    fmt,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};

use crate::assets::index::ContentIndex;

/// Why a sprite could not be provided for a hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpriteMiss {
    /// No indexed file has this hash.
    Unindexed,
    /// The indexed file could not be opened or decoded anymore.
    Unreadable { path: PathBuf, reason: String },
}

impl fmt::Display for SpriteMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unindexed => f.write_str("no sprite file with this hash"),
            Self::Unreadable { path, reason } => {
                write!(f, "cannot open '{}': {reason}", path.display())
            }
        }
    }
}

/// Decoded RGBA sprites keyed by content hash.
///
/// Each sprite file is decoded at most once per store and shared between frames. Safe to use
/// from several compositing threads.
#[derive(Debug, Default)]
pub struct SpriteStore {
    index: ContentIndex,
    cache: Mutex<HashMap<String, Arc<image::RgbaImage>>>,
}

impl SpriteStore {
    pub fn new(index: ContentIndex) -> Self {
        Self {
            index,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn index(&self) -> &ContentIndex {
        &self.index
    }

    /// Sprite for a lowercase content hash, converted to RGBA8.
    pub fn get(&self, hash: &str) -> Result<Arc<image::RgbaImage>, SpriteMiss> {
        if let Some(hit) = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(hash)
        {
            return Ok(Arc::clone(hit));
        }

        let path = self.index.get(hash).ok_or(SpriteMiss::Unindexed)?;
        let sprite = image::open(path)
            .map(|img| Arc::new(img.to_rgba8()))
            .map_err(|e| SpriteMiss::Unreadable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(cache.entry(hash.to_string()).or_insert(sprite)))
    }

    /// Number of sprites decoded so far.
    pub fn loaded(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
