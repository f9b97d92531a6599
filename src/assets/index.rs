//! Content indexing of a sprite directory.
//!
//! A sprite's identity is the SHA-256 of its pixels serialized row-major as `A, R, G, B` bytes,
//! hex-encoded in lowercase. External asset extraction tools name sprites the same way, so this
//! byte order must not change.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use rayon::prelude::*;
use sha2::{Digest as _, Sha256};
use walkdir::WalkDir;

use crate::foundation::error::{SpriteError, SpriteResult};

/// File extensions (lowercase) considered during a scan.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "webp"];

/// Content hash of a decoded image; inputs without alpha are treated as fully opaque.
pub fn content_hash(img: &image::DynamicImage) -> String {
    content_hash_rgba(&img.to_rgba8())
}

/// Content hash of an RGBA8 buffer.
pub fn content_hash_rgba(img: &image::RgbaImage) -> String {
    let mut hasher = Sha256::new();
    let mut row = Vec::with_capacity(img.width() as usize * 4);
    for pixels in img.rows() {
        row.clear();
        for px in pixels {
            let [r, g, b, a] = px.0;
            row.extend_from_slice(&[a, r, g, b]);
        }
        hasher.update(&row);
    }
    hex::encode(hasher.finalize())
}

/// Whether `path` has one of [`IMAGE_EXTENSIONS`] (case-insensitive).
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| e.eq_ignore_ascii_case(known))
        })
}

/// Immutable hash → sprite path table.
#[derive(Clone, Debug, Default)]
pub struct ContentIndex {
    entries: HashMap<String, PathBuf>,
}

impl ContentIndex {
    /// Scan `dir` (non-recursive). See [`scan_dir`].
    pub fn scan(dir: impl AsRef<Path>) -> SpriteResult<ScanReport> {
        scan_dir(dir.as_ref())
    }

    pub fn get(&self, hash: &str) -> Option<&Path> {
        self.entries.get(hash).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by hash.
    pub fn sorted(&self) -> Vec<(&str, &Path)> {
        let mut out: Vec<(&str, &Path)> = self
            .entries
            .iter()
            .map(|(h, p)| (h.as_str(), p.as_path()))
            .collect();
        out.sort_unstable_by(|a, b| a.0.cmp(b.0));
        out
    }

    fn insert(&mut self, hash: String, path: PathBuf) -> Option<PathBuf> {
        self.entries.insert(hash, path)
    }
}

/// Later entries replace earlier ones with the same hash.
impl FromIterator<(String, PathBuf)> for ContentIndex {
    fn from_iter<I: IntoIterator<Item = (String, PathBuf)>>(iter: I) -> Self {
        let mut index = Self::default();
        for (hash, path) in iter {
            index.insert(hash.to_ascii_lowercase(), path);
        }
        index
    }
}

/// A file that looked like an image but could not be indexed.
#[derive(Clone, Debug)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of scanning a sprite directory.
#[derive(Clone, Debug, Default)]
pub struct ScanReport {
    pub index: ContentIndex,
    pub skipped: Vec<SkippedFile>,
    /// Number of candidate image files visited.
    pub scanned: usize,
}

/// Index every image file directly inside `dir`.
///
/// Files are visited in file-name order; when two files share a hash the later one wins.
/// Unreadable images are recorded in [`ScanReport::skipped`] and never abort the scan. Only a
/// missing or unreadable directory is an error.
#[tracing::instrument]
pub fn scan_dir(dir: &Path) -> SpriteResult<ScanReport> {
    if !dir.is_dir() {
        return Err(SpriteError::validation(format!(
            "sprite directory '{}' does not exist",
            dir.display()
        )));
    }

    let mut skipped = Vec::new();
    let mut candidates = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        match entry {
            Ok(entry) if entry.file_type().is_file() && has_image_extension(entry.path()) => {
                candidates.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.into());
                tracing::warn!(path = %path.display(), error = %e, "cannot read directory entry");
                skipped.push(SkippedFile {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    let hashed: Vec<(PathBuf, Result<String, String>)> = candidates
        .into_par_iter()
        .map(|path| {
            let outcome = image::open(&path)
                .map(|img| content_hash(&img))
                .map_err(|e| e.to_string());
            (path, outcome)
        })
        .collect();

    let scanned = hashed.len();
    let report = hashed.into_iter().fold(
        ScanReport {
            skipped,
            scanned,
            ..ScanReport::default()
        },
        |mut report, (path, outcome)| {
            match outcome {
                Ok(hash) => {
                    if let Some(previous) = report.index.insert(hash.clone(), path.clone()) {
                        tracing::debug!(
                            hash = %hash,
                            replaced = %previous.display(),
                            by = %path.display(),
                            "duplicate sprite content"
                        );
                    }
                }
                Err(reason) => {
                    tracing::warn!(path = %path.display(), %reason, "cannot read sprite");
                    report.skipped.push(SkippedFile { path, reason });
                }
            }
            report
        },
    );

    tracing::info!(
        indexed = report.index.len(),
        skipped = report.skipped.len(),
        "indexed sprites"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/index.rs"]
mod tests;
