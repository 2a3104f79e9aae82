use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::imaging::infrastructure::processed_image_store::epoch_millis;
use crate::shared::file_uri::{ensure_file_scheme, strip_file_scheme};

use super::library_error::LibraryError;

const SAVED_FACE_PREFIX: &str = "saved_face_";
const HISTORY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Result of keeping a crop in the app's own library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFace {
    pub internal_path: String,
    pub file_name: String,
    pub timestamp: u64,
}

/// One entry of the saved-faces history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryItem {
    pub id: String,
    pub uri: String,
    /// Last modification, epoch millis.
    pub modified: u64,
}

/// The `SavedFaces` directory: crops the user chose to keep.
pub struct SavedFaces {
    dir: PathBuf,
}

impl SavedFaces {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copies `uri` into the library as `saved_face_<epoch-millis>.jpg`.
    pub fn save(&self, uri: &str) -> Result<SavedFace, LibraryError> {
        let source = Path::new(strip_file_scheme(uri));
        if !source.is_file() {
            return Err(LibraryError::SourceMissing(source.to_path_buf()));
        }

        fs::create_dir_all(&self.dir).map_err(|e| LibraryError::CreateDir {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut timestamp = epoch_millis() as u64;
        let (file_name, target) = loop {
            let name = format!("{SAVED_FACE_PREFIX}{timestamp}.jpg");
            let path = self.dir.join(&name);
            if !path.exists() {
                break (name, path);
            }
            timestamp += 1;
        };

        fs::copy(source, &target).map_err(|e| LibraryError::Copy {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;
        log::debug!("Saved face to {}", target.display());

        Ok(SavedFace {
            internal_path: target.to_string_lossy().into_owned(),
            file_name,
            timestamp,
        })
    }

    /// Saved faces, newest first. Unreadable or missing directories yield
    /// an empty history.
    pub fn history(&self) -> Vec<HistoryItem> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::debug!("No saved faces at {}: {e}", self.dir.display());
                return Vec::new();
            }
        };

        let mut items: Vec<HistoryItem> = entries
            .filter_map(Result::ok)
            .filter(|entry| is_saved_face(&entry.path()))
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                let modified = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or_default();
                let path = entry.path();
                Some(HistoryItem {
                    id: entry.file_name().to_string_lossy().into_owned(),
                    uri: ensure_file_scheme(&path.to_string_lossy()),
                    modified,
                })
            })
            .collect();

        items.sort_by_key(|item| Reverse((item.modified, item.id.clone())));
        items
    }
}

fn is_saved_face(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.starts_with(SAVED_FACE_PREFIX) {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| HISTORY_EXTENSIONS.contains(&e))
        .unwrap_or(false)
}
