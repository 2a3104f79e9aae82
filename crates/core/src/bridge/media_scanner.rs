use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::imaging::infrastructure::processed_image_store::epoch_millis;
use crate::shared::file_uri::strip_file_scheme;

const MEDIA_URI_PREFIX: &str = "content://media/external/images/media/";

/// Completion callback: the content URI of the indexed file, or `None`
/// when the file could not be indexed.
pub type ScanCallback = Box<dyn FnOnce(Option<String>) + Send + 'static>;

#[derive(Error, Debug)]
pub enum MediaScanError {
    #[error("failed to start media scan: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("not a file: {0}")]
    NotAFile(PathBuf),
    #[error("failed to access media index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt media index {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Registers exported files with the system media index.
pub trait MediaScanner: Send + Sync {
    /// Starts an asynchronous scan. `on_complete` runs on a scanner thread.
    fn scan_file(&self, path: &str, on_complete: ScanCallback) -> Result<(), MediaScanError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub id: u64,
    pub path: PathBuf,
    pub indexed_at: u64,
}

/// File-backed media index: a JSON array of entries, one per path.
/// Re-scanning a path keeps its id and refreshes `indexed_at`.
pub struct MediaIndex {
    index_path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl MediaIndex {
    pub fn new(index_path: PathBuf) -> Self {
        Self {
            index_path,
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn entries(&self) -> Result<Vec<MediaEntry>, MediaScanError> {
        read_entries(&self.index_path)
    }

    /// Synchronously indexes `path`, returning its content URI.
    pub fn index(&self, path: &Path) -> Result<String, MediaScanError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        index_file(&self.index_path, path)
    }
}

impl MediaScanner for MediaIndex {
    fn scan_file(&self, path: &str, on_complete: ScanCallback) -> Result<(), MediaScanError> {
        let file = PathBuf::from(strip_file_scheme(path));
        let index_path = self.index_path.clone();
        let lock = self.lock.clone();

        thread::Builder::new()
            .name("media-scanner".into())
            .spawn(move || {
                let result = {
                    let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
                    index_file(&index_path, &file)
                };
                match result {
                    Ok(uri) => {
                        log::debug!("Scanned {} as {uri}", file.display());
                        on_complete(Some(uri));
                    }
                    Err(e) => {
                        log::warn!("Media scan of {} failed: {e}", file.display());
                        on_complete(None);
                    }
                }
            })
            .map_err(MediaScanError::Spawn)?;
        Ok(())
    }
}

fn index_file(index_path: &Path, file: &Path) -> Result<String, MediaScanError> {
    if !file.is_file() {
        return Err(MediaScanError::NotAFile(file.to_path_buf()));
    }
    let file = fs::canonicalize(file).map_err(|e| MediaScanError::Io {
        path: file.to_path_buf(),
        source: e,
    })?;

    let mut entries = read_entries(index_path)?;
    let now = epoch_millis() as u64;
    let id = match entries.iter_mut().find(|e| e.path == file) {
        Some(entry) => {
            entry.indexed_at = now;
            entry.id
        }
        None => {
            let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
            entries.push(MediaEntry {
                id,
                path: file,
                indexed_at: now,
            });
            id
        }
    };
    write_entries(index_path, &entries)?;
    Ok(format!("{MEDIA_URI_PREFIX}{id}"))
}

fn read_entries(index_path: &Path) -> Result<Vec<MediaEntry>, MediaScanError> {
    let json = match fs::read_to_string(index_path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(MediaScanError::Io {
                path: index_path.to_path_buf(),
                source: e,
            })
        }
    };
    serde_json::from_str(&json).map_err(|e| MediaScanError::Format {
        path: index_path.to_path_buf(),
        source: e,
    })
}

fn write_entries(index_path: &Path, entries: &[MediaEntry]) -> Result<(), MediaScanError> {
    let io_err = |e| MediaScanError::Io {
        path: index_path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = index_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(entries).map_err(|e| MediaScanError::Format {
        path: index_path.to_path_buf(),
        source: e,
    })?;
    fs::write(index_path, json).map_err(io_err)
}
