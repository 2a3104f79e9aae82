use std::fs;
use std::path::{Path, PathBuf};

use crate::imaging::infrastructure::processed_image_store::epoch_millis;
use crate::shared::file_uri::strip_file_scheme;

use super::library_error::LibraryError;

/// Copies finished crops into the user's pictures directory as
/// `AutoCrop_<epoch-millis>.jpg`. Hosts follow up with a media scan so
/// gallery apps pick the file up.
pub struct GalleryExporter {
    pictures_dir: PathBuf,
}

impl GalleryExporter {
    pub fn new(pictures_dir: PathBuf) -> Self {
        Self { pictures_dir }
    }

    pub fn pictures_dir(&self) -> &Path {
        &self.pictures_dir
    }

    pub fn export(&self, uri: &str) -> Result<PathBuf, LibraryError> {
        let source = Path::new(strip_file_scheme(uri));
        if !source.is_file() {
            return Err(LibraryError::SourceMissing(source.to_path_buf()));
        }

        fs::create_dir_all(&self.pictures_dir).map_err(|e| LibraryError::CreateDir {
            path: self.pictures_dir.clone(),
            source: e,
        })?;

        let mut millis = epoch_millis();
        let target = loop {
            let candidate = self.pictures_dir.join(format!("AutoCrop_{millis}.jpg"));
            if !candidate.exists() {
                break candidate;
            }
            millis += 1;
        };

        fs::copy(source, &target).map_err(|e| LibraryError::Copy {
            from: source.to_path_buf(),
            to: target.clone(),
            source: e,
        })?;
        log::info!("Exported {} to {}", source.display(), target.display());
        Ok(target)
    }
}
