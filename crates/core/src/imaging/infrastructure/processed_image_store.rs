use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::frame::Frame;

/// Saves processed frames as `<dir>/<prefix>_<epoch-millis>.jpg`.
///
/// A save only counts when the file exists and is non-empty afterwards;
/// failures are logged and reported as `None`.
pub struct ProcessedImageStore {
    dir: PathBuf,
    writer: Box<dyn ImageWriter>,
}

impl ProcessedImageStore {
    pub fn new(dir: PathBuf, writer: Box<dyn ImageWriter>) -> Self {
        Self { dir, writer }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn save(&self, frame: &Frame, prefix: &str) -> Option<PathBuf> {
        let path = self.next_path(prefix);
        log::debug!(
            "Saving {}x{} image to {}",
            frame.width(),
            frame.height(),
            path.display()
        );

        if let Err(e) = self.writer.write(&path, frame) {
            log::error!("Error saving image to {}: {e}", path.display());
            return None;
        }

        match fs::metadata(&path) {
            Ok(meta) if meta.len() > 0 => {
                log::debug!("Saved {} ({} bytes)", path.display(), meta.len());
                Some(path)
            }
            _ => {
                log::error!("Saved image {} is missing or empty", path.display());
                None
            }
        }
    }

    /// Timestamped path; bumps the timestamp past files that already exist
    /// so two saves in the same millisecond don't overwrite each other.
    fn next_path(&self, prefix: &str) -> PathBuf {
        let mut millis = epoch_millis();
        loop {
            let path = self.dir.join(format!("{prefix}_{millis}.jpg"));
            if !path.exists() {
                return path;
            }
            millis += 1;
        }
    }
}

pub(crate) fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::infrastructure::jpeg_image_writer::JpegImageWriter;

    struct EmptyFileWriter;

    impl ImageWriter for EmptyFileWriter {
        fn write(&self, path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            fs::create_dir_all(path.parent().unwrap())?;
            fs::write(path, b"")?;
            Ok(())
        }
    }

    struct FailingWriter;

    impl ImageWriter for FailingWriter {
        fn write(&self, _path: &Path, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
            Err("disk full".into())
        }
    }

    fn file_name(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn test_save_names_file_with_prefix_and_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedImageStore::new(
            dir.path().join("ProcessedFaces"),
            Box::new(JpegImageWriter::default()),
        );
        let path = store.save(&Frame::filled(8, 8, [1, 2, 3]), "detected").unwrap();

        assert!(path.starts_with(store.dir()));
        let name = file_name(&path);
        let stamp = name
            .strip_prefix("detected_")
            .and_then(|s| s.strip_suffix(".jpg"))
            .unwrap();
        assert!(stamp.parse::<u128>().is_ok());
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn test_consecutive_saves_get_distinct_paths() {
        let dir = tempfile::tempdir().unwrap();
        let store =
            ProcessedImageStore::new(dir.path().to_path_buf(), Box::new(JpegImageWriter::default()));
        let frame = Frame::filled(8, 8, [1, 2, 3]);
        let a = store.save(&frame, "full").unwrap();
        let b = store.save(&frame, "full").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_output_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedImageStore::new(dir.path().to_path_buf(), Box::new(EmptyFileWriter));
        assert!(store.save(&Frame::filled(8, 8, [0, 0, 0]), "x").is_none());
    }

    #[test]
    fn test_writer_error_counts_as_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProcessedImageStore::new(dir.path().to_path_buf(), Box::new(FailingWriter));
        assert!(store.save(&Frame::filled(8, 8, [0, 0, 0]), "x").is_none());
    }
}
