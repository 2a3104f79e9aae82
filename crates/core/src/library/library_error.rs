use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("source image not found: {0}")]
    SourceMissing(PathBuf),
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
