use thiserror::Error;

use crate::detection::infrastructure::model_resolver::ModelResolveError;
use crate::imaging::domain::crop::CropError;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("face processor has been closed")]
    Closed,
    #[error("model file not found: {}", .0.display())]
    ModelMissing(std::path::PathBuf),
    #[error("face detection model unavailable: {0}")]
    ModelUnavailable(#[from] ModelResolveError),
    #[error("failed to initialise face detector: {0}")]
    DetectorInit(String),
    #[error("failed to start face detector worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error(transparent)]
    Render(#[from] CropError),
}
