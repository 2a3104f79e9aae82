use std::sync::{Arc, Mutex, PoisonError};

use crate::pipeline::face_processor::{FaceProcessing, FaceProcessor};
use crate::shared::config::AutoCropConfig;
use crate::shared::file_uri::{ensure_file_scheme, strip_file_scheme};

use super::bridge_error::ErrorCode;
use super::media_scanner::{MediaIndex, MediaScanner};
use super::promise::Promise;
use super::response::{BridgeValue, ResponseRecord};

pub const MODULE_NAME: &str = "AutoCropModule";

const NOT_INITIALIZED: &str = "FaceProcessor is not initialized";

/// Bridge adapter exposing the face processor to a calling application.
///
/// Every operation settles its promise exactly once. A missing processor
/// (failed construction or after [`invalidate`](Self::invalidate)) is a
/// per-call `MODULE_ERROR`, never a panic.
pub struct AutoCropModule {
    processor: Mutex<Option<Box<dyn FaceProcessing>>>,
    scanner: Option<Arc<dyn MediaScanner>>,
}

impl AutoCropModule {
    pub fn new(
        processor: Option<Box<dyn FaceProcessing>>,
        scanner: Option<Arc<dyn MediaScanner>>,
    ) -> Self {
        Self {
            processor: Mutex::new(processor),
            scanner,
        }
    }

    /// Builds the production processor and media index. Processor
    /// construction failures are logged and leave the module without one.
    pub fn from_config(config: &AutoCropConfig) -> Self {
        let processor: Option<Box<dyn FaceProcessing>> =
            match FaceProcessor::from_config(&config.processor) {
                Ok(processor) => {
                    log::debug!("FaceProcessor initialized successfully");
                    Some(Box::new(processor))
                }
                Err(e) => {
                    log::error!("Failed to initialize FaceProcessor: {e}");
                    None
                }
            };
        let scanner: Arc<dyn MediaScanner> =
            Arc::new(MediaIndex::new(config.media_index_path.clone()));
        Self::new(processor, Some(scanner))
    }

    pub fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn with_processor(
        &self,
        promise: Promise,
        op: impl FnOnce(&mut dyn FaceProcessing, Promise),
    ) {
        let mut guard = match self.processor.lock() {
            Ok(guard) => guard,
            Err(_) => {
                log::error!("FaceProcessor lock poisoned");
                promise.reject(ErrorCode::Module, "FaceProcessor is unavailable");
                return;
            }
        };
        match guard.as_mut() {
            Some(processor) => op(processor.as_mut(), promise),
            None => {
                log::error!("{NOT_INITIALIZED}");
                promise.reject(ErrorCode::Module, NOT_INITIALIZED);
            }
        }
    }

    pub fn detect_face(&self, image_uri: &str, promise: Promise) {
        log::debug!("detectFace called with URI: {image_uri}");
        self.with_processor(promise, |processor, promise| {
            let fixed = strip_file_scheme(image_uri);
            match processor.detect_face(fixed) {
                Ok(Some(path)) => {
                    let face_detected = path != fixed && path != image_uri;
                    let mut record = ResponseRecord::succeeded(ensure_file_scheme(&path))
                        .with_face_detected(face_detected);
                    if !face_detected {
                        record = record.with_message("No face detected in the image");
                    }
                    log::debug!("detectFace resolved: {record:?}");
                    promise.resolve(record);
                }
                Ok(None) => {
                    log::warn!("Face detection produced no image for {image_uri}");
                    promise.resolve(
                        ResponseRecord::failed("Failed to detect face in the image")
                            .with_path(image_uri),
                    );
                }
                Err(e) => {
                    log::error!("Error in detectFace: {e}");
                    promise.reject(ErrorCode::Detection, format!("Failed to detect face: {e}"));
                }
            }
        });
    }

    pub fn process_face(&self, promise: Promise) {
        log::debug!("processFace called");
        self.with_processor(promise, |processor, promise| {
            match processor.process_face() {
                Ok(Some(path)) => {
                    promise.resolve(ResponseRecord::succeeded(ensure_file_scheme(&path)));
                }
                Ok(None) => {
                    promise.resolve(ResponseRecord::failed("Failed to process the face"));
                }
                Err(e) => {
                    log::error!("Error in processFace: {e}");
                    promise.reject(ErrorCode::Processing, format!("Failed to process face: {e}"));
                }
            }
        });
    }

    pub fn process_image(&self, image_uri: &str, promise: Promise) {
        log::debug!("processImage called with URI: {image_uri}");
        self.with_processor(promise, |processor, promise| {
            match processor.process_image(Some(image_uri)) {
                Ok(Some(path)) => promise.resolve(BridgeValue::Path(path)),
                Ok(None) => promise.reject(ErrorCode::Processing, "Failed to process the image"),
                Err(e) => {
                    log::error!("Error in processImage: {e}");
                    promise.reject(ErrorCode::Crop, format!("Failed to crop image: {e}"));
                }
            }
        });
    }

    /// Resolves `true` once the file is in the media index, `false` when the
    /// scanner could not index it. Settles on the scanner's thread.
    pub fn scan_file(&self, file_path: &str, promise: Promise) {
        log::debug!("scanFile called with path: {file_path}");
        let Some(scanner) = &self.scanner else {
            log::error!("Media scanner is not available");
            promise.reject(ErrorCode::Module, "Media scanner is not available");
            return;
        };

        // Shared so a failed start can still reject the promise the callback owns.
        let pending = Arc::new(Mutex::new(Some(promise)));
        let for_callback = pending.clone();
        let started = scanner.scan_file(
            file_path,
            Box::new(move |uri| {
                if let Some(promise) = take(&for_callback) {
                    promise.resolve(uri.is_some());
                }
            }),
        );

        if let Err(e) = started {
            log::error!("Error in scanFile: {e}");
            if let Some(promise) = take(&pending) {
                promise.reject(ErrorCode::Scan, format!("Failed to scan file: {e}"));
            }
        }
    }

    pub fn test_module(&self, promise: Promise) {
        self.with_processor(promise, |_, promise| {
            promise.resolve(BridgeValue::Message("AutoCropModule is working".into()));
        });
    }

    pub fn test_face_detector(&self, promise: Promise) {
        self.with_processor(promise, |processor, promise| {
            match processor.test_face_detector() {
                Ok(working) => promise.resolve(working),
                Err(e) => {
                    log::error!("Error in testFaceDetector: {e}");
                    promise.reject(
                        ErrorCode::Detection,
                        format!("Failed to test face detector: {e}"),
                    );
                }
            }
        });
    }

    /// Closes and drops the processor. Later calls reject with `MODULE_ERROR`.
    pub fn invalidate(&self) {
        let mut guard = self.processor.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut processor) = guard.take() {
            processor.close();
            log::debug!("FaceProcessor released");
        }
    }
}

fn take(slot: &Mutex<Option<Promise>>) -> Option<Promise> {
    slot.lock().unwrap_or_else(PoisonError::into_inner).take()
}
