use std::path::Path;

use crate::detection::domain::detected_face::DetectedFace;
use crate::detection::domain::face_detector::FaceDetector;
use crate::detection::infrastructure::model_resolver::ModelResolver;
use crate::detection::infrastructure::onnx_blazeface_detector::OnnxBlazefaceDetector;
use crate::detection::infrastructure::timed_face_detector::TimedFaceDetector;
use crate::imaging::domain::canvas::{draw_line, fill_circle, stroke_rect};
use crate::imaging::domain::crop::{
    center_crop_rect, crop, simulated_eye_points, translate, CropError,
};
use crate::imaging::domain::image_reader::ImageReader;
use crate::imaging::infrastructure::jpeg_image_writer::JpegImageWriter;
use crate::imaging::infrastructure::oriented_image_reader::OrientedImageReader;
use crate::imaging::infrastructure::processed_image_store::ProcessedImageStore;
use crate::shared::config::ProcessorConfig;
use crate::shared::constants::{BLAZEFACE_MODEL_NAME, BOX_COLOR, CONTOUR_COLOR};
use crate::shared::file_uri::strip_file_scheme;
use crate::shared::frame::Frame;

use super::processor_error::ProcessorError;

/// The face operations the bridge delegates to.
///
/// `Ok(None)` means the operation ran but produced no image (unreadable
/// input, nothing remembered, failed save). `Err` is reserved for failures
/// the caller should surface as a rejection.
pub trait FaceProcessing: Send {
    /// Detects a face and saves a copy with the face boxed. Returns the
    /// input path unchanged when no face is found.
    fn detect_face(&mut self, image_path: &str) -> Result<Option<String>, ProcessorError>;

    /// Crops the face found by the last `detect_face` and marks its eyes.
    fn process_face(&mut self) -> Result<Option<String>, ProcessorError>;

    /// One-shot detect + crop of `image_path`, or of the last detected
    /// image when no path is given.
    fn process_image(&mut self, image_path: Option<&str>) -> Result<Option<String>, ProcessorError>;

    /// Runs the detector on a synthetic face; `true` if detection completed.
    fn test_face_detector(&mut self) -> Result<bool, ProcessorError>;

    fn close(&mut self);
}

/// Drawing and cropping parameters.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderSettings {
    pub padding: f64,
    pub fallback_crop_factor: f64,
    pub box_stroke_width: u32,
    pub contour_dot_radius: f32,
}

impl From<&ProcessorConfig> for RenderSettings {
    fn from(config: &ProcessorConfig) -> Self {
        Self {
            padding: config.padding,
            fallback_crop_factor: config.fallback_crop_factor,
            box_stroke_width: config.box_stroke_width,
            contour_dot_radius: config.contour_dot_radius,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::from(&ProcessorConfig::default())
    }
}

/// Stateful two-step face pipeline: `detect_face` remembers the image and
/// face it found so a following `process_face` can crop without detecting
/// again.
pub struct FaceProcessor {
    detector: Option<Box<dyn FaceDetector>>,
    reader: Box<dyn ImageReader>,
    store: ProcessedImageStore,
    settings: RenderSettings,
    last_image_path: Option<String>,
    last_frame: Option<Frame>,
    last_face: Option<DetectedFace>,
}

impl FaceProcessor {
    pub fn new(
        detector: Box<dyn FaceDetector>,
        reader: Box<dyn ImageReader>,
        store: ProcessedImageStore,
        settings: RenderSettings,
    ) -> Self {
        log::debug!(
            "FaceProcessor initialised, output dir {}",
            store.dir().display()
        );
        Self {
            detector: Some(detector),
            reader,
            store,
            settings,
            last_image_path: None,
            last_frame: None,
            last_face: None,
        }
    }

    /// Builds the production pipeline: BlazeFace behind a timeout, EXIF-aware
    /// reading, JPEG output.
    pub fn from_config(config: &ProcessorConfig) -> Result<Self, ProcessorError> {
        let model_path = match &config.model_path {
            Some(path) if !path.is_file() => {
                return Err(ProcessorError::ModelMissing(path.clone()));
            }
            Some(path) => path.clone(),
            None => ModelResolver::with_default_cache()?.resolve(
                BLAZEFACE_MODEL_NAME,
                config.model_url.as_deref(),
                config.bundled_model_dir.as_deref(),
                None,
            )?,
        };

        let blazeface = OnnxBlazefaceDetector::new(&model_path, config.confidence)
            .map_err(|e| ProcessorError::DetectorInit(e.to_string()))?;
        let detector = TimedFaceDetector::new(Box::new(blazeface), config.detection_timeout())
            .map_err(ProcessorError::WorkerSpawn)?;
        let store = ProcessedImageStore::new(
            config.output_dir.clone(),
            Box::new(JpegImageWriter::new(config.jpeg_quality)),
        );

        Ok(Self::new(
            Box::new(detector),
            Box::new(OrientedImageReader::new()),
            store,
            RenderSettings::from(config),
        ))
    }

    fn ensure_open(&self) -> Result<(), ProcessorError> {
        if self.detector.is_none() {
            return Err(ProcessorError::Closed);
        }
        Ok(())
    }

    fn load(&self, image_path: &str) -> Option<Frame> {
        let path = Path::new(strip_file_scheme(image_path));
        if !path.exists() {
            log::error!("File does not exist: {}", path.display());
            return None;
        }
        match self.reader.read(path) {
            Ok(frame) if frame.is_empty() => {
                log::error!(
                    "Invalid image dimensions: {}x{}",
                    frame.width(),
                    frame.height()
                );
                None
            }
            Ok(frame) => {
                log::debug!("Loaded image {}x{}", frame.width(), frame.height());
                Some(frame)
            }
            Err(e) => {
                log::error!("Failed to load image {}: {e}", path.display());
                None
            }
        }
    }

    /// First (most confident) face. Detector failures count as "no face".
    fn detect_first(&mut self, frame: &Frame) -> Result<Option<DetectedFace>, ProcessorError> {
        let detector = self.detector.as_mut().ok_or(ProcessorError::Closed)?;
        match detector.detect(frame) {
            Ok(faces) => {
                if faces.is_empty() {
                    log::warn!("No faces detected in the image");
                } else {
                    log::debug!("Face detection found {} face(s)", faces.len());
                }
                Ok(faces.into_iter().next())
            }
            Err(e) => {
                log::error!("Face detection failed: {e}");
                Ok(None)
            }
        }
    }

    fn draw_face_box(&self, frame: &Frame, face: &DetectedFace) -> Frame {
        let rect = face
            .bounds
            .padded(self.settings.padding, frame.width(), frame.height());
        let mut boxed = frame.clone();
        stroke_rect(&mut boxed, &rect, self.settings.box_stroke_width, BOX_COLOR);
        boxed
    }

    fn render_face_crop(&self, frame: &Frame, face: &DetectedFace) -> Result<Frame, CropError> {
        let rect = face
            .bounds
            .padded(self.settings.padding, frame.width(), frame.height());
        let mut cropped = crop(frame, &rect)?;

        let contour: Vec<_> = face.eye_contour_points().copied().collect();
        for (x, y) in translate(&contour, (rect.x, rect.y)) {
            fill_circle(
                &mut cropped,
                x,
                y,
                self.settings.contour_dot_radius,
                CONTOUR_COLOR,
            );
        }
        Ok(cropped)
    }

    fn render_fallback(&self, frame: &Frame) -> Result<Frame, CropError> {
        let rect = center_crop_rect(
            frame.width(),
            frame.height(),
            self.settings.fallback_crop_factor,
        );
        let mut cropped = crop(frame, &rect)?;
        for (x, y) in simulated_eye_points(cropped.width(), cropped.height()) {
            fill_circle(
                &mut cropped,
                x,
                y,
                self.settings.contour_dot_radius,
                CONTOUR_COLOR,
            );
        }
        Ok(cropped)
    }

    fn save(&self, frame: &Frame, prefix: &str) -> Option<String> {
        self.store
            .save(frame, prefix)
            .map(|p| p.to_string_lossy().into_owned())
    }
}

impl FaceProcessing for FaceProcessor {
    fn detect_face(&mut self, image_path: &str) -> Result<Option<String>, ProcessorError> {
        self.ensure_open()?;
        log::debug!("Detecting face in image at path: {image_path}");
        self.last_image_path = Some(image_path.to_string());
        self.last_frame = None;
        self.last_face = None;

        let Some(frame) = self.load(image_path) else {
            return Ok(None);
        };
        let face = self.detect_first(&frame)?;
        let boxed = face.as_ref().map(|f| self.draw_face_box(&frame, f));
        self.last_frame = Some(frame);
        self.last_face = face;

        match boxed {
            None => {
                log::warn!("No face detected, returning original path");
                Ok(Some(image_path.to_string()))
            }
            Some(boxed) => Ok(self.save(&boxed, "detected")),
        }
    }

    fn process_face(&mut self) -> Result<Option<String>, ProcessorError> {
        self.ensure_open()?;
        log::debug!(
            "process_face: last image {:?}, face detected: {}",
            self.last_image_path,
            self.last_face.is_some()
        );

        if let (Some(face), Some(frame)) = (&self.last_face, &self.last_frame) {
            return match self.render_face_crop(frame, face) {
                Ok(processed) => Ok(self.save(&processed, "processed")),
                Err(e) => {
                    log::warn!("Error processing face ({e}), falling back to basic processing");
                    let processed = self.render_fallback(frame)?;
                    Ok(self.save(&processed, "error_fallback"))
                }
            };
        }

        log::warn!("No detected face to process, applying basic image processing");
        let Some(path) = &self.last_image_path else {
            log::error!("Cannot process image: no image has been detected yet");
            return Ok(None);
        };
        let frame = match &self.last_frame {
            Some(frame) => frame.clone(),
            None => match self.load(path) {
                Some(frame) => frame,
                None => return Ok(None),
            },
        };
        let processed = self.render_fallback(&frame)?;
        Ok(self.save(&processed, "fallback_processed"))
    }

    fn process_image(&mut self, image_path: Option<&str>) -> Result<Option<String>, ProcessorError> {
        self.ensure_open()?;
        let Some(path) = image_path
            .map(str::to_string)
            .or_else(|| self.last_image_path.clone())
        else {
            log::error!("No image path provided or stored");
            return Ok(None);
        };
        log::debug!("Processing image at path: {path}");

        let Some(frame) = self.load(&path) else {
            return Ok(None);
        };
        let (rendered, prefix) = match self.detect_first(&frame)? {
            Some(face) => (self.render_face_crop(&frame, &face), "full"),
            None => {
                log::warn!("No face detected, using fallback processing");
                (self.render_fallback(&frame), "fallback")
            }
        };
        match rendered {
            Ok(processed) => Ok(self.save(&processed, prefix)),
            Err(e) => {
                log::error!("Error processing image {path}: {e}");
                Ok(None)
            }
        }
    }

    fn test_face_detector(&mut self) -> Result<bool, ProcessorError> {
        log::debug!("Testing face detector");
        let frame = synthetic_face();
        let detector = self.detector.as_mut().ok_or(ProcessorError::Closed)?;
        match detector.detect(&frame) {
            Ok(faces) => {
                log::debug!("Face detector test completed with {} face(s)", faces.len());
                Ok(true)
            }
            Err(e) => {
                log::error!("Face detector test failed: {e}");
                Ok(false)
            }
        }
    }

    fn close(&mut self) {
        log::debug!("Closing FaceProcessor");
        self.detector = None;
        self.last_frame = None;
        self.last_face = None;
    }
}

/// 100×100 cartoon face: black disc, white eyes, white mouth stroke.
fn synthetic_face() -> Frame {
    const WHITE: [u8; 3] = [255, 255, 255];
    const BLACK: [u8; 3] = [0, 0, 0];

    let mut frame = Frame::filled(100, 100, WHITE);
    fill_circle(&mut frame, 50.0, 50.0, 40.0, BLACK);
    fill_circle(&mut frame, 35.0, 40.0, 10.0, WHITE);
    fill_circle(&mut frame, 65.0, 40.0, 10.0, WHITE);
    draw_line(&mut frame, (35.0, 70.0), (65.0, 70.0), 5.0, WHITE);
    frame
}
