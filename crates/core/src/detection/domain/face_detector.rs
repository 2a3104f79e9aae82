use crate::detection::domain::detected_face::DetectedFace;
use crate::shared::frame::Frame;

/// Domain interface for face detection.
///
/// Implementations return faces ordered by descending confidence, so the
/// first entry is the face the processor works with.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
