use crate::shared::face_box::FaceBox;

/// A point in image coordinates (sub-pixel precision).
pub type Point = (f32, f32);

/// One face found by a detector.
///
/// Eye contours are closed polylines around each eye in the coordinates of
/// the frame the face was detected in. Either may be empty when the detector
/// could not locate that eye.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub bounds: FaceBox,
    pub confidence: f64,
    pub left_eye_contour: Vec<Point>,
    pub right_eye_contour: Vec<Point>,
}

impl DetectedFace {
    pub fn new(bounds: FaceBox, confidence: f64) -> Self {
        Self {
            bounds,
            confidence,
            left_eye_contour: Vec::new(),
            right_eye_contour: Vec::new(),
        }
    }

    pub fn with_eye_contours(mut self, left: Vec<Point>, right: Vec<Point>) -> Self {
        self.left_eye_contour = left;
        self.right_eye_contour = right;
        self
    }

    /// Both contours, left eye first.
    pub fn eye_contour_points(&self) -> impl Iterator<Item = &Point> {
        self.left_eye_contour
            .iter()
            .chain(self.right_eye_contour.iter())
    }
}
