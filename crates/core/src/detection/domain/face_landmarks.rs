//! Eye keypoints and the contours derived from them.
//!
//! Keypoint detectors report one centre per eye. Contours are approximated
//! as ellipses sized by the inter-ocular distance, wide and flat like an
//! open eye.

use std::f64::consts::PI;

use super::detected_face::Point;

/// Points per eye contour.
pub const CONTOUR_POINTS: usize = 16;

/// Contour half-width as a fraction of the distance between eye centres.
const HALF_WIDTH_OF_EYE_SPAN: f64 = 0.22;

/// Contour half-height as a fraction of its half-width.
const ASPECT: f64 = 0.45;

/// Half-width fraction of the face width when only one eye is visible.
const HALF_WIDTH_OF_FACE: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct EyeLandmarks {
    /// Points with x <= 0 are treated as invisible.
    left: (f64, f64),
    right: (f64, f64),
}

impl EyeLandmarks {
    pub fn new(left: (f64, f64), right: (f64, f64)) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> Option<(f64, f64)> {
        visible(self.left)
    }

    pub fn right(&self) -> Option<(f64, f64)> {
        visible(self.right)
    }

    /// Distance between eye centres, when both are visible.
    pub fn eye_span(&self) -> Option<f64> {
        let (l, r) = (self.left()?, self.right()?);
        let span = ((r.0 - l.0).powi(2) + (r.1 - l.1).powi(2)).sqrt();
        (span > 0.0).then_some(span)
    }

    /// Contours for the left and right eye. An invisible eye yields an
    /// empty contour.
    pub fn contours(&self, face_width: f64) -> (Vec<Point>, Vec<Point>) {
        let half_width = match self.eye_span() {
            Some(span) => span * HALF_WIDTH_OF_EYE_SPAN,
            None => face_width * HALF_WIDTH_OF_FACE,
        };
        let contour = |eye: Option<(f64, f64)>| {
            eye.map(|c| ellipse(c, half_width, half_width * ASPECT))
                .unwrap_or_default()
        };
        (contour(self.left()), contour(self.right()))
    }
}

fn visible(p: (f64, f64)) -> Option<(f64, f64)> {
    (p.0 > 0.0).then_some(p)
}

fn ellipse(center: (f64, f64), rx: f64, ry: f64) -> Vec<Point> {
    (0..CONTOUR_POINTS)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / CONTOUR_POINTS as f64;
            (
                (center.0 + rx * angle.cos()) as f32,
                (center.1 + ry * angle.sin()) as f32,
            )
        })
        .collect()
}
