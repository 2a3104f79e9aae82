//! Crop geometry and pixel copying.

use std::f32::consts::PI;

use thiserror::Error;

use crate::detection::domain::detected_face::Point;
use crate::shared::face_box::FaceBox;
use crate::shared::frame::{Frame, CHANNELS};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CropError {
    #[error("crop rectangle {0} is empty")]
    Empty(FaceBox),
    #[error("crop rectangle {rect} lies outside the {width}x{height} image")]
    OutOfBounds {
        rect: FaceBox,
        width: u32,
        height: u32,
    },
}

/// Copies the pixels inside `rect` into a new frame.
pub fn crop(frame: &Frame, rect: &FaceBox) -> Result<Frame, CropError> {
    if rect.is_empty() {
        return Err(CropError::Empty(*rect));
    }
    if rect.x < 0
        || rect.y < 0
        || rect.right() > frame.width() as i32
        || rect.bottom() > frame.height() as i32
    {
        return Err(CropError::OutOfBounds {
            rect: *rect,
            width: frame.width(),
            height: frame.height(),
        });
    }

    let fw = frame.width() as usize;
    let (rx, ry) = (rect.x as usize, rect.y as usize);
    let (rw, rh) = (rect.width as usize, rect.height as usize);
    let src = frame.data();

    let mut data = Vec::with_capacity(rw * rh * CHANNELS);
    for row in 0..rh {
        let start = ((ry + row) * fw + rx) * CHANNELS;
        data.extend_from_slice(&src[start..start + rw * CHANNELS]);
    }
    Ok(Frame::new(data, rw as u32, rh as u32))
}

/// Centre crop keeping `factor` of each dimension, biased towards the top:
/// the remaining height is split one third above, two thirds below.
pub fn center_crop_rect(width: u32, height: u32, factor: f64) -> FaceBox {
    let crop_w = (width as f64 * factor) as i32;
    let crop_h = (height as f64 * factor) as i32;
    let left = (width as i32 - crop_w) / 2;
    let top = (height as i32 - crop_h) / 3;
    FaceBox::new(left, top, crop_w, crop_h)
}

/// Stand-in eye markers for a crop with no detected face: eight points on
/// a small ellipse around where each eye would sit in a centred portrait.
pub fn simulated_eye_points(width: u32, height: u32) -> Vec<Point> {
    const POINTS_PER_EYE: usize = 8;
    let (w, h) = (width as f32, height as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let eye_y = cy - h * 0.1;
    let (rx, ry) = (w * 0.08, h * 0.05);

    let mut points = Vec::with_capacity(POINTS_PER_EYE * 2);
    for eye_x in [cx - w * 0.15, cx + w * 0.15] {
        for i in 0..POINTS_PER_EYE {
            let angle = i as f32 * 2.0 * PI / POINTS_PER_EYE as f32;
            points.push((eye_x + rx * angle.cos(), eye_y + ry * angle.sin()));
        }
    }
    points
}

/// Shifts points into the coordinate space of a crop whose top-left corner
/// was at `origin`.
pub fn translate(points: &[Point], origin: (i32, i32)) -> Vec<Point> {
    let (dx, dy) = (origin.0 as f32, origin.1 as f32);
    points.iter().map(|&(x, y)| (x - dx, y - dy)).collect()
}
