//! Minimal raster drawing on RGB frames.
//!
//! Shapes are clipped to the frame; nothing is anti-aliased.

use crate::shared::face_box::FaceBox;
use crate::shared::frame::Frame;

/// Outlines `rect` with a stroke of `width` pixels centred on its edges.
pub fn stroke_rect(frame: &mut Frame, rect: &FaceBox, width: u32, color: [u8; 3]) {
    if width == 0 || rect.is_empty() {
        return;
    }
    let inward = (width / 2) as i32;
    let outward = width as i32 - inward;

    let (ox1, oy1) = (rect.x - inward, rect.y - inward);
    let (ox2, oy2) = (rect.right() + outward, rect.bottom() + outward);
    let (ix1, iy1) = (rect.x + outward, rect.y + outward);
    let (ix2, iy2) = (rect.right() - inward, rect.bottom() - inward);

    let x_range = ox1.max(0)..ox2.min(frame.width() as i32);
    for y in oy1.max(0)..oy2.min(frame.height() as i32) {
        for x in x_range.clone() {
            let inside = x >= ix1 && x < ix2 && y >= iy1 && y < iy2;
            if !inside {
                frame.put_pixel(x as i64, y as i64, color);
            }
        }
    }
}

/// Fills every pixel whose centre lies within `radius` of `(cx, cy)`.
pub fn fill_circle(frame: &mut Frame, cx: f32, cy: f32, radius: f32, color: [u8; 3]) {
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let x_min = ((cx - radius).floor() as i64).max(0);
    let x_max = ((cx + radius).ceil() as i64).min(frame.width() as i64 - 1);
    let y_min = ((cy - radius).floor() as i64).max(0);
    let y_max = ((cy + radius).ceil() as i64).min(frame.height() as i64 - 1);

    for y in y_min..=y_max {
        let dy = y as f32 + 0.5 - cy;
        for x in x_min..=x_max {
            let dx = x as f32 + 0.5 - cx;
            if dx * dx + dy * dy <= r2 {
                frame.put_pixel(x, y, color);
            }
        }
    }
}

/// Draws a round-capped line `width` pixels thick.
pub fn draw_line(
    frame: &mut Frame,
    from: (f32, f32),
    to: (f32, f32),
    width: f32,
    color: [u8; 3],
) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        fill_circle(
            frame,
            from.0 + dx * t,
            from.1 + dy * t,
            width / 2.0,
            color,
        );
    }
}
