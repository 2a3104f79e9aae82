/// Axis-aligned face rectangle in pixel coordinates.
///
/// Detectors may report boxes that extend past the image; [`FaceBox::padded`]
/// is the only place geometry gets clamped to frame bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl FaceBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Grows the box by `ratio` of its size on every side, then clamps it
    /// to a `frame_w` x `frame_h` frame.
    ///
    /// Padding is truncated to whole pixels per axis before it is applied.
    pub fn padded(&self, ratio: f64, frame_w: u32, frame_h: u32) -> FaceBox {
        let pad_x = (self.width as f64 * ratio) as i32;
        let pad_y = (self.height as f64 * ratio) as i32;

        let left = (self.x - pad_x).max(0);
        let top = (self.y - pad_y).max(0);
        let right = (self.right() + pad_x).min(frame_w as i32);
        let bottom = (self.bottom() + pad_y).min(frame_h as i32);

        FaceBox {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

impl std::fmt::Display for FaceBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}]",
            self.x,
            self.y,
            self.right(),
            self.bottom()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    // ── padded ──────────────────────────────────────────────────────

    #[test]
    fn test_padded_inside_frame_grows_twenty_percent_per_side() {
        let b = FaceBox::new(50, 50, 100, 100);
        assert_eq!(b.padded(0.2, 200, 200), FaceBox::new(30, 30, 140, 140));
    }

    #[rstest]
    #[case::left_edge(FaceBox::new(5, 50, 100, 100), FaceBox::new(0, 30, 125, 140))]
    #[case::top_edge(FaceBox::new(50, 5, 100, 100), FaceBox::new(30, 0, 140, 125))]
    #[case::bottom_right(FaceBox::new(200, 200, 100, 100), FaceBox::new(180, 180, 120, 120))]
    fn test_padded_clamps_to_frame(#[case] input: FaceBox, #[case] expected: FaceBox) {
        assert_eq!(input.padded(0.2, 300, 300), expected);
    }

    #[test]
    fn test_padded_truncates_fractional_padding() {
        // 0.2 * 33 = 6.6 -> 6
        let b = FaceBox::new(10, 10, 33, 33);
        assert_eq!(b.padded(0.2, 100, 100), FaceBox::new(4, 4, 45, 45));
    }

    #[test]
    fn test_padded_zero_ratio_only_clamps() {
        let b = FaceBox::new(-10, -10, 50, 50);
        assert_eq!(b.padded(0.0, 100, 100), FaceBox::new(0, 0, 40, 40));
    }

    #[test]
    fn test_is_empty() {
        assert!(FaceBox::new(0, 0, 0, 10).is_empty());
        assert!(FaceBox::new(0, 0, 10, -1).is_empty());
        assert!(!FaceBox::new(0, 0, 1, 1).is_empty());
    }

    #[test]
    fn test_display_uses_corner_coordinates() {
        assert_eq!(FaceBox::new(1, 2, 3, 4).to_string(), "[1, 2, 4, 6]");
    }
}
