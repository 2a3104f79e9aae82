use ndarray::ArrayView3;

/// Number of interleaved channels in every frame (RGB).
pub const CHANNELS: usize = 3;

/// A decoded image: contiguous RGB bytes in row-major order.
///
/// Conversion to and from `image` buffers happens at the I/O boundary;
/// drawing and cropping operate on the raw bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
        }
    }

    /// A frame of uniform colour.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * CHANNELS);
        for _ in 0..pixels {
            data.extend_from_slice(&color);
        }
        Self::new(data, width, height)
    }

    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self::new(img.into_raw(), width, height)
    }

    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([self.data[i], self.data[i + 1], self.data[i + 2]])
    }

    /// Writes a pixel; coordinates outside the frame are ignored.
    pub fn put_pixel(&mut self, x: i64, y: i64, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let i = self.offset(x as u32, y as u32);
        self.data[i..i + CHANNELS].copy_from_slice(&color);
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * CHANNELS
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_and_accessors() {
        let data = vec![0u8; 12]; // 2x2x3
        let frame = Frame::new(data.clone(), 2, 2);
        assert_eq!(frame.width(), 2);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.data(), &data[..]);
        assert!(!frame.is_empty());
    }

    #[test]
    #[should_panic(expected = "data length must equal width * height * 3")]
    fn test_mismatched_data_length_panics_in_debug() {
        Frame::new(vec![0u8; 10], 2, 2);
    }

    #[test]
    fn test_filled_sets_every_pixel() {
        let frame = Frame::filled(3, 2, [10, 20, 30]);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(frame.pixel(x, y), Some([10, 20, 30]));
            }
        }
    }

    #[test]
    fn test_zero_sized_frame_is_empty() {
        assert!(Frame::filled(0, 5, [0, 0, 0]).is_empty());
        assert!(Frame::filled(5, 0, [0, 0, 0]).is_empty());
    }

    #[test]
    fn test_put_pixel_ignores_out_of_bounds() {
        let mut frame = Frame::filled(2, 2, [0, 0, 0]);
        frame.put_pixel(-1, 0, [255, 255, 255]);
        frame.put_pixel(0, 2, [255, 255, 255]);
        frame.put_pixel(1, 1, [255, 0, 0]);
        assert_eq!(frame.pixel(1, 1), Some([255, 0, 0]));
        assert_eq!(frame.data().iter().filter(|&&b| b == 255).count(), 1);
    }

    #[test]
    fn test_pixel_out_of_bounds_is_none() {
        let frame = Frame::filled(2, 2, [0, 0, 0]);
        assert_eq!(frame.pixel(2, 0), None);
    }

    #[test]
    fn test_rgb_image_conversion_keeps_pixels() {
        let mut img = image::RgbImage::new(4, 3);
        img.put_pixel(3, 2, image::Rgb([1, 2, 3]));
        let frame = Frame::from_rgb_image(img);
        assert_eq!(frame.pixel(3, 2), Some([1, 2, 3]));

        let back = frame.to_rgb_image().unwrap();
        assert_eq!(back.get_pixel(3, 2).0, [1, 2, 3]);
    }

    #[test]
    fn test_as_ndarray_shape_and_access() {
        let mut frame = Frame::filled(4, 2, [0, 0, 0]);
        frame.put_pixel(0, 1, [200, 0, 0]);
        let arr = frame.as_ndarray();
        assert_eq!(arr.shape(), &[2, 4, 3]);
        assert_eq!(arr[[1, 0, 0]], 200);
    }
}
