use std::path::Path;

use image::ImageDecoder;

use crate::imaging::domain::image_reader::ImageReader;
use crate::shared::frame::Frame;

/// Reads images with the `image` crate and applies the EXIF orientation
/// tag, so camera photos come out upright.
pub struct OrientedImageReader;

impl OrientedImageReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OrientedImageReader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageReader for OrientedImageReader {
    fn read(&self, path: &Path) -> Result<Frame, Box<dyn std::error::Error>> {
        let mut decoder = image::ImageReader::open(path)?
            .with_guessed_format()?
            .into_decoder()?;
        let orientation = decoder.orientation()?;

        let mut img = image::DynamicImage::from_decoder(decoder)?;
        log::debug!(
            "Decoded {}: {}x{}, orientation {:?}",
            path.display(),
            img.width(),
            img.height(),
            orientation
        );
        img.apply_orientation(orientation);

        Ok(Frame::from_rgb_image(img.to_rgb8()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_test_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let mut img = image::RgbImage::new(width, height);
        for pixel in img.pixels_mut() {
            *pixel = image::Rgb([50, 100, 200]);
        }
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_read_png_dimensions_and_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.png", 100, 80);
        let frame = OrientedImageReader::new().read(&path).unwrap();
        assert_eq!(frame.width(), 100);
        assert_eq!(frame.height(), 80);
        assert_eq!(frame.pixel(0, 0), Some([50, 100, 200]));
    }

    #[test]
    fn test_read_jpeg_without_exif_keeps_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_test_image(dir.path(), "test.jpg", 120, 60);
        let frame = OrientedImageReader::new().read(&path).unwrap();
        assert_eq!((frame.width(), frame.height()), (120, 60));
    }

    /// APP1 segment holding a big-endian TIFF IFD with a single
    /// Orientation (0x0112) entry.
    fn exif_orientation_segment(orientation: u8) -> Vec<u8> {
        let mut tiff = vec![b'M', b'M', 0x00, 0x2A, 0x00, 0x00, 0x00, 0x08];
        tiff.extend_from_slice(&[0x00, 0x01]);
        tiff.extend_from_slice(&[0x01, 0x12, 0x00, 0x03, 0x00, 0x00, 0x00, 0x01]);
        tiff.extend_from_slice(&[0x00, orientation, 0x00, 0x00]);
        tiff.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(&tiff);

        let len = (payload.len() + 2) as u16;
        let mut segment = vec![0xFF, 0xE1];
        segment.extend_from_slice(&len.to_be_bytes());
        segment.extend_from_slice(&payload);
        segment
    }

    fn is_red(pixel: [u8; 3]) -> bool {
        pixel[0] > 180 && pixel[1] < 80 && pixel[2] < 80
    }

    #[test]
    fn test_read_jpeg_rotates_by_exif_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rotated.jpg");

        // 32x16 white landscape, red block in the top-left corner.
        let mut img = image::RgbImage::from_pixel(32, 16, image::Rgb([255, 255, 255]));
        for y in 0..8 {
            for x in 0..8 {
                img.put_pixel(x, y, image::Rgb([255, 0, 0]));
            }
        }
        let mut jpeg = Vec::new();
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 100)
            .encode_image(&img)
            .unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let mut bytes = jpeg[..2].to_vec();
        bytes.extend(exif_orientation_segment(6));
        bytes.extend_from_slice(&jpeg[2..]);
        std::fs::write(&path, bytes).unwrap();

        let frame = OrientedImageReader::new().read(&path).unwrap();

        // Orientation 6: rotate 90 degrees clockwise.
        assert_eq!((frame.width(), frame.height()), (16, 32));
        assert!(is_red(frame.pixel(12, 3).unwrap()));
        assert!(!is_red(frame.pixel(3, 3).unwrap()));
    }

    #[test]
    fn test_read_detects_format_from_content() {
        let dir = tempfile::tempdir().unwrap();
        let png = write_test_image(dir.path(), "test.png", 10, 10);
        let renamed = dir.path().join("no_extension");
        std::fs::rename(&png, &renamed).unwrap();
        assert!(OrientedImageReader::new().read(&renamed).is_ok());
    }

    #[test]
    fn test_read_nonexistent_errors() {
        assert!(OrientedImageReader::new()
            .read(Path::new("/nonexistent/test.png"))
            .is_err());
    }

    #[test]
    fn test_read_garbage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();
        assert!(OrientedImageReader::new().read(&path).is_err());
    }
}
