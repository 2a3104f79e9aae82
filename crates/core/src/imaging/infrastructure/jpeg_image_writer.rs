use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;

use crate::imaging::domain::image_writer::ImageWriter;
use crate::shared::constants::DEFAULT_JPEG_QUALITY;
use crate::shared::frame::Frame;

/// Writes frames as baseline JPEG at a fixed quality.
pub struct JpegImageWriter {
    quality: u8,
}

impl JpegImageWriter {
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl Default for JpegImageWriter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageWriter for JpegImageWriter {
    fn write(&self, path: &Path, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let img = frame
            .to_rgb_image()
            .ok_or("Failed to create image from frame data")?;

        let mut out = BufWriter::new(File::create(path)?);
        JpegEncoder::new_with_quality(&mut out, self.quality).encode_image(&img)?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_creates_decodable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jpg");
        let frame = Frame::filled(64, 48, [120, 130, 140]);
        JpegImageWriter::default().write(&path, &frame).unwrap();

        let img = image::open(&path).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (64, 48));
        let p = img.get_pixel(10, 10).0;
        // lossy, but a flat colour survives closely
        for (got, want) in p.iter().zip([120u8, 130, 140]) {
            assert!((*got as i32 - want as i32).abs() <= 3);
        }
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("out.jpg");
        JpegImageWriter::default()
            .write(&path, &Frame::filled(8, 8, [0, 0, 0]))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(JpegImageWriter::new(0).quality, 1);
        assert_eq!(JpegImageWriter::new(200).quality, 100);
    }

    #[test]
    fn test_write_under_a_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").unwrap();
        let result = JpegImageWriter::default()
            .write(&blocker.join("out.jpg"), &Frame::filled(8, 8, [0, 0, 0]));
        assert!(result.is_err());
    }
}
