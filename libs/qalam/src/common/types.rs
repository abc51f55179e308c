use image::{GrayImage, ImageFormat, RgbImage};

use super::error::{QalamError, Result};

/// Three-channel raster produced by decoding a [`RawImage`].
pub type DecodedRaster = RgbImage;

/// Single-channel raster handed to script detection and recognition.
pub type PreprocessedRaster = GrayImage;

/// Image bytes as received from the caller, plus the declared or sniffed encoding.
#[derive(Debug, Clone)]
pub struct RawImage {
    bytes: Vec<u8>,
    format: Option<ImageFormat>,
}

impl RawImage {
    pub fn new(bytes: Vec<u8>, format: Option<ImageFormat>) -> Self {
        Self { bytes, format }
    }

    /// Wraps bytes whose encoding is unknown; the format is sniffed from the
    /// magic bytes when possible.
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        let format = image::guess_format(&bytes).ok();
        Self { bytes, format }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the bytes. The encoding found in the content wins over the
    /// declared one, which is only used when the magic bytes are inconclusive.
    pub fn decode(&self) -> Result<DecodedRaster> {
        let format = image::guess_format(&self.bytes).ok().or(self.format);
        if format.is_some() && format != self.format {
            log::debug!("Declared {:?} but content is {:?}", self.format, format);
        }

        let decoded = match format {
            Some(format) => image::load_from_memory_with_format(&self.bytes, format),
            None => image::load_from_memory(&self.bytes),
        }
        .map_err(|e| QalamError::Decode(e.to_string()))?;

        Ok(decoded.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb};
    use std::io::Cursor;

    fn encode(img: &RgbImage, format: ImageFormat) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img.clone())
            .write_to(&mut buffer, format)
            .unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_sniffs_png() {
        let img = RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]));
        let raw = RawImage::sniffed(encode(&img, ImageFormat::Png));
        assert_eq!(raw.format(), Some(ImageFormat::Png));

        let decoded = raw.decode().unwrap();
        assert_eq!(decoded.dimensions(), (4, 3));
        assert_eq!(decoded.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_garbage_bytes_fail_to_decode() {
        let raw = RawImage::sniffed(b"definitely not an image".to_vec());
        assert!(raw.format().is_none());
        assert!(matches!(raw.decode(), Err(QalamError::Decode(_))));
    }

    #[test]
    fn test_content_wins_over_declared_format() {
        let img = RgbImage::from_pixel(2, 2, Rgb([7, 8, 9]));
        let raw = RawImage::new(encode(&img, ImageFormat::Png), Some(ImageFormat::Jpeg));

        let decoded = raw.decode().unwrap();
        assert_eq!(decoded.dimensions(), (2, 2));
        assert_eq!(decoded.get_pixel(1, 1), &Rgb([7, 8, 9]));
    }

    #[test]
    fn test_declared_format_with_unrecognised_content_fails() {
        let raw = RawImage::new(b"no magic here".to_vec(), Some(ImageFormat::Png));
        assert!(matches!(raw.decode(), Err(QalamError::Decode(_))));
    }
}
