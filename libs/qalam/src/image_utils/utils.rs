use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::filter::filter3x3;
use imageproc::map::map_colors;

use super::types::{BinarizationStrategy, PreprocessConfig};
use crate::common::{DecodedRaster, PreprocessedRaster, QalamError, Result};

/// High-pass kernel, row-major: centre 9, every neighbour -1.
const SHARPEN_KERNEL: [i32; 9] = [-1, -1, -1, -1, 9, -1, -1, -1, -1];

const BLACK: u8 = 0;
const WHITE: u8 = 255;

/// Grayscale, optional upscale, sharpen, binarize.
///
/// The returned raster is strictly binary. Images above `max_pixels` are
/// rejected; upscaling is skipped when its result would exceed the limit.
pub fn preprocess(raster: &DecodedRaster, config: &PreprocessConfig) -> Result<PreprocessedRaster> {
    let (width, height) = raster.dimensions();
    if width == 0 || height == 0 {
        return Err(QalamError::InvalidImage(format!(
            "image has zero dimension ({}x{})",
            width, height
        )));
    }

    let pixels = width as u64 * height as u64;
    if pixels > config.max_pixels {
        return Err(QalamError::InvalidImage(format!(
            "image is too large ({}x{}, limit {} pixels)",
            width, height, config.max_pixels
        )));
    }

    let gray = to_grayscale(raster);

    let factor = config.upscale_factor as u64;
    let gray = if !config.upscale {
        gray
    } else if pixels.saturating_mul(factor.saturating_mul(factor)) > config.max_pixels {
        log::debug!(
            "Skipping x{} upscale of {}x{}, result would exceed {} pixels",
            factor, width, height, config.max_pixels
        );
        gray
    } else {
        upscale(&gray, config.upscale_factor)?
    };
    log::debug!("Preprocessing {}x{} raster", gray.width(), gray.height());

    let sharpened = sharpen(&gray);
    let binary = binarize(&sharpened, config);

    log::debug!("Binarized with {} strategy", config.binarization);
    Ok(binary)
}

pub fn to_grayscale(raster: &DecodedRaster) -> GrayImage {
    imageops::grayscale(raster)
}

/// Bicubic (Catmull-Rom) upscale by an integer factor.
pub fn upscale(gray: &GrayImage, factor: u32) -> Result<GrayImage> {
    if factor <= 1 {
        return Ok(gray.clone());
    }

    let (width, height) = gray.dimensions();
    let scaled = width
        .checked_mul(factor)
        .zip(height.checked_mul(factor))
        .filter(|(w, h)| (*w as u64) * (*h as u64) <= u32::MAX as u64);

    match scaled {
        Some((new_width, new_height)) => Ok(imageops::resize(
            gray,
            new_width,
            new_height,
            FilterType::CatmullRom,
        )),
        None => Err(QalamError::Processing(format!(
            "upscaling {}x{} by {} overflows",
            width, height, factor
        ))),
    }
}

pub fn sharpen(gray: &GrayImage) -> GrayImage {
    filter3x3(gray, &SHARPEN_KERNEL)
}

pub fn binarize(gray: &GrayImage, config: &PreprocessConfig) -> GrayImage {
    match config.binarization {
        BinarizationStrategy::Adaptive => {
            binarize_adaptive(gray, config.adaptive_window, config.adaptive_offset)
        }
        BinarizationStrategy::Otsu => binarize_otsu(gray),
    }
}

/// Mean-of-neighbourhood threshold: a pixel turns white when it is brighter
/// than the mean of its `window`x`window` neighbourhood minus `offset`.
/// Windows are clipped at the image border.
pub fn binarize_adaptive(gray: &GrayImage, window: u32, offset: i32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radius = window.max(1) / 2;
    let integral = integral_table(gray);
    let stride = width as usize + 1;

    let mut output = GrayImage::new(width, height);
    for y in 0..height {
        let top = y.saturating_sub(radius) as usize;
        let bottom = (y + radius).min(height - 1) as usize + 1;
        for x in 0..width {
            let left = x.saturating_sub(radius) as usize;
            let right = (x + radius).min(width - 1) as usize + 1;

            let sum = integral[bottom * stride + right] + integral[top * stride + left]
                - integral[top * stride + right]
                - integral[bottom * stride + left];
            let count = ((right - left) * (bottom - top)) as i64;

            // pixel > sum / count - offset, kept in integers
            let pixel = gray.get_pixel(x, y).0[0] as i64;
            let value = if pixel * count > sum as i64 - offset as i64 * count {
                WHITE
            } else {
                BLACK
            };
            output.put_pixel(x, y, Luma([value]));
        }
    }

    output
}

pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    log::trace!("Otsu level {}", level);
    map_colors(gray, |p: Luma<u8>| {
        if p.0[0] > level {
            Luma([WHITE])
        } else {
            Luma([BLACK])
        }
    })
}

/// Summed-area table with a zero first row and column.
fn integral_table(gray: &GrayImage) -> Vec<u64> {
    let (width, height) = gray.dimensions();
    let stride = width as usize + 1;
    let mut table = vec![0u64; stride * (height as usize + 1)];

    for y in 0..height as usize {
        let mut row_sum = 0u64;
        for x in 0..width as usize {
            row_sum += gray.get_pixel(x as u32, y as u32).0[0] as u64;
            table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
        }
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn is_strictly_binary(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == BLACK || p.0[0] == WHITE)
    }

    fn gradient(width: u32, height: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    /// Two differently lit halves, each with a 3x3 dark mark at its centre.
    fn uneven_page() -> GrayImage {
        GrayImage::from_fn(40, 20, |x, y| {
            let background = if x < 20 { 200 } else { 90 };
            let in_mark = (9..=11).contains(&y) && ((9..=11).contains(&x) || (29..=31).contains(&x));
            Luma([if in_mark { background - 60 } else { background }])
        })
    }

    #[test]
    fn test_both_strategies_produce_strictly_binary_output() {
        let gray = gradient(37, 23);
        assert!(is_strictly_binary(&binarize_adaptive(&gray, 11, 2)));
        assert!(is_strictly_binary(&binarize_otsu(&gray)));
    }

    #[test]
    fn test_adaptive_handles_uneven_illumination() {
        let binary = binarize_adaptive(&uneven_page(), 11, 2);

        assert_eq!(binary.get_pixel(10, 10).0[0], BLACK);
        assert_eq!(binary.get_pixel(30, 10).0[0], BLACK);
        assert_eq!(binary.get_pixel(3, 3).0[0], WHITE);
        assert_eq!(binary.get_pixel(37, 3).0[0], WHITE);
    }

    #[test]
    fn test_otsu_splits_bimodal_image() {
        let gray = GrayImage::from_fn(10, 10, |x, _| Luma([if x < 5 { 40 } else { 210 }]));
        let binary = binarize_otsu(&gray);

        assert_eq!(binary.get_pixel(0, 0).0[0], BLACK);
        assert_eq!(binary.get_pixel(9, 9).0[0], WHITE);
    }

    #[test]
    fn test_sharpen_keeps_flat_regions() {
        let flat = GrayImage::from_pixel(5, 5, Luma([120]));
        let sharpened = sharpen(&flat);
        assert!(sharpened.pixels().all(|p| p.0[0] == 120));
    }

    #[test]
    fn test_upscale_multiplies_dimensions() {
        let gray = gradient(12, 7);
        assert_eq!(upscale(&gray, 2).unwrap().dimensions(), (24, 14));
        assert_eq!(upscale(&gray, 1).unwrap().dimensions(), (12, 7));
    }

    #[test]
    fn test_upscale_overflow_is_processing_error() {
        let gray = GrayImage::new(1, 1);
        assert!(matches!(upscale(&gray, u32::MAX), Err(QalamError::Processing(_))));
    }

    #[test]
    fn test_preprocess_rejects_zero_dimension() {
        let empty = RgbImage::new(0, 10);
        let result = preprocess(&empty, &PreprocessConfig::default());
        assert!(matches!(result, Err(QalamError::InvalidImage(_))));
    }

    #[test]
    fn test_preprocess_rejects_oversized_image() {
        let raster = RgbImage::new(100, 50);
        let config = PreprocessConfig { max_pixels: 4_999, ..PreprocessConfig::default() };
        assert!(matches!(preprocess(&raster, &config), Err(QalamError::InvalidImage(_))));

        let config = PreprocessConfig { max_pixels: 5_000, upscale: false, ..PreprocessConfig::default() };
        assert_eq!(preprocess(&raster, &config).unwrap().dimensions(), (100, 50));
    }

    #[test]
    fn test_preprocess_skips_upscale_above_limit() {
        let raster = RgbImage::new(100, 50);
        let config = PreprocessConfig { max_pixels: 19_999, ..PreprocessConfig::default() };
        assert_eq!(preprocess(&raster, &config).unwrap().dimensions(), (100, 50));

        let config = PreprocessConfig { max_pixels: 20_000, ..PreprocessConfig::default() };
        assert_eq!(preprocess(&raster, &config).unwrap().dimensions(), (200, 100));
    }

    #[test]
    fn test_preprocess_full_pipeline() {
        let raster = RgbImage::from_fn(16, 8, |x, _| {
            if x % 4 == 0 { Rgb([0, 0, 0]) } else { Rgb([250, 250, 250]) }
        });

        for binarization in [BinarizationStrategy::Adaptive, BinarizationStrategy::Otsu] {
            let config = PreprocessConfig { binarization, ..PreprocessConfig::default() };
            let out = preprocess(&raster, &config).unwrap();
            assert_eq!(out.dimensions(), (32, 16));
            assert!(is_strictly_binary(&out));
        }

        let config = PreprocessConfig { upscale: false, ..PreprocessConfig::default() };
        assert_eq!(preprocess(&raster, &config).unwrap().dimensions(), (16, 8));
    }
}
