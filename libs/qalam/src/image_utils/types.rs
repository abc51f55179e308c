use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BinarizationStrategy {
    /// Local mean threshold per pixel neighbourhood. Tolerates uneven lighting.
    Adaptive,
    /// Single histogram-derived threshold for the whole page.
    Otsu,
}

impl std::fmt::Display for BinarizationStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinarizationStrategy::Adaptive => write!(f, "adaptive"),
            BinarizationStrategy::Otsu => write!(f, "otsu"),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreprocessConfig {
    pub upscale: bool,
    pub upscale_factor: u32,
    pub binarization: BinarizationStrategy,
    pub adaptive_window: u32,
    pub adaptive_offset: i32,
    /// Largest raster, in pixels, the pipeline will work on.
    pub max_pixels: u64,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            upscale: true,
            upscale_factor: Self::get_default_upscale_factor(),
            binarization: BinarizationStrategy::Adaptive,
            adaptive_window: Self::get_default_adaptive_window(),
            adaptive_offset: Self::get_default_adaptive_offset(),
            max_pixels: Self::get_default_max_pixels(),
        }
    }
}

impl PreprocessConfig {
    pub fn get_default_upscale_factor() -> u32 {
        2
    }

    pub fn get_default_adaptive_window() -> u32 {
        11
    }

    pub fn get_default_adaptive_offset() -> i32 {
        2
    }

    pub fn get_default_max_pixels() -> u64 {
        32_000_000
    }
}
