use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::image2text::{EngineConfig, OcrConfig};
use crate::image_utils::{BinarizationStrategy, PreprocessConfig};

/// Process-wide pipeline settings. Parsed once at startup and shared read-only.
#[derive(Clone, Debug, Serialize, Deserialize, Args)]
pub struct ProcessorConfig {
    #[arg(
        long,
        env = "QALAM_TESSERACT_DIR",
        help = "Directory containing the tesseract executable (defaults to PATH)"
    )]
    pub tesseract_dir: Option<PathBuf>,

    #[arg(
        long,
        env = "QALAM_TESSDATA_DIR",
        help = "Directory containing the trained language models"
    )]
    pub tessdata_dir: Option<PathBuf>,

    #[arg(
        long,
        value_enum,
        env = "QALAM_BINARIZATION",
        default_value_t = BinarizationStrategy::Adaptive,
        help = "Binarization strategy"
    )]
    pub binarization: BinarizationStrategy,

    #[arg(long, env = "QALAM_NO_UPSCALE", help = "Skip upscaling before recognition")]
    pub no_upscale: bool,

    #[arg(
        long,
        env = "QALAM_UPSCALE_FACTOR",
        default_value_t = 2,
        value_parser = clap::value_parser!(u32).range(1..=4)
    )]
    pub upscale_factor: u32,

    #[arg(
        long,
        env = "QALAM_ADAPTIVE_WINDOW",
        default_value_t = 11,
        value_parser = clap::value_parser!(u32).range(3..=255),
        help = "Neighbourhood size of the adaptive threshold"
    )]
    pub adaptive_window: u32,

    #[arg(
        long,
        env = "QALAM_ADAPTIVE_OFFSET",
        default_value_t = 2,
        allow_negative_numbers = true,
        help = "Constant subtracted from the neighbourhood mean"
    )]
    pub adaptive_offset: i32,

    #[arg(
        long,
        env = "QALAM_ENGINE_CONCURRENCY",
        help = "Simultaneous engine invocations (defaults to the number of CPU cores)"
    )]
    pub engine_concurrency: Option<usize>,

    #[arg(
        long,
        env = "QALAM_MAX_PIXELS",
        default_value_t = 32_000_000,
        help = "Largest image, in pixels, accepted for preprocessing"
    )]
    pub max_pixels: u64,

    #[arg(long, env = "QALAM_ENGINE_TIMEOUT_SECS", default_value_t = 30)]
    pub engine_timeout_secs: u64,

    #[arg(long, env = "QALAM_DPI", default_value_t = 300)]
    pub dpi: u32,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            tesseract_dir: None,
            tessdata_dir: None,
            binarization: BinarizationStrategy::Adaptive,
            no_upscale: false,
            upscale_factor: PreprocessConfig::get_default_upscale_factor(),
            adaptive_window: PreprocessConfig::get_default_adaptive_window(),
            adaptive_offset: PreprocessConfig::get_default_adaptive_offset(),
            max_pixels: PreprocessConfig::get_default_max_pixels(),
            engine_concurrency: None,
            engine_timeout_secs: 30,
            dpi: OcrConfig::get_default_dpi(),
        }
    }
}

impl ProcessorConfig {
    pub fn preprocess_config(&self) -> PreprocessConfig {
        PreprocessConfig {
            upscale: !self.no_upscale,
            upscale_factor: self.upscale_factor,
            binarization: self.binarization,
            adaptive_window: self.adaptive_window,
            adaptive_offset: self.adaptive_offset,
            max_pixels: self.max_pixels,
        }
    }

    pub fn ocr_config(&self) -> OcrConfig {
        OcrConfig::new(Some(self.dpi))
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.tesseract_dir.clone(), self.tessdata_dir.clone())
    }

    pub fn engine_timeout(&self) -> Duration {
        Duration::from_secs(self.engine_timeout_secs)
    }

    pub fn engine_permits(&self) -> usize {
        self.engine_concurrency
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1)
            })
            .max(1)
    }
}
