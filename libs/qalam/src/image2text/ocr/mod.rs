// OCR module structure
mod ocr_tesseract;
pub use ocr_tesseract::TesseractEngine;

mod types;
pub use types::{EngineConfig, OcrConfig, OsdResult};

use crate::common::{PreprocessedRaster, Result};

/// Contract of the text recognition engine.
///
/// Both calls are blocking and CPU bound; callers are expected to run them
/// off the async executor.
pub trait RecognitionEngine: Send + Sync {
    /// Orientation and script detection pass. Only the resolution settings of
    /// `config` apply; the pass has its own segmentation mode.
    fn detect_script(&self, raster: &PreprocessedRaster, config: &OcrConfig) -> Result<OsdResult>;

    /// Full recognition with the given language selector (`eng`, `ara`, `eng+ara`).
    fn recognize(
        &self,
        raster: &PreprocessedRaster,
        language: &str,
        config: &OcrConfig,
    ) -> Result<String>;
}
