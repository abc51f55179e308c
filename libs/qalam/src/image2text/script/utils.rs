use super::types::{ScriptDetection, ScriptHint};
use crate::common::{PreprocessedRaster, Result};
use crate::image2text::ocr::{OcrConfig, OsdResult, RecognitionEngine};

/// Runs the detection pass and resolves it to a hint. Never fails.
pub fn detect(
    engine: &dyn RecognitionEngine,
    raster: &PreprocessedRaster,
    config: &OcrConfig,
) -> ScriptDetection {
    resolve_detection(engine.detect_script(raster, config))
}

/// Turns a detection outcome into a hint; engine failures become `Mixed`.
pub fn resolve_detection(outcome: Result<OsdResult>) -> ScriptDetection {
    match outcome {
        Ok(osd) => {
            let hint = ScriptHint::from_script_name(&osd.script);
            log::debug!(
                "Detected script {} (confidence {:?}) -> {}",
                osd.script,
                osd.confidence,
                hint
            );
            ScriptDetection::new(hint, osd.confidence)
        }
        Err(e) => {
            log::warn!("Script detection failed, falling back to eng+ara: {}", e);
            ScriptDetection::fallback()
        }
    }
}
