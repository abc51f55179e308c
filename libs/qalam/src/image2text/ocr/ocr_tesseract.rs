use image::DynamicImage;
use rusty_tesseract::{Args, Image, TessError};
use std::collections::HashMap;

use super::types::{OcrConfig, OsdResult};
use super::RecognitionEngine;
use crate::common::{PreprocessedRaster, QalamError, Result};

const REQUIRED_LANGUAGES: [&str; 2] = ["eng", "ara"];
const OSD_LANGUAGE: &str = "osd";
const OSD_PSM: i32 = 0;

/// Tesseract driven through its command line.
pub struct TesseractEngine {
    version: String,
}

impl TesseractEngine {
    /// Checks that the executable runs and the `eng` and `ara` models are installed.
    pub fn new() -> Result<Self> {
        let version = rusty_tesseract::get_tesseract_version().map_err(map_tess_error)?;
        let languages = rusty_tesseract::get_tesseract_langs().map_err(map_tess_error)?;

        let missing: Vec<&str> = REQUIRED_LANGUAGES
            .iter()
            .copied()
            .filter(|lang| !languages.iter().any(|l| l == lang))
            .collect();
        if !missing.is_empty() {
            return Err(QalamError::EngineUnavailable(format!(
                "missing language models: {}",
                missing.join(", ")
            )));
        }

        if !languages.iter().any(|l| l == OSD_LANGUAGE) {
            log::warn!("No osd model installed, script detection will always fall back to eng+ara");
        }

        log::info!("Tesseract {} ready", version.trim());
        Ok(Self { version })
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl RecognitionEngine for TesseractEngine {
    fn detect_script(&self, raster: &PreprocessedRaster, config: &OcrConfig) -> Result<OsdResult> {
        let args = osd_args(config);
        let ocr_image = to_tesseract_image(raster)?;
        let output = rusty_tesseract::image_to_string(&ocr_image, &args).map_err(map_tess_error)?;
        parse_osd_output(&output)
    }

    fn recognize(
        &self,
        raster: &PreprocessedRaster,
        language: &str,
        config: &OcrConfig,
    ) -> Result<String> {
        let args = recognition_args(language, config);
        let ocr_image = to_tesseract_image(raster)?;
        rusty_tesseract::image_to_string(&ocr_image, &args).map_err(map_tess_error)
    }
}

fn osd_args(config: &OcrConfig) -> Args {
    Args {
        lang: OSD_LANGUAGE.to_string(),
        config_variables: HashMap::new(),
        dpi: config.dpi.map(|dpi| dpi as i32),
        psm: Some(OSD_PSM),
        oem: None,
    }
}

fn recognition_args(language: &str, config: &OcrConfig) -> Args {
    Args {
        lang: language.to_string(),
        config_variables: HashMap::new(),
        dpi: config.dpi.map(|dpi| dpi as i32),
        psm: Some(config.psm as i32),
        oem: Some(config.oem as i32),
    }
}

fn to_tesseract_image(raster: &PreprocessedRaster) -> Result<Image> {
    let dynamic = DynamicImage::ImageLuma8(raster.clone());
    Image::from_dynamic_image(&dynamic).map_err(|e| QalamError::Processing(e.to_string()))
}

fn map_tess_error(err: TessError) -> QalamError {
    let message = err.to_string();
    if matches!(err, TessError::TesseractNotFoundError) || is_missing_model(&message) {
        QalamError::EngineUnavailable(message)
    } else {
        QalamError::Recognition(message)
    }
}

fn is_missing_model(message: &str) -> bool {
    message.contains("Failed loading language") || message.contains("Error opening data file")
}

/// Reads the `Script:` and `Script confidence:` lines of a detection report.
pub(crate) fn parse_osd_output(output: &str) -> Result<OsdResult> {
    let mut script = None;
    let mut confidence = None;

    for line in output.lines().map(str::trim) {
        if let Some(value) = line.strip_prefix("Script:") {
            script = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("Script confidence:") {
            confidence = value.trim().parse::<f32>().ok();
        }
    }

    match script {
        Some(script) if !script.is_empty() => Ok(OsdResult { script, confidence }),
        _ => Err(QalamError::Recognition(
            "no script reported by orientation detection".to_string(),
        )),
    }
}
