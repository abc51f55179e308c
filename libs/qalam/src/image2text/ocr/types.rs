use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::common::{QalamError, Result};

/// Engine parameters applied to every recognition call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OcrConfig {
    pub dpi: Option<u32>, // dots per inch
    pub psm: u32,         // Page segmentation mode
    pub oem: u32,         // OCR Engine Mode
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            dpi: Some(Self::get_default_dpi()),
            psm: Self::get_default_psm(),
            oem: Self::get_default_oem(),
        }
    }
}

impl OcrConfig {
    pub fn new(dpi: Option<u32>) -> Self {
        Self {
            dpi,
            ..Default::default()
        }
    }

    pub fn get_default_dpi() -> u32 {
        300
    }

    /// Uniform block of text.
    pub fn get_default_psm() -> u32 {
        6
    }

    /// Default (LSTM) engine.
    pub fn get_default_oem() -> u32 {
        3
    }
}

/// Script name and confidence reported by the detection pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OsdResult {
    pub script: String,
    pub confidence: Option<f32>,
}

/// Where the engine executable and its language models live.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    pub tesseract_dir: Option<PathBuf>,
    pub tessdata_dir: Option<PathBuf>,
}

impl EngineConfig {
    pub fn new(tesseract_dir: Option<PathBuf>, tessdata_dir: Option<PathBuf>) -> Self {
        Self {
            tesseract_dir,
            tessdata_dir,
        }
    }

    /// Publishes the engine locations to the process environment.
    ///
    /// Must run once at startup, before any other thread exists.
    pub fn apply(&self) -> Result<()> {
        if let Some(dir) = &self.tesseract_dir {
            if !dir.is_dir() {
                return Err(QalamError::EngineUnavailable(format!(
                    "tesseract directory not found: {}",
                    dir.display()
                )));
            }
            let mut paths = vec![dir.clone()];
            if let Some(existing) = std::env::var_os("PATH") {
                paths.extend(std::env::split_paths(&existing));
            }
            let joined = std::env::join_paths(paths)
                .map_err(|e| QalamError::EngineUnavailable(e.to_string()))?;
            std::env::set_var("PATH", joined);
            log::info!("Using tesseract from {}", dir.display());
        }

        if let Some(dir) = &self.tessdata_dir {
            if !dir.is_dir() {
                return Err(QalamError::EngineUnavailable(format!(
                    "tessdata directory not found: {}",
                    dir.display()
                )));
            }
            std::env::set_var("TESSDATA_PREFIX", dir);
            log::info!("Using language models from {}", dir.display());
        }

        Ok(())
    }
}
