pub mod ocr;
pub use ocr::{EngineConfig, OcrConfig, OsdResult, RecognitionEngine, TesseractEngine};

pub mod script;
pub use script::{ScriptDetection, ScriptHint};
