use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::Semaphore;

use super::types::ProcessorConfig;
use crate::common::{PreprocessedRaster, QalamError, RawImage, Result};
use crate::image2text::script::resolve_detection;
use crate::image2text::{OcrConfig, RecognitionEngine, ScriptDetection, ScriptHint};
use crate::image_utils::{preprocess, PreprocessConfig};
use crate::text::clean;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PipelineStage {
    Received,
    Decoded,
    Preprocessed,
    ScriptDetected,
    Recognized,
    Cleaned,
    Done,
    Failed,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PipelineOutput {
    pub text: String,
    pub script: ScriptDetection,
}

/// Progress of a single request, kept for failure reports.
struct PipelineRun {
    stage: PipelineStage,
    hint: Option<ScriptHint>,
    started: Instant,
}

impl PipelineRun {
    fn new() -> Self {
        Self {
            stage: PipelineStage::Received,
            hint: None,
            started: Instant::now(),
        }
    }

    fn advance(&mut self, stage: PipelineStage) {
        log::debug!("{} -> {} after {:?}", self.stage, stage, self.started.elapsed());
        self.stage = stage;
    }

    fn fail(&mut self, err: &QalamError) {
        let hint = self
            .hint
            .map(|h| h.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        if err.is_client_error() {
            log::info!("Rejected input at stage {}: {}", self.stage, err);
        } else {
            log::error!(
                "Pipeline failed at stage {} (script hint: {}, kind: {}): {}",
                self.stage,
                hint,
                err.kind(),
                err
            );
        }
        self.stage = PipelineStage::Failed;
    }
}

/// Sequences decode, preprocess, script detection, recognition and cleaning
/// for one image at a time. Shared across requests; holds no per-request state.
pub struct Pipeline {
    preprocess: PreprocessConfig,
    ocr: OcrConfig,
    engine: Arc<dyn RecognitionEngine>,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl Pipeline {
    pub fn new(config: &ProcessorConfig, engine: Arc<dyn RecognitionEngine>) -> Self {
        let permits = config.engine_permits();
        log::info!(
            "Pipeline ready: {} binarization, upscale {}, {} engine slots, {:?} timeout",
            config.binarization,
            if config.no_upscale { "off".to_string() } else { format!("x{}", config.upscale_factor) },
            permits,
            config.engine_timeout()
        );

        Self {
            preprocess: config.preprocess_config(),
            ocr: config.ocr_config(),
            engine,
            permits: Arc::new(Semaphore::new(permits)),
            timeout: config.engine_timeout(),
        }
    }

    pub async fn run(&self, image: RawImage) -> Result<PipelineOutput> {
        let mut run = PipelineRun::new();
        log::info!("Processing image ({} bytes, {:?})", image.len(), image.format());

        match self.execute(image, &mut run).await {
            Ok(output) => {
                run.advance(PipelineStage::Done);
                log::info!(
                    "Extracted {} chars with {} hint in {:?}",
                    output.text.chars().count(),
                    output.script.hint,
                    run.started.elapsed()
                );
                Ok(output)
            }
            Err(e) => {
                run.fail(&e);
                Err(e)
            }
        }
    }

    async fn execute(&self, image: RawImage, run: &mut PipelineRun) -> Result<PipelineOutput> {
        if image.is_empty() {
            return Err(QalamError::Input("Empty image file".to_string()));
        }

        let decoded = run_blocking(move || image.decode()).await?;
        run.advance(PipelineStage::Decoded);

        let config = self.preprocess.clone();
        let raster = run_blocking(move || preprocess(&decoded, &config)).await?;
        let raster = Arc::new(raster);
        run.advance(PipelineStage::Preprocessed);

        let detection = self.detect(raster.clone()).await;
        run.hint = Some(detection.hint);
        run.advance(PipelineStage::ScriptDetected);

        let language = detection.hint.language_selector();
        let ocr = self.ocr.clone();
        let raw = self
            .invoke_engine(move |engine| engine.recognize(&raster, language, &ocr))
            .await?;
        run.advance(PipelineStage::Recognized);

        let text = clean(&raw, detection.hint);
        run.advance(PipelineStage::Cleaned);

        Ok(PipelineOutput {
            text,
            script: detection,
        })
    }

    async fn detect(&self, raster: Arc<PreprocessedRaster>) -> ScriptDetection {
        let ocr = self.ocr.clone();
        resolve_detection(
            self.invoke_engine(move |engine| engine.detect_script(&raster, &ocr))
                .await,
        )
    }

    /// Runs one engine call on the blocking pool, bounded by the engine
    /// semaphore and the per-call timeout. The permit is released only when
    /// the call itself returns, even if the caller already gave up on it.
    async fn invoke_engine<T, F>(&self, call: F) -> Result<T>
    where
        F: FnOnce(&dyn RecognitionEngine) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let permit = self
            .permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|e| QalamError::Processing(e.to_string()))?;

        let engine = self.engine.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            call(engine.as_ref())
        });

        match tokio::time::timeout(self.timeout, handle).await {
            Ok(joined) => {
                joined.map_err(|e| QalamError::Processing(format!("engine task failed: {}", e)))?
            }
            Err(_) => Err(QalamError::EngineTimeout(self.timeout)),
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| QalamError::Processing(format!("worker task failed: {}", e)))?
}
