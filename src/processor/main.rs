use clap::Parser;
use qalam::common::init_logger_exe;
use qalam::image2text::TesseractEngine;
use qalam::process::{Pipeline, ProcessorConfig};
use qalam::upload::process_image_path;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(version, about = "A CLI tool to OCR Latin and Arabic document images", long_about = None)]
struct Cli {
    #[arg(long, help = "input file in image (png, jpeg, tiff, bmp, gif) format")]
    image: PathBuf,

    #[arg(long, help = "print text and detected script as JSON")]
    json: bool,

    #[command(flatten)]
    processor: ProcessorConfig,
}

fn main() -> anyhow::Result<()> {
    init_logger_exe();
    let cli = Cli::parse();

    cli.processor.engine_config().apply()?;
    let engine = Arc::new(TesseractEngine::new()?);
    log::debug!("Tesseract version {}", engine.version().trim());

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let output = rt.block_on(async {
        let pipeline = Pipeline::new(&cli.processor, engine);
        process_image_path(&pipeline, &cli.image).await
    })?;

    log::info!(
        "Detected script {} (confidence {:?})",
        output.script.hint,
        output.script.confidence
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", output.text);
    }
    Ok(())
}
