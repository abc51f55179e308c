use clap::Parser;
use qalam::common::init_logger_exe;
use qalam::image2text::{RecognitionEngine, TesseractEngine};
use qalam::process::{Pipeline, ProcessorConfig};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;

mod service;

#[derive(Parser)]
#[command(version, about = "HTTP service extracting Latin and Arabic text from document images", long_about = None)]
struct Cli {
    #[arg(long, env = "QALAM_HOST", default_value = "0.0.0.0")]
    host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5004)]
    port: u16,

    #[arg(
        long,
        env = "QALAM_MAX_WORKERS",
        default_value_t = 100,
        help = "Requests processed concurrently"
    )]
    max_workers: usize,

    #[arg(long, env = "QALAM_MAX_UPLOAD_MB", default_value_t = 20)]
    max_upload_mb: usize,

    #[command(flatten)]
    processor: ProcessorConfig,
}

fn main() -> anyhow::Result<()> {
    init_logger_exe();
    let cli = Cli::parse();

    // Engine locations are process-wide; publish them before any worker thread exists.
    cli.processor.engine_config().apply()?;
    let engine = match TesseractEngine::new() {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("Cannot start without a recognition engine: {}", e);
            return Err(e.into());
        }
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(serve(cli, Arc::new(engine)))
}

async fn serve(cli: Cli, engine: Arc<dyn RecognitionEngine>) -> anyhow::Result<()> {
    log::info!("Starting server...");

    let pipeline = Arc::new(Pipeline::new(&cli.processor, engine));
    let app = service::router(
        pipeline,
        cli.max_workers.max(1),
        cli.max_upload_mb.max(1) * 1024 * 1024,
    );

    let addr = SocketAddr::new(cli.host, cli.port);
    log::info!("Attempting to bind to {}", addr);

    let listener = TcpListener::bind(addr).await?;
    log::info!("Successfully bound to http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log::warn!("Ctrl-C received, stopping..."),
        Err(e) => log::error!("Failed to listen for Ctrl-C: {}", e),
    }
}
