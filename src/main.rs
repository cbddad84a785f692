use crate::app_config::AppConfig;
use crate::console::CameraConsole;
use crate::device::DeviceClient;
use crate::headless_surface::HeadlessSurface;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;

mod app_config;
mod console;
mod device;
mod domain;
mod headless_surface;
mod operator;
mod optimistic;
mod power;
mod range_loader;
mod zoom;

// All device work runs on one thread, concurrency is only ever in-flight requests
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("📷 Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let client = DeviceClient::new(device::new_client(&config)?, &config);
    let surface = Arc::new(HeadlessSurface::new());

    let mut console = CameraConsole::new(&config, client, surface.clone());
    console.start().await;
    let _feedback = operator::report_feedback(console.zoom().feedback());
    info!("✅  Initialized camera controls");

    info!("🔥 {} is up and running", env!("CARGO_PKG_NAME"));

    operator::run(&mut console, &surface, BufReader::new(tokio::io::stdin())).await?;

    Ok(())
}
