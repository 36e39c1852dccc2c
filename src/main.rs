//! Pose Feedback Service
//!
//! Accepts webcam frames over REST, runs pose landmark detection,
//! optionally classifies the pose, and returns the annotated frame.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use posecoach::api::rest::{create_rest_router, AppState};
use posecoach::config::Config;
use posecoach::engine::{PoseBackend, PoseEngine};
use posecoach::service::FrameService;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    info!("Starting Pose Feedback Service v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Config::load(Config::default_path()).unwrap_or_else(|e| {
        info!("Using default config ({})", e);
        Config::default()
    });

    info!("Configuration loaded:");
    info!("  Port: {}", config.server.port);
    info!("  Device: {}", config.inference.device);
    info!("  Model dir: {}", config.models.dir.display());

    // Load models; classifier failure degrades, landmarker failure aborts
    let engine = Arc::new(PoseEngine::load(&config)?);
    if engine.has_classifier() {
        info!("Pose classifier loaded successfully");
    } else {
        info!("Running in detection-only mode");
    }

    // Create frame service and router
    let service = Arc::new(FrameService::new(engine));
    let state = Arc::new(AppState { service });
    let router = create_rest_router(state);

    let addr = format!("0.0.0.0:{}", config.server.port);
    info!("Listening on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
