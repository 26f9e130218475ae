//! Roomgate API - Main Entry Point

use clap::Parser;
use mimalloc::MiMalloc;

use roomgate_api::config::AppConfig;
use roomgate_api::logging::init_tracing;
use roomgate_api::server::create_app;

// Use mimalloc for better performance
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "roomgate-api")]
#[command(about = "Roomgate API - session credentials for virtual-room clients")]
#[command(version)]
struct Args {
    /// Host to bind to (overrides configuration).
    #[arg(long, env = "ROOMGATE_HOST")]
    host: Option<String>,

    /// Port to listen on (overrides configuration).
    #[arg(short, long, env = "ROOMGATE_PORT")]
    port: Option<u16>,

    /// Log level (overrides configuration).
    #[arg(long, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Emit logs as JSON (overrides configuration).
    #[arg(long, env = "ROOMGATE_JSON_LOGS")]
    json_logs: bool,

    /// Config file path.
    #[arg(short, long, env = "ROOMGATE_CONFIG")]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Configuration comes first so the logging section can drive the subscriber.
    let mut config = match &args.config {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load()?,
    };
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.logging.apply_overrides(args.log_level, args.json_logs);

    init_tracing(&config.logging.level, config.logging.json)?;

    tracing::info!("Starting Roomgate API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        level = %config.logging.level,
        json = config.logging.json,
        "Configuration loaded"
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = create_app(config)?;

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
