//! Twelfbox daemon - HTTP front end for sandboxed Twelf checker runs

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use twelfbox::config;
use twelfbox::sandbox::{Checker, UlimitChecker};
use twelfbox::server::{build_router, AppState};

// ---- CLI ----

#[derive(Parser)]
#[command(name = "twelfboxd", about = "Sandboxed Twelf checker execution service")]
struct Args {
    /// Bind address (overrides config)
    #[arg(long)]
    bind: Option<String>,

    /// Port (overrides config)
    #[arg(long, short)]
    port: Option<u16>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

// ---- Main ----

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    // Load config: explicit file, or the default lookup chain
    let mut config = match &args.config {
        Some(path) => {
            let mut config = config::load_config_from_path(path)?;
            config::apply_env_overrides(&mut config);
            config
        }
        None => config::load_config()?,
    };

    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    config::validate_config(&config)?;
    info!(
        "Checker command: {} (token placement: {})",
        config.checker.command.display(),
        config.decoder.token_placement
    );

    let checker: Arc<dyn Checker> = Arc::new(UlimitChecker::new(
        config.checker.command.clone(),
        config.checker.kill_exit_code,
    ));

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let app = build_router(AppState {
        checker,
        config: Arc::new(config),
    });

    // Bind and serve
    info!("Twelfbox listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
