use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use symptom_match_server::{build_matcher, load_catalog, router, AppState, CatalogFormat, Config};

/// HTTP service ranking likely conditions from reported symptoms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the JSON config file
    #[arg(short, long, default_value = "symptom-match.json")]
    config: PathBuf,

    /// Catalog CSV file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Catalog layout: "flags" or "listed"
    #[arg(long)]
    format: Option<CatalogFormat>,

    /// Weight table JSON file
    #[arg(long)]
    weights: Option<PathBuf>,

    /// Where to cache the trained symptom model
    #[arg(long)]
    model_cache: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn apply(self, mut config: Config) -> Config {
        if let Some(path) = self.catalog {
            config.catalog_path = path;
        }
        if let Some(format) = self.format {
            config.catalog_format = format;
        }
        if let Some(path) = self.weights {
            config.weights_path = Some(path);
        }
        if let Some(path) = self.model_cache {
            config.model_cache_path = Some(path);
        }
        if let Some(bind) = self.bind {
            config.bind_address = bind;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config = Config::load(&args.config)?;
    let config = args.apply(config);

    info!("Symptom matcher starting...");
    info!("Catalog: {:?} ({:?})", config.catalog_path, config.catalog_format);

    let catalog = load_catalog(&config)?;
    let matcher = build_matcher(&config, catalog);
    let app = router(AppState::new(matcher));

    let address = config.socket_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Received Ctrl+C, shutting down...");
        })
        .await
        .context("Server error")?;

    Ok(())
}
