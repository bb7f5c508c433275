use std::sync::Arc;

use tracing::{error, info};

use hoard::exif::MetadataStripper;
use hoard::{build_store, ensure_admin_from_env, AppState, Config, Database, WebServer};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env(CONFIG_PATH) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {CONFIG_PATH}: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    // Initialize logging
    if let Err(e) = hoard::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        hoard::logging::init_console_only(&config.logging.level);
    }

    if let Err(e) = run(config).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> hoard::Result<()> {
    config.validate()?;

    info!("hoard - self-hosted file sharing");

    let db = Database::open(&config.database.path).await?;
    ensure_admin_from_env(db.pool()).await?;

    let store = build_store(&config.storage).await;
    info!(backend = store.name(), "Object store ready");

    let stripper = MetadataStripper::from_config(&config.exif);

    let server = WebServer::new(AppState::new(db, store, Arc::new(stripper), config))?;
    info!("Server configured on {}", server.addr());
    server.run().await
}
