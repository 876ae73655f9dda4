//! Plam API server
//! Mission: Serve the project ledger behind token authentication

use anyhow::{Context, Result};
use clap::Parser;
use dotenv::dotenv;
use std::net::SocketAddr;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use plam_backend::{auth::TokenMaker, db::Store, router, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    info!("🚀 Starting plam backend");

    let token_maker = TokenMaker::new(config.token_symmetric_key.as_bytes())
        .context("Failed to create token maker")?;

    let store = Store::open(&config.database_path)?;

    if let Some((username, password)) = config.admin_credentials() {
        store.ensure_admin(username, password, &config.admin_email)?;
    }

    let state = AppState::new(store, token_maker, config.access_token_duration())
        .with_request_timeout(config.request_timeout());
    let app = router(state);

    let listener = TcpListener::bind(&config.server_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.server_address))?;
    info!("🎯 API server listening on {}", config.server_address);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plam_backend=debug,plam=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn load_env() {
    // 1) Standard dotenv search (cwd + parents)
    let _ = dotenv();

    // 2) Also try the crate root, for runs started from elsewhere
    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}
