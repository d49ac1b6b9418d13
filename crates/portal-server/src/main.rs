mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use portal_api::AppStateInner;
use portal_auth::TokenService;
use portal_db::Stores;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portal=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Any store that fails to open or migrate aborts startup here.
    let stores = Stores::open(&config.store_paths)?;
    let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_minutes);

    let state = Arc::new(AppStateInner { stores, tokens });
    let app = portal_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("portal server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
