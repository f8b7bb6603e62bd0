use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use swish_api::AppStateInner;
use swish_api::photos::PhotoStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "swish=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = env_or("SWISH_JWT_SECRET", "dev-secret-change-me");
    let db_path = env_or("SWISH_DB_PATH", "swish.db");
    let host = env_or("SWISH_HOST", "0.0.0.0");
    let port: u16 = env_or("SWISH_PORT", "5000").parse()?;
    let admin_code = env_or("SWISH_ADMIN_CODE", "CAMPUS2024");
    let campus = env_or("SWISH_CAMPUS", "SIGCE Campus");
    let email_domains: Vec<String> = env_or("SWISH_EMAIL_DOMAINS", "sigce.edu,university.edu")
        .split(',')
        .map(|d| d.trim().trim_start_matches('@').to_string())
        .filter(|d| !d.is_empty())
        .collect();

    let photos = match std::env::var("SWISH_PHOTO_STORE_URL") {
        Ok(url) => Some(PhotoStore::new(
            &url,
            std::env::var("SWISH_PHOTO_STORE_TOKEN").ok(),
        )),
        Err(_) => {
            warn!("SWISH_PHOTO_STORE_URL not set; profile photo uploads disabled");
            None
        }
    };

    // Init database
    let db = swish_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        jwt_secret,
        admin_code,
        campus,
        email_domains,
        photos,
    });

    let app = swish_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Swish server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
