// src/main.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tower_http::cors::CorsLayer;
use tracing::info;

use vedic_signs::chart::ChartAssembler;
use vedic_signs::ephemeris::EphemerisAdapter;
use vedic_signs::routes::{self, AppState};
use vedic_signs::swisseph::SwissEph;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vedic_signs=info,tower_http=info".into()),
        )
        .init();

    let ephe_path = std::env::var("SE_EPHE_PATH").ok().map(PathBuf::from);
    let backend = SwissEph::new(ephe_path.as_deref())
        .context("failed to initialize the Swiss Ephemeris")?;
    let assembler = ChartAssembler::new(EphemerisAdapter::new(Box::new(backend)));
    let state = Arc::new(AppState { assembler });

    let app = routes::router()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind = std::env::var("VEDIC_SIGNS_BIND").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
        format!("0.0.0.0:{}", port)
    });
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    info!("vedic-signs listening on {}", bind);
    axum::serve(listener, app).await?;
    Ok(())
}
