//! Storefront Dev Server
//!
//! Axum-based backend serving the plan catalog and payment endpoints the
//! checkout flow depends on.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_server::{router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    if config.test_mode {
        tracing::warn!("⚠ Test mode enabled - payments settle without a gateway");
    }

    let app = router(AppState::new(config));

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("🚀 storefront server running on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health               - Health check");
    tracing::info!("  GET  /api/plans            - Plans for a vertical");
    tracing::info!("  POST /api/payment/order    - Create gateway order");
    tracing::info!("  POST /api/payment/verify   - Verify payment signature");
    tracing::info!("  POST /api/payment/simulate - Settle a test-mode order");
    tracing::info!("  GET  /api/storefront       - Tenant subscription");
    tracing::info!("  GET  /api/user             - Signed-in user");

    axum::serve(listener, app).await?;

    Ok(())
}
