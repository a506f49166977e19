use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use civicwatch::router::init_router;
use civicwatch::state::init_app_state;
use civicwatch_config::ServerConfig;
use civicwatch_observability::{
    init_basic_console_logging, init_metrics, init_tracing, is_observability_enabled, metrics_app,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    if is_observability_enabled() {
        init_tracing()?;
    } else {
        init_basic_console_logging();
    }

    let state = init_app_state().await?;
    let mut app = init_router(state);

    if let Some(handle) = init_metrics()? {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(server_config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", server_config.bind_address()))?;

    info!(address = %server_config.bind_address(), "Server running");
    println!("🚀 Server running on http://{}", server_config.bind_address());
    println!("📚 Swagger UI available at http://{}/swagger-ui", server_config.bind_address());
    println!("📖 Scalar UI available at http://{}/scalar", server_config.bind_address());

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
