use std::sync::Arc;

use gateway_service::config::ConfigSource;
use gateway_service::config::LayeredConfigSource;
use gateway_service::gateway::Gateway;
use gateway_service::inbound::http::router::create_router;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gateway_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "gateway-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config_source: Arc<dyn ConfigSource> = Arc::new(LayeredConfigSource);
    let config = config_source.load()?;

    tracing::info!(
        http_port = config.server.http_port,
        routes = config.routes.len(),
        accounts = config.accounts.len(),
        current_key = %config.jwt.current_key.id,
        token_ttl_minutes = config.jwt.token_ttl_minutes,
        "Configuration loaded"
    );

    let gateway = Arc::new(Gateway::build(&config, Arc::clone(&config_source))?);

    // Start cleanup task for expired cached principals
    let cache_ttl = config.resolver_settings().cache_ttl;
    if !cache_ttl.is_zero() {
        let resolver = Arc::clone(gateway.pipeline().resolver());
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cache_ttl);
            loop {
                interval.tick().await;
                resolver.purge_expired();
            }
        });
        tracing::info!(
            interval_secs = cache_ttl.as_secs(),
            "Principal cache cleanup task started"
        );
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(gateway);

    match axum::serve(http_listener, http_application).await {
        Ok(()) => tracing::info!("Server exited successfully"),
        Err(e) => tracing::error!(error = %e, "Server error"),
    };

    Ok(())
}
