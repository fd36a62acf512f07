use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use order_backend::{
    AppState,
    config::Config,
    order_number::RpcSequenceSource,
    rate_limit::{RateLimiters, SystemClock, spawn_sweeper},
    router::build_router,
};
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env()?;

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let sequence = RpcSequenceSource::from_config(&config)?;
    tracing::info!("Order sequence endpoint: {}", sequence.endpoint());

    // 设置限流器
    let limiters = Arc::new(RateLimiters::new(config.rate_limit_max_keys));
    let _sweeper = spawn_sweeper(limiters.clone(), config.rate_limit_sweep_interval());

    let state = AppState {
        config: config.clone(),
        limiters,
        sequence: Arc::new(sequence),
        clock: Arc::new(SystemClock),
    };

    let router = build_router(state);

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = router.layer(CorsLayer::permissive());

    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr).await?,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
