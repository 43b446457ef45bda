use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use snowthaw_backend::auth::TokenService;
use snowthaw_backend::config;
use snowthaw_backend::store::StoreHandle;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snowthaw_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config()?;
    tracing::info!("Server will listen on {}:{}", app_config.server.host, app_config.server.port);

    // Without a signing key no admin token can be issued, refuse to start
    let tokens = TokenService::from_config(&app_config.auth)?;

    // Create data directory if not exists / 创建数据目录
    if app_config.database.url.is_none() {
        let data_dir = app_config.get_data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)?;
            tracing::info!("Created data directory: {:?}", data_dir);
        }
    }

    // Connected on first request / 首次请求时连接
    let store = StoreHandle::lazy(app_config.get_database_url());

    let bind_addr = app_config.get_bind_address();
    let state = Arc::new(AppState::new(app_config, tokens, store));
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Snowthaw backend started at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
