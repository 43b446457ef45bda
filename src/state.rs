use snowthaw_backend::auth::TokenService;
use snowthaw_backend::config::AppConfig;
use snowthaw_backend::error::StoreError;
use snowthaw_backend::ingest::IngestionService;
use snowthaw_backend::search::SearchEngine;
use snowthaw_backend::store::StoreHandle;

/// Shared application state / 应用共享状态
///
/// Built once in main and shared read-only by every request.
#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub tokens: TokenService,
    /// Lazily connected card store / 延迟连接的卡片存储
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(config: AppConfig, tokens: TokenService, store: StoreHandle) -> Self {
        Self { config, tokens, store }
    }

    pub async fn search_engine(&self) -> Result<SearchEngine, StoreError> {
        Ok(SearchEngine::new(self.store.get().await?))
    }

    pub async fn ingestion(&self) -> Result<IngestionService, StoreError> {
        Ok(IngestionService::new(self.store.get().await?))
    }
}
