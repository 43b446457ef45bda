//! Card persistence / 卡片存储
//!
//! `CardStore` is the seam to the document store; `StoreHandle` owns the one
//! process-wide store connection, created on first use.

pub mod sqlite;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::db;
use crate::error::StoreError;
use crate::models::{Card, CardDraft};

pub use sqlite::SqliteCardStore;

/// Fold case one char at a time, the same way the snippet matcher compares
/// characters. `str::to_lowercase` would map a word-final Σ to ς instead.
pub fn fold_case(text: &str) -> String {
    text.chars().flat_map(char::to_lowercase).collect()
}

/// Find filter: literal case-insensitive substring over name OR story,
/// optionally restricted to a set of card types / 查询条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardFilter {
    /// Lower-cased needle / 小写关键词
    pub needle: String,
    pub types: Option<Vec<String>>,
    pub limit: usize,
}

impl CardFilter {
    pub const DEFAULT_LIMIT: usize = 50;

    pub fn containing(query: &str) -> Self {
        Self {
            needle: fold_case(query),
            types: None,
            limit: Self::DEFAULT_LIMIT,
        }
    }

    pub fn types(mut self, types: Option<Vec<String>>) -> Self {
        self.types = types.filter(|t| !t.is_empty());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Document store collaborator / 文档存储接口
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Persist one card and return its new id
    async fn insert_one(&self, draft: &CardDraft) -> Result<String, StoreError>;

    /// Persist all cards atomically; ids are returned in input order
    async fn insert_many(&self, drafts: &[CardDraft]) -> Result<Vec<String>, StoreError>;

    /// Matching cards in insertion order, at most `filter.limit`
    async fn find(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Card>, StoreError>;
}

/// Process-wide store handle / 全局存储句柄
///
/// Connects on the first `get()`; concurrent first calls wait on the same
/// initialization. A failed connection is not cached, the next call tries
/// again. After that the store is shared read-only.
pub struct StoreHandle {
    database_url: String,
    cell: OnceCell<Arc<dyn CardStore>>,
}

impl StoreHandle {
    /// Handle that connects to `database_url` on first use / 延迟连接
    pub fn lazy(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            cell: OnceCell::new(),
        }
    }

    /// Handle around an already constructed store / 使用现有存储
    pub fn ready(store: Arc<dyn CardStore>) -> Self {
        Self {
            database_url: String::new(),
            cell: OnceCell::new_with(Some(store)),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn CardStore>, StoreError> {
        let store = self
            .cell
            .get_or_try_init(|| async {
                let pool = db::connect(&self.database_url).await?;
                db::run_migrations(&pool).await?;
                tracing::info!("Card store initialized");
                Ok::<Arc<dyn CardStore>, StoreError>(Arc::new(SqliteCardStore::new(pool)))
            })
            .await?;
        Ok(Arc::clone(store))
    }
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_fold_case_is_per_char() {
        assert_eq!(fold_case("ΟΔΟΣ"), "οδοσ");
        assert_eq!(fold_case("ΟΔΟΣΑ"), "οδοσα");
        assert_eq!(fold_case("Snow 雪"), "snow 雪");
        assert_eq!(CardFilter::containing("ΟΔΟΣ").needle, "οδοσ");
    }

    #[test]
    fn test_filter_builder() {
        let filter = CardFilter::containing("SNOW").types(Some(vec![])).limit(10);
        assert_eq!(filter.needle, "snow");
        assert_eq!(filter.types, None);
        assert_eq!(filter.limit, 10);

        let filter = CardFilter::containing("x").types(Some(vec!["a".to_string()]));
        assert_eq!(filter.types, Some(vec!["a".to_string()]));
        assert_eq!(filter.limit, CardFilter::DEFAULT_LIMIT);
    }

    #[tokio::test]
    async fn test_lazy_handle_initializes_once() {
        let handle = Arc::new(StoreHandle::lazy("sqlite::memory:"));
        assert!(!handle.is_initialized());

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let handle = Arc::clone(&handle);
                tokio::spawn(async move { handle.get().await.map(|_| ()) })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }
        assert!(handle.is_initialized());

        // All callers share one store, so a write is visible through any clone
        let first = handle.get().await.unwrap();
        first
            .insert_one(&CardDraft::new("Alice", "remembers the snow", Utc::now()))
            .await
            .unwrap();
        let second = handle.get().await.unwrap();
        assert_eq!(second.find(&CardFilter::containing("snow")).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_initialization_is_not_cached() {
        let handle = StoreHandle::lazy("sqlite:/nonexistent-dir/for/sure/cards.db");
        assert!(handle.get().await.is_err());
        assert!(!handle.is_initialized());
    }

    #[tokio::test]
    async fn test_ready_handle_skips_connect() {
        let pool = db::connect("sqlite::memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let store: Arc<dyn CardStore> = Arc::new(SqliteCardStore::new(pool));

        let handle = StoreHandle::ready(Arc::clone(&store));
        assert!(handle.is_initialized());
        assert!(Arc::ptr_eq(&handle.get().await.unwrap(), &store));
    }
}
