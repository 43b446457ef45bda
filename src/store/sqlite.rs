//! SQLite card store / SQLite卡片存储
//!
//! Lower-cased copies of name and story are stored next to the originals and
//! matched with `instr()`, so the needle is always a literal string.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::{fold_case, CardFilter, CardStore};
use crate::error::StoreError;
use crate::models::{Card, CardDraft};

const SELECT_CARD: &str = "SELECT id, type AS card_type, name, story, created_at FROM cards";

#[derive(Debug, sqlx::FromRow)]
struct CardRow {
    id: String,
    card_type: String,
    name: String,
    story: String,
    created_at: String,
}

impl TryFrom<CardRow> for Card {
    type Error = StoreError;

    fn try_from(row: CardRow) -> Result<Self, Self::Error> {
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StoreError::Corrupt {
                id: row.id.clone(),
                reason: format!("bad created_at {:?}: {}", row.created_at, e),
            })?
            .with_timezone(&Utc);
        Ok(Card {
            id: row.id,
            card_type: row.card_type,
            name: row.name,
            story: row.story,
            created_at,
        })
    }
}

/// sqlx-backed `CardStore`
#[derive(Debug, Clone)]
pub struct SqliteCardStore {
    pool: SqlitePool,
}

impl SqliteCardStore {
    /// Wrap a pool whose schema is already migrated / 使用已迁移的连接池
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn insert_draft<'e, E>(executor: E, draft: &CardDraft) -> Result<String, StoreError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        "INSERT INTO cards (id, type, name, name_lower, story, story_lower, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id.clone())
    .bind(draft.card_type.clone())
    .bind(draft.name.clone())
    .bind(fold_case(&draft.name))
    .bind(draft.story.clone())
    .bind(fold_case(&draft.story))
    .bind(draft.created_at.to_rfc3339())
    .execute(executor)
    .await?;
    Ok(id)
}

#[async_trait]
impl CardStore for SqliteCardStore {
    async fn insert_one(&self, draft: &CardDraft) -> Result<String, StoreError> {
        insert_draft(&self.pool, draft).await
    }

    async fn insert_many(&self, drafts: &[CardDraft]) -> Result<Vec<String>, StoreError> {
        if drafts.is_empty() {
            return Ok(Vec::new());
        }

        // 单个事务：要么全部写入，要么全部回滚
        let mut tx = self.pool.begin().await?;
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            ids.push(insert_draft(&mut *tx, draft).await?);
        }
        tx.commit().await?;

        tracing::debug!("Inserted {} cards in one transaction", ids.len());
        Ok(ids)
    }

    async fn find(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(SELECT_CARD);
        qb.push(" WHERE (instr(name_lower, ");
        qb.push_bind(filter.needle.clone());
        qb.push(") > 0 OR instr(story_lower, ");
        qb.push_bind(filter.needle.clone());
        qb.push(") > 0)");

        if let Some(types) = filter.types.as_ref().filter(|t| !t.is_empty()) {
            qb.push(" AND type IN (");
            let mut separated = qb.separated(", ");
            for card_type in types {
                separated.push_bind(card_type.clone());
            }
            separated.push_unseparated(")");
        }

        qb.push(" ORDER BY seq ASC LIMIT ");
        qb.push_bind(i64::try_from(filter.limit).unwrap_or(i64::MAX));

        let rows: Vec<CardRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(Card::try_from).collect()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Card>, StoreError> {
        let row: Option<CardRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_CARD))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Card::try_from).transpose()
    }
}
