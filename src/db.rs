use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::str::FromStr;
use std::time::Duration;

use crate::error::StoreError;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the card database pool / 打开卡片数据库连接池
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    // Every connection to an in-memory database is a separate database, so
    // pin the pool to one connection that is never recycled.
    if database_url.contains(":memory:") {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect(database_url)
            .await?;
        return Ok(pool);
    }

    // 启用WAL模式，提高并发性能；连接选项对池中每个连接生效
    let options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Run database migrations / 运行数据库迁移
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), StoreError> {
    // seq keeps insertion order, id is the public identifier
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS cards (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            type TEXT NOT NULL,
            name TEXT NOT NULL,
            name_lower TEXT NOT NULL,
            story TEXT NOT NULL,
            story_lower TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cards_type ON cards(type)")
        .execute(pool)
        .await?;

    Ok(())
}
