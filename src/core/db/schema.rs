//! Database schema management.

use sqlx::SqlitePool;

/// Run all schema migrations. Safe to call on every startup.
pub async fn run_migrations(db: &SqlitePool) -> Result<(), sqlx::Error> {
    create_tables(db).await?;
    tracing::info!("Database migrations completed");
    Ok(())
}

async fn create_tables(db: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(db)
    .await?;

    Ok(())
}
