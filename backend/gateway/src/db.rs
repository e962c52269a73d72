//! Database layer — migrations, queries, and cursor management.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::errors::Result;
use crate::events::{EventRecord, IndexedEvent};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };

    // Every connection to `:memory:` opens its own database.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let options = SqliteConnectOptions::from_str(&url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Next journal sequence number to index for `run_id`; `0` when the run
/// has not indexed anything yet.
pub async fn get_cursor(pool: &SqlitePool, run_id: &str) -> Result<u64> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT next_seq FROM indexer_cursor WHERE run_id = ?1")
            .bind(run_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(v,)| v.max(0) as u64).unwrap_or(0))
}

/// Persist the next journal sequence number to index for `run_id`.
pub async fn save_cursor(pool: &SqlitePool, run_id: &str, next_seq: u64) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO indexer_cursor (run_id, next_seq) VALUES (?1, ?2)
        ON CONFLICT (run_id) DO UPDATE SET next_seq = excluded.next_seq
        "#,
    )
    .bind(run_id)
    .bind(next_seq as i64)
    .execute(pool)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of indexed events.  Events that share the same
/// `(run_id, seq)` pair are silently ignored to make indexing idempotent.
pub async fn insert_events(
    pool: &SqlitePool,
    run_id: &str,
    events: &[IndexedEvent],
) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (run_id, seq, op_id, event_type, campaign_id, actor, amount, reward, timestamp, payload)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(run_id)
        .bind(ev.seq)
        .bind(ev.op_id)
        .bind(&ev.event_type)
        .bind(&ev.campaign_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.reward)
        .bind(ev.timestamp)
        .bind(&ev.payload)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given campaign, oldest first.
pub async fn get_events_for_campaign(
    pool: &SqlitePool,
    campaign_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, run_id, seq, op_id, event_type, campaign_id, actor, amount, reward,
               timestamp, payload, created_at
        FROM   events
        WHERE  campaign_id = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(campaign_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, oldest first, optionally restricted to one event type.
pub async fn get_all_events(
    pool: &SqlitePool,
    event_type: Option<&str>,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, run_id, seq, op_id, event_type, campaign_id, actor, amount, reward,
               timestamp, payload, created_at
        FROM   events
        WHERE  ?1 IS NULL OR event_type = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(event_type)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
