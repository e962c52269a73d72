//! Long-running background task that pages through the engine's event
//! journal and writes indexed events to the database.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::events::IndexedEvent;
use crate::Engine;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub engine: Arc<Engine>,
    /// Identifies this process's journal in the database.
    pub run_id: String,
}

/// Run the indexer loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!("Indexer starting — run: {}", state.run_id);

    let mut cursor = db::get_cursor(&state.pool, &state.run_id)
        .await
        .unwrap_or(0);
    info!("Resuming from journal seq {cursor}");

    let interval = Duration::from_secs(state.config.poll_interval_secs);
    loop {
        match poll_once(&state, cursor).await {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }

    // Drain whatever was journaled before shutdown.
    while let Ok(next) = poll_once(&state, cursor).await {
        if next == cursor {
            break;
        }
        cursor = next;
    }
    info!("Indexer stopped at journal seq {cursor}");
}

/// Index one page of journal entries starting at `cursor`.
///
/// Returns the next cursor.
pub async fn poll_once(state: &IndexerState, cursor: u64) -> Result<u64> {
    let entries = state
        .engine
        .events_from(cursor, state.config.events_per_page as usize);
    if entries.is_empty() {
        return Ok(cursor);
    }

    let decoded = entries
        .iter()
        .map(IndexedEvent::from_entry)
        .collect::<Result<Vec<_>>>()?;
    let inserted = db::insert_events(&state.pool, &state.run_id, &decoded).await?;

    let next = cursor + entries.len() as u64;
    db::save_cursor(&state.pool, &state.run_id, next).await?;
    debug!(
        "Indexed {} journal entries → {} new records (next seq {next})",
        entries.len(),
        inserted
    );
    Ok(next)
}
