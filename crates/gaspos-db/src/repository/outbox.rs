//! # Sync Outbox Repository
//!
//! Manages the sync outbox queue for offline-first synchronization.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  LOCAL OPERATION (commit_finalization)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. UPDATE employees SET balances ...                          │   │
//! │  │  2. INSERT INTO payroll_history ...                            │   │
//! │  │  3. INSERT INTO sync_outbox ('PAYROLL', <record JSON>)         │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← All succeed or all fail (atomicity guaranteed)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │            BACKGROUND SYNC WORKER (async)                       │   │
//! │  │                                                                 │   │
//! │  │  1. pending() ← entries with synced_at IS NULL                 │   │
//! │  │  2. For each entry:                                            │   │
//! │  │     a. Send to head-office API                                 │   │
//! │  │     b. On success: mark_synced()                               │   │
//! │  │     c. On failure: record_failure() (attempts += 1)            │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  KEY GUARANTEES:                                                       │
//! │  • The payroll run is never lost (it's in local DB)                    │
//! │  • The queue entry is never orphaned (same transaction)                │
//! │  • Offline? No problem - entries queue up                              │
//! │  • Back online? Worker syncs pending entries                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

// =============================================================================
// Outbox Entry
// =============================================================================

/// One queued entity awaiting upstream synchronization.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct OutboxEntry {
    pub id: String,
    /// Entity type: "PAYROLL", "EMPLOYEE", ...
    pub entity_type: String,
    pub entity_id: String,
    /// Full JSON serialization of the entity at queue time.
    pub payload: String,
    pub attempts: i64,
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attempted_at: Option<DateTime<Utc>>,
    pub synced_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sync outbox operations.
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: SqlitePool,
}

impl OutboxRepository {
    /// Creates a new OutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OutboxRepository { pool }
    }

    /// Queues an entity for synchronization.
    ///
    /// Standalone enqueue for operations outside the finalization
    /// transaction (e.g. employee edits); finalization inserts its own
    /// outbox row inside its transaction.
    pub async fn enqueue(
        &self,
        entity_type: &str,
        entity_id: &str,
        payload: &str,
    ) -> DbResult<OutboxEntry> {
        let entry = OutboxEntry {
            id: Uuid::new_v4().to_string(),
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            payload: payload.to_string(),
            attempts: 0,
            last_error: None,
            created_at: Utc::now(),
            attempted_at: None,
            synced_at: None,
        };

        debug!(
            entity_type = %entity_type,
            entity_id = %entity_id,
            "Queuing for sync"
        );

        sqlx::query(
            r#"
            INSERT INTO sync_outbox (
                id, entity_type, entity_id, payload,
                attempts, last_error, created_at, attempted_at, synced_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.entity_type)
        .bind(&entry.entity_id)
        .bind(&entry.payload)
        .bind(entry.attempts)
        .bind(&entry.last_error)
        .bind(entry.created_at)
        .bind(entry.attempted_at)
        .bind(entry.synced_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Lists unsynced entries, oldest first.
    pub async fn pending(&self, limit: i64) -> DbResult<Vec<OutboxEntry>> {
        let entries: Vec<OutboxEntry> = sqlx::query_as(
            r#"
            SELECT id, entity_type, entity_id, payload,
                   attempts, last_error, created_at, attempted_at, synced_at
            FROM sync_outbox
            WHERE synced_at IS NULL
            ORDER BY created_at
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as successfully synced.
    pub async fn mark_synced(&self, id: &str, synced_at: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE sync_outbox SET synced_at = ?2, attempted_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(synced_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }

        Ok(())
    }

    /// Records a failed sync attempt. The entry stays pending.
    pub async fn record_failure(
        &self,
        id: &str,
        error: &str,
        attempted_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE sync_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(attempted_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Outbox entry", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
