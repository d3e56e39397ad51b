use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{CandidateQuery, Match, MatchStatus, MatchingStatus, User};
use crate::services::store::{LedgerTx, MatchStore, StoreError};

const USER_COLUMNS: &str = "id, name, mbti, gender, matching_status";
const MATCH_COLUMNS: &str = "id, requester_id, responder_id, status, created_at";

/// PostgreSQL-backed store for users and match records
///
/// The `users` table belongs to the wider application; this store reads it
/// and only ever writes `matching_status`. The `matches` table is owned here.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new store from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    Ok(User {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        personality_type: row.try_get("mbti")?,
        gender: row.try_get("gender")?,
        matching_status: row.try_get("matching_status")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    Ok(Match {
        id: row.try_get("id")?,
        requester_id: row.try_get("requester_id")?,
        responder_id: row.try_get("responder_id")?,
        status: row.try_get("status")?,
        created_at: row.try_get("created_at")?,
    })
}

impl MatchStore for PostgresStore {
    type Tx = PgLedgerTx;

    async fn begin(&self) -> Result<Self::Tx, StoreError> {
        Ok(PgLedgerTx {
            tx: self.pool.begin().await?,
        })
    }

    async fn get_user(&self, user_id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// Compatible tier first, random within each tier
    async fn query_candidates(&self, query: &CandidateQuery) -> Result<Vec<User>, StoreError> {
        let sql = format!(
            r#"
            SELECT {}
            FROM users
            WHERE matching_status = $1
              AND gender <> $2
              AND id <> $3
            ORDER BY CASE WHEN mbti = ANY($4) THEN 1 ELSE 2 END, random()
            LIMIT $5
            "#,
            USER_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(MatchingStatus::None)
            .bind(query.requester_gender)
            .bind(query.requester_id)
            .bind(&query.compatible_types)
            .bind(query.limit as i64)
            .fetch_all(&self.pool)
            .await?;

        tracing::debug!(
            "Candidate query for user {} returned {} rows",
            query.requester_id,
            rows.len()
        );

        rows.iter().map(user_from_row).collect()
    }

    async fn latest_match_for(&self, user_id: i64) -> Result<Option<Match>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM matches
            WHERE (requester_id = $1 OR responder_id = $1)
              AND status IN ('waiting', 'accept', 'reject')
            ORDER BY created_at DESC
            LIMIT 1
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// A single database transaction; rolls back on drop unless committed
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

impl LedgerTx for PgLedgerTx {
    async fn lock_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1 FOR UPDATE", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn get_user(&mut self, user_id: i64) -> Result<Option<User>, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    /// The `status` predicate is re-checked after the row lock is granted,
    /// so a concurrent responder that already resolved the match wins.
    async fn lock_pending_match(
        &mut self,
        requester_id: i64,
        responder_id: i64,
    ) -> Result<Option<Match>, StoreError> {
        let query = format!(
            r#"
            SELECT {}
            FROM matches
            WHERE requester_id = $1
              AND responder_id = $2
              AND status = $3
            ORDER BY created_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(requester_id)
            .bind(responder_id)
            .bind(MatchStatus::Waiting)
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(match_from_row).transpose()
    }

    async fn insert_match(&mut self, record: &Match) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO matches (id, requester_id, responder_id, status, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(record.id)
            .bind(record.requester_id)
            .bind(record.responder_id)
            .bind(record.status)
            .bind(record.created_at)
            .execute(&mut *self.tx)
            .await?;

        Ok(())
    }

    async fn set_match_status(&mut self, match_id: Uuid, status: MatchStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE matches SET status = $2 WHERE id = $1")
            .bind(match_id)
            .bind(status)
            .execute(&mut *self.tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Corrupt(format!("match {} vanished", match_id)));
        }

        Ok(())
    }

    async fn set_matching_status(
        &mut self,
        user_ids: &[i64],
        status: MatchingStatus,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE users SET matching_status = $2 WHERE id = ANY($1)")
            .bind(user_ids)
            .bind(status)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(Into::into)
    }
}
