//! Usage ledger repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide create-or-increment, lookup, listing and deletion over
//!   `app_stats`.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - `record_launch` is one upsert statement; the row is created with
//!   `launch_count = 1` or incremented, never both.
//! - `created_at` is written once and preserved on later launches.
//! - Listing order follows `idx_frecency`: `last_launch DESC,
//!   launch_count DESC`, then `app_id ASC` for determinism.

use crate::db::DbError;
use crate::model::usage::UsageRecord;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USAGE_SELECT_SQL: &str = "SELECT
    app_id,
    launch_count,
    last_launch,
    created_at
FROM app_stats";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for usage persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted usage data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the usage ledger.
pub trait UsageRepository {
    /// Creates the record with one launch or increments it, stamping
    /// `last_launch_time = now_epoch_secs`. Returns the resulting record.
    fn record_launch(&self, item_id: &str, now_epoch_secs: i64) -> RepoResult<UsageRecord>;
    fn get_record(&self, item_id: &str) -> RepoResult<Option<UsageRecord>>;
    /// Lists records with `launch_count >= min_launches`.
    fn list_records(&self, min_launches: u64) -> RepoResult<Vec<UsageRecord>>;
    /// Returns whether a record was deleted.
    fn delete_record(&self, item_id: &str) -> RepoResult<bool>;
    /// Returns the number of deleted records.
    fn delete_all(&self) -> RepoResult<usize>;
    fn total_launches(&self) -> RepoResult<u64>;
}

/// SQLite-backed usage repository.
pub struct SqliteUsageRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUsageRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl UsageRepository for SqliteUsageRepository<'_> {
    fn record_launch(&self, item_id: &str, now_epoch_secs: i64) -> RepoResult<UsageRecord> {
        let mut stmt = self.conn.prepare_cached(
            "INSERT INTO app_stats (app_id, launch_count, last_launch, created_at)
             VALUES (?1, 1, ?2, ?2)
             ON CONFLICT(app_id) DO UPDATE SET
                launch_count = launch_count + 1,
                last_launch = excluded.last_launch
             RETURNING app_id, launch_count, last_launch, created_at;",
        )?;
        let mut rows = stmt.query(params![item_id, now_epoch_secs])?;
        match rows.next()? {
            Some(row) => parse_usage_row(row),
            None => Err(RepoError::InvalidData(format!(
                "upsert for `{item_id}` returned no row"
            ))),
        }
    }

    fn get_record(&self, item_id: &str) -> RepoResult<Option<UsageRecord>> {
        let mut stmt = self
            .conn
            .prepare_cached(&format!("{USAGE_SELECT_SQL} WHERE app_id = ?1;"))?;
        let row = stmt
            .query_row([item_id], |row| {
                Ok((
                    row.get::<_, String>("app_id")?,
                    row.get::<_, i64>("launch_count")?,
                    row.get::<_, i64>("last_launch")?,
                    row.get::<_, i64>("created_at")?,
                ))
            })
            .optional()?;

        row.map(|(item_id, count, last, created)| build_record(item_id, count, last, created))
            .transpose()
    }

    fn list_records(&self, min_launches: u64) -> RepoResult<Vec<UsageRecord>> {
        let min_launches = i64::try_from(min_launches).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare_cached(&format!(
            "{USAGE_SELECT_SQL}
             WHERE launch_count >= ?1
             ORDER BY last_launch DESC, launch_count DESC, app_id ASC;"
        ))?;
        let mut rows = stmt.query([min_launches])?;
        let mut records = Vec::new();

        while let Some(row) = rows.next()? {
            records.push(parse_usage_row(row)?);
        }

        Ok(records)
    }

    fn delete_record(&self, item_id: &str) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM app_stats WHERE app_id = ?1;", [item_id])?;
        Ok(changed > 0)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        let changed = self.conn.execute("DELETE FROM app_stats;", [])?;
        Ok(changed)
    }

    fn total_launches(&self) -> RepoResult<u64> {
        let total: Option<i64> =
            self.conn
                .query_row("SELECT SUM(launch_count) FROM app_stats;", [], |row| {
                    row.get(0)
                })?;
        let total = total.unwrap_or(0);
        u64::try_from(total)
            .map_err(|_| RepoError::InvalidData(format!("negative launch total `{total}`")))
    }
}

fn parse_usage_row(row: &Row<'_>) -> RepoResult<UsageRecord> {
    build_record(
        row.get("app_id")?,
        row.get("launch_count")?,
        row.get("last_launch")?,
        row.get("created_at")?,
    )
}

fn build_record(
    item_id: String,
    launch_count: i64,
    last_launch_time: i64,
    created_at: i64,
) -> RepoResult<UsageRecord> {
    let launch_count = u64::try_from(launch_count)
        .ok()
        .filter(|count| *count >= 1)
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid launch_count `{launch_count}` for `{item_id}` in app_stats.launch_count"
            ))
        })?;

    Ok(UsageRecord {
        item_id,
        launch_count,
        last_launch_time,
        created_at,
    })
}
