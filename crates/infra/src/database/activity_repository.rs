//! SQLite-backed activity repository.
//!
//! Writes are staged inside a transaction that the first write opens and
//! `save_changes` commits. Any failed write rolls the whole transaction back
//! so a later commit never publishes half of an operation. Instants are
//! stored as fixed-width RFC 3339 text so range queries compare lexically.

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use idletally_core::ActivityRepository as ActivityRepositoryPort;
use idletally_domain::{Activity, IdleTallyError, Result as DomainResult, TimeSegment};
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use super::manager::DbManager;
use crate::errors::map_sql_error;

/// Activity repository over a single SQLite connection.
pub struct SqliteActivityRepository {
    db: Arc<DbManager>,
}

impl SqliteActivityRepository {
    /// Construct a repository backed by the shared database manager.
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    /// Whether writes are staged and waiting for `save_changes`.
    pub fn has_pending_changes(&self) -> bool {
        !self.db.connection().is_autocommit()
    }

    /// Run a staged write, opening the transaction first if needed.
    fn stage<T>(&self, write: impl FnOnce(&Connection) -> DomainResult<T>) -> DomainResult<T> {
        let conn = self.db.connection();
        if conn.is_autocommit() {
            conn.execute_batch("BEGIN").map_err(map_sql_error)?;
        }
        write(&*conn).inspect_err(|err| {
            warn!(error = %err, "Staged write failed, discarding pending changes");
            rollback(&conn);
        })
    }
}

impl ActivityRepositoryPort for SqliteActivityRepository {
    fn load_activities(&self) -> DomainResult<Vec<Activity>> {
        let conn = self.db.connection();
        let mut activities = query_activities(&conn)?;
        for activity in &mut activities {
            if let Some(id) = activity.id {
                activity.time_segments = query_segments(&conn, id, None)?;
            }
        }
        debug!(count = activities.len(), "Loaded activities");
        Ok(activities)
    }

    fn load_time_segments(
        &self,
        activity_id: i64,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<TimeSegment>> {
        let conn = self.db.connection();
        query_segments(&conn, activity_id, Some((from, to)))
    }

    fn save_activity(&self, activity: &mut Activity) -> DomainResult<()> {
        self.stage(|conn| upsert_activity(conn, activity))
    }

    fn delete_activity(&self, activity: &Activity) -> DomainResult<()> {
        let id = activity
            .id
            .ok_or_else(|| IdleTallyError::NotFound("activity has never been saved".into()))?;
        self.stage(|conn| {
            conn.execute("DELETE FROM time_segments WHERE activity_id = ?1", params![id])
                .map_err(map_sql_error)?;
            let removed = conn
                .execute("DELETE FROM activities WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            if removed == 0 {
                return Err(IdleTallyError::NotFound(format!("activity {id}")));
            }
            Ok(())
        })
    }

    fn delete_time_segment(&self, segment: &TimeSegment) -> DomainResult<()> {
        let id = segment
            .id
            .ok_or_else(|| IdleTallyError::NotFound("time segment has never been saved".into()))?;
        self.stage(|conn| {
            let removed = conn
                .execute("DELETE FROM time_segments WHERE id = ?1", params![id])
                .map_err(map_sql_error)?;
            if removed == 0 {
                return Err(IdleTallyError::NotFound(format!("time segment {id}")));
            }
            Ok(())
        })
    }

    fn save_changes(&self) -> DomainResult<()> {
        let conn = self.db.connection();
        if conn.is_autocommit() {
            return Ok(());
        }
        conn.execute_batch("COMMIT").map_err(|err| {
            rollback(&conn);
            map_sql_error(err)
        })?;
        debug!("Committed staged changes");
        Ok(())
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn rollback(conn: &Connection) {
    if !conn.is_autocommit() {
        if let Err(err) = conn.execute_batch("ROLLBACK") {
            warn!(error = %err, "Rollback failed");
        }
    }
}

fn encode_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn decode_instant(column: usize, text: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text).map(|instant| instant.with_timezone(&Utc)).map_err(|err| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(err))
    })
}

fn upsert_activity(conn: &Connection, activity: &mut Activity) -> DomainResult<()> {
    let id = match activity.id {
        Some(id) => {
            conn.execute(
                "INSERT INTO activities (id, name) VALUES (?1, ?2)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                params![id, activity.name],
            )
            .map_err(map_sql_error)?;
            id
        }
        None => {
            conn.execute("INSERT INTO activities (name) VALUES (?1)", params![activity.name])
                .map_err(map_sql_error)?;
            conn.last_insert_rowid()
        }
    };
    activity.id = Some(id);

    for segment in &mut activity.time_segments {
        segment.activity_id = Some(id);
        upsert_segment(conn, id, segment)?;
    }
    Ok(())
}

fn upsert_segment(conn: &Connection, activity_id: i64, segment: &mut TimeSegment) -> DomainResult<()> {
    let start = encode_instant(segment.start_time);
    let end = encode_instant(segment.end_time);
    match segment.id {
        Some(id) => {
            conn.execute(
                "INSERT INTO time_segments (id, activity_id, start_time, end_time, is_open)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    activity_id = excluded.activity_id,
                    start_time = excluded.start_time,
                    end_time = excluded.end_time,
                    is_open = excluded.is_open",
                params![id, activity_id, start, end, segment.is_open],
            )
            .map_err(map_sql_error)?;
        }
        None => {
            conn.execute(
                "INSERT INTO time_segments (activity_id, start_time, end_time, is_open)
                 VALUES (?1, ?2, ?3, ?4)",
                params![activity_id, start, end, segment.is_open],
            )
            .map_err(map_sql_error)?;
            segment.id = Some(conn.last_insert_rowid());
        }
    }
    Ok(())
}

fn query_activities(conn: &Connection) -> DomainResult<Vec<Activity>> {
    let mut stmt = conn.prepare("SELECT id, name FROM activities ORDER BY id").map_err(map_sql_error)?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Activity { id: Some(row.get(0)?), name: row.get(1)?, time_segments: Vec::new() })
        })
        .map_err(map_sql_error)?;
    rows.collect::<rusqlite::Result<Vec<_>>>().map_err(map_sql_error)
}

fn query_segments(
    conn: &Connection,
    activity_id: i64,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
) -> DomainResult<Vec<TimeSegment>> {
    let rows = match window {
        Some((from, to)) => {
            let mut stmt = conn
                .prepare(
                    "SELECT id, activity_id, start_time, end_time, is_open FROM time_segments
                     WHERE activity_id = ?1 AND end_time >= ?2 AND start_time <= ?3
                     ORDER BY id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(
                    params![activity_id, encode_instant(from), encode_instant(to)],
                    map_segment_row,
                )
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>();
            rows
        }
        None => {
            let mut stmt = conn
                .prepare(
                    "SELECT id, activity_id, start_time, end_time, is_open FROM time_segments
                     WHERE activity_id = ?1 ORDER BY id",
                )
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![activity_id], map_segment_row)
                .map_err(map_sql_error)?
                .collect::<rusqlite::Result<Vec<_>>>();
            rows
        }
    };
    rows.map_err(map_sql_error)
}

/// Map a row to a TimeSegment
fn map_segment_row(row: &Row<'_>) -> rusqlite::Result<TimeSegment> {
    let start: String = row.get(2)?;
    let end: String = row.get(3)?;
    Ok(TimeSegment {
        id: Some(row.get(0)?),
        activity_id: Some(row.get(1)?),
        start_time: decode_instant(2, &start)?,
        end_time: decode_instant(3, &end)?,
        is_open: row.get(4)?,
    })
}
