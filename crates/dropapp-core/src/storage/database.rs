//! SQLite-based drink log and application state.
//!
//! Provides persistent storage for:
//! - Acknowledged drinks and their alert response times
//! - Key-value state (the serialized engine, the pending reminder)

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::DatabaseError;

/// One acknowledged drink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrinkRecord {
    pub id: i64,
    /// Reminder interval that was active when the drink was logged.
    pub interval_ms: u64,
    /// Time spent alerting before the acknowledge. `None` when the user
    /// drank before the alert fired.
    pub response_ms: Option<u64>,
    pub logged_at: DateTime<Utc>,
}

/// Aggregated drink statistics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_drinks: u64,
    pub today_drinks: u64,
    /// Average response time across drinks acknowledged while alerting.
    pub avg_response_ms: Option<u64>,
    pub last_drink_at: Option<DateTime<Utc>>,
}

/// SQLite database for the drink log and kv state.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `<data_dir>/dropapp.db` and run
    /// migrations.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()
            .map_err(|e| DatabaseError::DataDir(e.to_string()))?
            .join("dropapp.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database. Used by tests.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS drinks (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                interval_ms INTEGER NOT NULL,
                response_ms INTEGER,
                logged_at   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            -- Index for the day-boundary stats queries
            CREATE INDEX IF NOT EXISTS idx_drinks_logged_at ON drinks(logged_at);",
        )?;
        Ok(())
    }

    // ── Drink log ────────────────────────────────────────────────────────

    /// Record an acknowledged drink. Returns the row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_drink(
        &self,
        interval_ms: u64,
        response_ms: Option<u64>,
        logged_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        self.conn.execute(
            "INSERT INTO drinks (interval_ms, response_ms, logged_at) VALUES (?1, ?2, ?3)",
            params![interval_ms, response_ms, logged_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Stats restricted to drinks logged today (UTC).
    pub fn stats_today(&self) -> Result<Stats, DatabaseError> {
        let cutoff = today_cutoff();
        let (count, avg, last) = self.drink_aggregate(Some(&cutoff))?;
        Ok(Stats {
            total_drinks: count,
            today_drinks: count,
            avg_response_ms: avg,
            last_drink_at: last,
        })
    }

    /// All-time stats, with today's count alongside.
    pub fn stats_all(&self) -> Result<Stats, DatabaseError> {
        let (count, avg, last) = self.drink_aggregate(None)?;
        let cutoff = today_cutoff();
        let (today, _, _) = self.drink_aggregate(Some(&cutoff))?;
        Ok(Stats {
            total_drinks: count,
            today_drinks: today,
            avg_response_ms: avg,
            last_drink_at: last,
        })
    }

    /// Most recent drinks, newest first.
    pub fn recent_drinks(&self, limit: u32) -> Result<Vec<DrinkRecord>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, interval_ms, response_ms, logged_at
             FROM drinks ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, u64>(1)?,
                row.get::<_, Option<u64>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, interval_ms, response_ms, logged_at) = row?;
            let logged_at = DateTime::parse_from_rfc3339(&logged_at)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                .with_timezone(&Utc);
            records.push(DrinkRecord {
                id,
                interval_ms,
                response_ms,
                logged_at,
            });
        }
        Ok(records)
    }

    fn drink_aggregate(
        &self,
        since: Option<&str>,
    ) -> Result<(u64, Option<u64>, Option<DateTime<Utc>>), DatabaseError> {
        // AVG skips NULL response times on its own.
        let sql = match since {
            Some(_) => {
                "SELECT COUNT(*), AVG(response_ms), MAX(logged_at)
                 FROM drinks WHERE logged_at >= ?1"
            }
            None => "SELECT COUNT(*), AVG(response_ms), MAX(logged_at) FROM drinks",
        };
        let mut stmt = self.conn.prepare(sql)?;
        let read_row = |row: &rusqlite::Row<'_>| {
            Ok((
                row.get::<_, u64>(0)?,
                row.get::<_, Option<f64>>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        };
        let (count, avg, last) = match since {
            Some(cutoff) => stmt.query_row(params![cutoff], read_row)?,
            None => stmt.query_row([], read_row)?,
        };
        let last_drink_at = last
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));
        Ok((count, avg.map(|a| a.round() as u64), last_drink_at))
    }

    // ── Key-value state ──────────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Start of the current UTC day, in the rfc3339 shape `logged_at` uses.
fn today_cutoff() -> String {
    format!("{}T00:00:00+00:00", Utc::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_aggregate() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_drink(3_600_000, Some(4_000), now).unwrap();
        db.record_drink(3_600_000, Some(2_000), now).unwrap();
        db.record_drink(3_600_000, None, now).unwrap();

        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_drinks, 3);
        assert_eq!(stats.today_drinks, 3);
        // NULL response times stay out of the average.
        assert_eq!(stats.avg_response_ms, Some(3_000));
        assert!(stats.last_drink_at.is_some());
    }

    #[test]
    fn stats_on_empty_log() {
        let db = Database::open_memory().unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_drinks, 0);
        assert_eq!(stats.today_drinks, 0);
        assert_eq!(stats.avg_response_ms, None);
        assert!(stats.last_drink_at.is_none());
    }

    #[test]
    fn stats_today_excludes_older_drinks() {
        let db = Database::open_memory().unwrap();
        let yesterday = Utc::now() - chrono::Duration::days(1);
        db.record_drink(3_600_000, Some(9_000), yesterday).unwrap();
        db.record_drink(3_600_000, Some(1_000), Utc::now()).unwrap();

        let today = db.stats_today().unwrap();
        assert_eq!(today.total_drinks, 1);
        assert_eq!(today.avg_response_ms, Some(1_000));

        let all = db.stats_all().unwrap();
        assert_eq!(all.total_drinks, 2);
        assert_eq!(all.today_drinks, 1);
        assert_eq!(all.avg_response_ms, Some(5_000));
    }

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
        db.kv_set("test", "replaced").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "replaced");
    }

    #[test]
    fn recent_drinks_newest_first() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_drink(60_000, None, now).unwrap();
        db.record_drink(60_000, Some(1_000), now).unwrap();

        let recent = db.recent_drinks(10).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].response_ms, Some(1_000));
        assert_eq!(recent[1].response_ms, None);

        let capped = db.recent_drinks(1).unwrap();
        assert_eq!(capped.len(), 1);
    }
}
