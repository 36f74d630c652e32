use crate::error::{GstatsError, Result};
use crate::model::{DailyRecord, SCHEMA_VERSION};
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::Path;

/// Local cache of fetched calendars and language bytes, so repeated runs
/// and `--offline` rendering do not re-hit the API.
pub struct Cache {
    conn: Connection,
}

impl Cache {
    pub fn new<P: AsRef<Path>>(cache_path: Option<P>) -> Result<Self> {
        let cache_dir = match cache_path {
            Some(path) => path.as_ref().to_path_buf(),
            None => crate::util::default_cache_dir(),
        };
        std::fs::create_dir_all(&cache_dir)?;
        let db_path = cache_dir.join("cache.db");
        let conn = Connection::open(&db_path)?;
        let mut cache = Self { conn };
        cache.initialize()?;
        Ok(cache)
    }

    fn initialize(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS calendars (
                username TEXT PRIMARY KEY,
                total_contributions INTEGER NOT NULL,
                fetched_at INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS days (
                username TEXT NOT NULL,
                date TEXT NOT NULL,
                count INTEGER NOT NULL,
                PRIMARY KEY (username, date)
            );
            CREATE TABLE IF NOT EXISTS languages (
                username TEXT NOT NULL,
                language TEXT NOT NULL,
                bytes INTEGER NOT NULL,
                PRIMARY KEY (username, language)
            );
            CREATE INDEX IF NOT EXISTS idx_days_username ON days(username);
            ",
        )?;
        self.check_schema_version()?;
        Ok(())
    }

    fn check_schema_version(&mut self) -> Result<()> {
        let user_version: i64 = self
            .conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))?;

        if user_version == 0 {
            let set_stmt = format!("PRAGMA user_version = {SCHEMA_VERSION};");
            self.conn.execute_batch(&set_stmt)?;
        } else if user_version != SCHEMA_VERSION as i64 {
            return Err(GstatsError::Cache(format!(
                "Schema version mismatch: expected {}, found {}",
                SCHEMA_VERSION, user_version
            )));
        }

        Ok(())
    }

    pub fn store_calendar(
        &mut self,
        username: &str,
        total_contributions: u64,
        history: &[DailyRecord],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT OR REPLACE INTO calendars (username, total_contributions, fetched_at)
             VALUES (?, ?, ?)",
            params![
                username,
                total_contributions as i64,
                chrono::Utc::now().timestamp()
            ],
        )?;
        tx.execute("DELETE FROM days WHERE username = ?", params![username])?;
        {
            let mut insert_day_stmt = tx.prepare(
                "INSERT INTO days (username, date, count) VALUES (?, ?, ?)",
            )?;
            for record in history {
                insert_day_stmt.execute(params![
                    username,
                    record.date.format("%Y-%m-%d").to_string(),
                    record.contribution_count
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_calendar(&self, username: &str) -> Result<Option<(u64, Vec<DailyRecord>)>> {
        let total = match self.conn.query_row(
            "SELECT total_contributions FROM calendars WHERE username = ?",
            params![username],
            |row| row.get::<_, i64>(0),
        ) {
            Ok(total) => total as u64,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = self
            .conn
            .prepare("SELECT date, count FROM days WHERE username = ? ORDER BY date")?;
        let rows = stmt.query_map(params![username], |row| {
            let date_str: String = row.get(0)?;
            let count: u32 = row.get(1)?;
            Ok((date_str, count))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (date_str, contribution_count) = row?;
            let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|e| {
                GstatsError::InvalidDate(format!("cached date '{date_str}': {e}"))
            })?;
            history.push(DailyRecord {
                date,
                contribution_count,
            });
        }

        Ok(Some((total, history)))
    }

    pub fn store_languages(
        &mut self,
        username: &str,
        bytes: &HashMap<String, u64>,
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM languages WHERE username = ?",
            params![username],
        )?;
        {
            let mut insert_lang_stmt = tx.prepare(
                "INSERT INTO languages (username, language, bytes) VALUES (?, ?, ?)",
            )?;
            for (language, &count) in bytes {
                insert_lang_stmt.execute(params![username, language, count as i64])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn get_languages(&self, username: &str) -> Result<Option<HashMap<String, u64>>> {
        let mut stmt = self
            .conn
            .prepare("SELECT language, bytes FROM languages WHERE username = ?")?;
        let rows = stmt.query_map(params![username], |row| {
            let language: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((language, count as u64))
        })?;

        let mut bytes = HashMap::new();
        for row in rows {
            let (language, count) = row?;
            bytes.insert(language, count);
        }

        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bytes))
        }
    }
}
