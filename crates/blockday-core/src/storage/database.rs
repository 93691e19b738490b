//! SQLite-backed persistence.
//!
//! Provides persistent storage for:
//! - Day schedules, one JSON record per date
//! - The carry-over offer slot and the resolved-dates ledger
//! - Progression counters and the XP transaction ledger
//! - Key-value store for application state

use chrono::{Datelike, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;

use super::data_dir;
use super::migrations;
use crate::carry_over::{CarryOverOffer, CarryOverResolution, OfferStore};
use crate::clock::week_start;
use crate::error::{CoreError, DatabaseError, Result};
use crate::progression::{ProgressCounters, ProgressStore, XpSink};
use crate::schedule::{BlockStatus, DaySchedule, ScheduleStore};

const OFFER_KEY: &str = "carry_over.offer";
const PROGRESS_KEY: &str = "progress";

/// SQLite database behind every store trait.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/blockday/blockday.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("blockday.db");
        Self::open_at(&path)
    }

    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: ":memory:".into(),
            source,
        })?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get::<_, String>(0))
            .optional()?;
        Ok(value)
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    fn kv_get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.kv_get(key)? {
            Some(raw) => decode(key, &raw).map(Some),
            None => Ok(None),
        }
    }

    fn kv_set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.kv_set(key, &serde_json::to_string(value)?)
    }

    /// Hours of completed work per weekday, Monday first, for the week
    /// containing `date`.
    pub fn weekly_hours(&self, date: NaiveDate) -> Result<[f64; 7]> {
        let monday = week_start(date);
        let sunday = monday + Duration::days(6);
        let mut stmt = self.conn.prepare(
            "SELECT date, completed_work_minutes FROM schedules
             WHERE date >= ?1 AND date <= ?2",
        )?;
        let rows = stmt.query_map(params![monday.to_string(), sunday.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?))
        })?;

        let mut hours = [0.0; 7];
        for row in rows {
            let (raw_date, minutes) = row?;
            let Ok(day) = raw_date.parse::<NaiveDate>() else {
                tracing::warn!(date = raw_date, "skipping schedule row with malformed date");
                continue;
            };
            hours[day.weekday().num_days_from_monday() as usize] += f64::from(minutes) / 60.0;
        }
        Ok(hours)
    }

    /// Sum of the XP ledger.
    pub fn xp_ledger_total(&self) -> Result<u64> {
        let total: i64 = self
            .conn
            .query_row("SELECT COALESCE(SUM(amount), 0) FROM xp_transactions", [], |row| row.get(0))?;
        Ok(total.max(0) as u64)
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| {
        CoreError::Database(DatabaseError::CorruptRecord {
            key: key.to_string(),
            message: e.to_string(),
        })
    })
}

impl ScheduleStore for Database {
    fn load_schedule(&self, date: NaiveDate) -> Result<Option<DaySchedule>> {
        let key = date.to_string();
        let raw: Option<String> = self
            .conn
            .query_row("SELECT payload FROM schedules WHERE date = ?1", params![key], |row| row.get(0))
            .optional()?;
        raw.map(|raw| decode(&key, &raw)).transpose()
    }

    fn save_schedule(&mut self, schedule: &DaySchedule) -> Result<()> {
        let completed: Vec<_> = schedule
            .blocks
            .iter()
            .filter(|b| b.status == BlockStatus::Completed)
            .collect();
        let completed_work_minutes: u32 = completed
            .iter()
            .filter(|b| b.block_type.is_work())
            .map(|b| b.duration_minutes)
            .sum();
        self.conn.execute(
            "INSERT OR REPLACE INTO schedules
                (date, payload, completed_work_minutes, completed_blocks, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                schedule.date.to_string(),
                serde_json::to_string(schedule)?,
                completed_work_minutes,
                completed.len() as u32,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl OfferStore for Database {
    fn load_offer(&self) -> Result<Option<CarryOverOffer>> {
        self.kv_get_json(OFFER_KEY)
    }

    fn save_offer(&mut self, offer: &CarryOverOffer) -> Result<()> {
        self.kv_set_json(OFFER_KEY, offer)
    }

    fn clear_offer(&mut self) -> Result<()> {
        self.kv_delete(OFFER_KEY)
    }

    fn resolution(&self, date: NaiveDate) -> Result<Option<CarryOverResolution>> {
        let key = date.to_string();
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM carry_over_resolutions WHERE source_date = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        raw.map(|raw| decode(&key, &raw)).transpose()
    }

    fn record_resolution(&mut self, date: NaiveDate, resolution: &CarryOverResolution) -> Result<()> {
        // First resolution wins; replays of the same write are no-ops.
        self.conn.execute(
            "INSERT OR IGNORE INTO carry_over_resolutions (source_date, payload, resolved_at)
             VALUES (?1, ?2, ?3)",
            params![
                date.to_string(),
                serde_json::to_string(resolution)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }
}

impl ProgressStore for Database {
    fn load_counters(&self) -> Result<ProgressCounters> {
        Ok(self.kv_get_json(PROGRESS_KEY)?.unwrap_or_default())
    }

    fn save_counters(&mut self, counters: &ProgressCounters) -> Result<()> {
        self.kv_set_json(PROGRESS_KEY, counters)
    }
}

impl XpSink for Database {
    fn award_xp(&mut self, amount: u32, reason: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO xp_transactions (amount, reason, created_at) VALUES (?1, ?2, ?3)",
            params![amount, reason, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}
