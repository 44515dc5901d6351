//! Reading time entries from the getan database.

use std::path::Path;

use anyhow::Context;
use chrono::{Days, NaiveDate};
use rusqlite::{Connection, OpenFlags};

use crate::Result;

/// A single finished getan entry, joined with its project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeEntry {
    pub day: NaiveDate,
    pub hours: u32,
    pub minutes: u32,
    pub description: String,
    pub project_key: String,
    pub project_description: String,
}

const ENTRIES_QUERY: &str = "
SELECT
    date(e.start_time) AS day,
    CAST(strftime('%s', e.stop_time) AS INTEGER)
        - CAST(strftime('%s', e.start_time) AS INTEGER) AS seconds,
    COALESCE(e.description, '') AS description,
    p.key AS project_key,
    COALESCE(p.description, '') AS project_description
FROM entries e
JOIN projects p ON p.id = e.project_id
WHERE date(e.start_time) > ?1
ORDER BY e.start_time ASC
";

/// Read-only handle on a getan database.
pub struct Timesheet {
    conn: Connection,
}

impl Timesheet {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Failed to open time database: {}", path.display()))?;
        Ok(Timesheet { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Timesheet { conn }
    }

    /// All finished entries of the last `days` days before `today`, oldest first.
    ///
    /// The window is exclusive: an entry on `today - days` is not returned.
    pub fn entries_since(&self, today: NaiveDate, days: u32) -> Result<Vec<TimeEntry>> {
        let cutoff = today
            .checked_sub_days(Days::new(days.into()))
            .unwrap_or(NaiveDate::MIN);
        tracing::debug!("Querying entries after {cutoff}");

        let mut stmt = self
            .conn
            .prepare(ENTRIES_QUERY)
            .context("Failed to prepare entries query")?;
        let rows = stmt.query_map([cutoff.format("%Y-%m-%d").to_string()], |row| {
            Ok((
                row.get::<_, NaiveDate>("day")?,
                row.get::<_, Option<i64>>("seconds")?,
                row.get::<_, String>("description")?,
                row.get::<_, String>("project_key")?,
                row.get::<_, String>("project_description")?,
            ))
        })?;

        let mut entries = Vec::new();
        for row in rows {
            let (day, seconds, description, project_key, project_description) =
                row.context("Failed to read time entry")?;
            let Some(seconds) = seconds else {
                tracing::debug!("Skipping running entry on {day}: {description}");
                continue;
            };
            let (hours, minutes) = split_duration(seconds);
            entries.push(TimeEntry {
                day,
                hours,
                minutes,
                description,
                project_key,
                project_description,
            });
        }
        tracing::debug!("Read {} entries", entries.len());

        Ok(entries)
    }
}

/// Split a duration in seconds into floored hours and rounded minutes.
fn split_duration(seconds: i64) -> (u32, u32) {
    let hours = seconds.max(0) as f64 / 3600.0;
    let whole = hours.floor();
    let minutes = ((hours - whole) * 60.0).round() as u32;
    let whole = whole as u32;
    if minutes == 60 {
        (whole + 1, 0)
    } else {
        (whole, minutes)
    }
}
