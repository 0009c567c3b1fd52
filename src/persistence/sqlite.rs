use super::{MappingStore, PersistenceError, PersistenceResult, TimetableRepository};
use crate::marker::{
    CalendarEvent, Marker, MarkerError, MarkerEventGateway, MarkerHandle, MarkerResult,
    DEFAULT_MARKER_PREFIX, detect_marker, is_marker_title, marker_title,
};
use crate::period::PeriodNumber;
use crate::reorder::{MappingRow, PeriodReorderConfig, SpecialScheduleRecord, flatten_configs};
use crate::timetable::BaseTimetableEntry;
use crate::weekday::{CalendarWeekday, LogicalWeekday};
use chrono::{NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::Path;
use tracing::{debug, instrument};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One SQLite database holding the base timetable, the special-schedule
/// mappings and a local calendar of marker events.
pub struct SqliteStore {
    connection: Mutex<Connection>,
    marker_prefix: String,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> PersistenceResult<Self> {
        let connection = Connection::open(path)?;
        Self::from_connection(connection)
    }

    pub fn in_memory() -> PersistenceResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn with_marker_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.marker_prefix = prefix.into();
        self
    }

    fn from_connection(connection: Connection) -> PersistenceResult<Self> {
        Self::initialize_schema(&connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
            marker_prefix: DEFAULT_MARKER_PREFIX.to_string(),
        })
    }

    fn initialize_schema(connection: &Connection) -> PersistenceResult<()> {
        let ddl = r#"
            PRAGMA foreign_keys = ON;
            CREATE TABLE IF NOT EXISTS timetable_entries (
                day INTEGER NOT NULL CHECK (day BETWEEN 0 AND 6),
                period INTEGER NOT NULL CHECK (period BETWEEN 1 AND 9),
                subject TEXT NOT NULL,
                room TEXT,
                color TEXT,
                PRIMARY KEY (day, period)
            );
            CREATE TABLE IF NOT EXISTS special_schedules (
                date TEXT PRIMARY KEY,
                pattern_name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS special_schedule_rows (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL REFERENCES special_schedules(date) ON DELETE CASCADE,
                original_day INTEGER NOT NULL,
                target_day INTEGER NOT NULL,
                original_period INTEGER NOT NULL,
                target_period INTEGER NOT NULL,
                pattern_name TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_special_schedule_rows_date
                ON special_schedule_rows (date);
            CREATE TABLE IF NOT EXISTS calendar_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                title TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                all_day INTEGER NOT NULL DEFAULT 1
            );
            CREATE INDEX IF NOT EXISTS idx_calendar_events_date
                ON calendar_events (date);
        "#;
        connection.execute_batch(ddl)?;
        Ok(())
    }

    /// Add an arbitrary full-day event to the local calendar.
    pub fn add_event(&self, date: NaiveDate, title: &str) -> PersistenceResult<MarkerHandle> {
        let conn = self.connection.lock();
        insert_event(&conn, date, title)
    }

    pub fn events_on(&self, date: NaiveDate) -> PersistenceResult<Vec<CalendarEvent>> {
        let conn = self.connection.lock();
        events_on(&conn, date)
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(input: &str) -> PersistenceResult<NaiveDate> {
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid date '{input}': {e}")))
}

fn parse_datetime(input: &str) -> PersistenceResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input, DATETIME_FORMAT)
        .map_err(|e| PersistenceError::InvalidData(format!("invalid timestamp '{input}': {e}")))
}

fn logical_day(value: i64) -> PersistenceResult<LogicalWeekday> {
    u8::try_from(value)
        .ok()
        .and_then(LogicalWeekday::new)
        .ok_or_else(|| PersistenceError::InvalidData(format!("invalid weekday {value}")))
}

fn period(value: i64) -> PersistenceResult<PeriodNumber> {
    PeriodNumber::try_from(value).map_err(PersistenceError::InvalidData)
}

fn mapping_row(row: &Row<'_>) -> rusqlite::Result<(i64, i64, i64, i64, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn load_rows(conn: &Connection, date: NaiveDate) -> PersistenceResult<Vec<MappingRow>> {
    let mut stmt = conn.prepare(
        "SELECT original_day, target_day, original_period, target_period, pattern_name
         FROM special_schedule_rows WHERE date = ?1 ORDER BY seq ASC",
    )?;
    let raw = stmt.query_map(params![format_date(date)], mapping_row)?;

    let mut rows = Vec::new();
    for item in raw {
        let (original_day, target_day, original_period, target_period, pattern_name) = item?;
        rows.push(MappingRow {
            original_day: logical_day(original_day)?,
            target_day: logical_day(target_day)?,
            original_period: period(original_period)?,
            target_period: period(target_period)?,
            pattern_name,
        });
    }
    Ok(rows)
}

fn insert_event(conn: &Connection, date: NaiveDate, title: &str) -> PersistenceResult<MarkerHandle> {
    let event = CalendarEvent::full_day(MarkerHandle(0), date, title);
    conn.execute(
        "INSERT INTO calendar_events (date, title, start_at, end_at, all_day)
         VALUES (?1, ?2, ?3, ?4, 1)",
        params![
            format_date(date),
            title,
            event.start.format(DATETIME_FORMAT).to_string(),
            event.end.format(DATETIME_FORMAT).to_string()
        ],
    )?;
    Ok(MarkerHandle(conn.last_insert_rowid()))
}

fn events_on(conn: &Connection, date: NaiveDate) -> PersistenceResult<Vec<CalendarEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, title, start_at, end_at, all_day FROM calendar_events
         WHERE date = ?1 ORDER BY id ASC",
    )?;
    let raw = stmt.query_map(params![format_date(date)], |row| {
        Ok((
            row.get::<_, i64>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, bool>(4)?,
        ))
    })?;

    let mut events = Vec::new();
    for item in raw {
        let (id, title, start_at, end_at, all_day) = item?;
        events.push(CalendarEvent {
            handle: MarkerHandle(id),
            date,
            title,
            start: parse_datetime(&start_at)?,
            end: parse_datetime(&end_at)?,
            all_day,
        });
    }
    Ok(events)
}

impl TimetableRepository for SqliteStore {
    fn fetch_by_weekday(&self, day: CalendarWeekday) -> PersistenceResult<Vec<BaseTimetableEntry>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT period, subject, room, color FROM timetable_entries
             WHERE day = ?1 ORDER BY period ASC",
        )?;
        let rows = stmt.query_map(params![day.index()], |row| {
            Ok(BaseTimetableEntry {
                day,
                period: row.get(0)?,
                subject: row.get(1)?,
                room: row.get(2)?,
                color: row.get(3)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn all_entries(&self) -> PersistenceResult<Vec<BaseTimetableEntry>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT day, period, subject, room, color FROM timetable_entries
             ORDER BY day ASC, period ASC",
        )?;
        let raw = stmt.query_map([], |row| {
            Ok((
                row.get::<_, u8>(0)?,
                row.get::<_, u8>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut entries = Vec::new();
        for item in raw {
            let (day, period, subject, room, color) = item?;
            let day = CalendarWeekday::new(day)
                .ok_or_else(|| PersistenceError::InvalidData(format!("invalid weekday {day}")))?;
            entries.push(BaseTimetableEntry {
                day,
                period,
                subject,
                room,
                color,
            });
        }
        Ok(entries)
    }

    fn replace_entries(&self, entries: Vec<BaseTimetableEntry>) -> PersistenceResult<()> {
        super::validate_entries(&entries)?;
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM timetable_entries", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO timetable_entries (day, period, subject, room, color)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for entry in &entries {
                stmt.execute(params![
                    entry.day.index(),
                    entry.period,
                    entry.subject,
                    entry.room,
                    entry.color
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

impl MappingStore for SqliteStore {
    #[instrument(skip(self, configs), fields(configs = configs.len()))]
    fn replace(
        &self,
        date: NaiveDate,
        configs: &[PeriodReorderConfig],
        pattern_name: &str,
    ) -> PersistenceResult<()> {
        let key = format_date(date);
        let rows = flatten_configs(configs, pattern_name);
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM special_schedule_rows WHERE date = ?1", params![key])?;
        tx.execute("DELETE FROM special_schedules WHERE date = ?1", params![key])?;
        tx.execute(
            "INSERT INTO special_schedules (date, pattern_name) VALUES (?1, ?2)",
            params![key, pattern_name],
        )?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO special_schedule_rows
                 (date, original_day, target_day, original_period, target_period, pattern_name)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in &rows {
                stmt.execute(params![
                    key,
                    row.original_day.index(),
                    row.target_day.index(),
                    row.original_period.get(),
                    row.target_period.get(),
                    row.pattern_name
                ])?;
            }
        }
        tx.commit()?;
        debug!(rows = rows.len(), "special schedule rows replaced");
        Ok(())
    }

    fn rows_for_date(&self, date: NaiveDate) -> PersistenceResult<Vec<MappingRow>> {
        let conn = self.connection.lock();
        load_rows(&conn, date)
    }

    fn clear(&self, date: NaiveDate) -> PersistenceResult<bool> {
        let key = format_date(date);
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let rows = tx.execute("DELETE FROM special_schedule_rows WHERE date = ?1", params![key])?;
        let records = tx.execute("DELETE FROM special_schedules WHERE date = ?1", params![key])?;
        tx.commit()?;
        Ok(rows + records > 0)
    }

    fn record(&self, date: NaiveDate) -> PersistenceResult<Option<SpecialScheduleRecord>> {
        let conn = self.connection.lock();
        let pattern_name: Option<String> = conn
            .query_row(
                "SELECT pattern_name FROM special_schedules WHERE date = ?1",
                params![format_date(date)],
                |row| row.get(0),
            )
            .optional()?;
        let Some(pattern_name) = pattern_name else {
            return Ok(None);
        };
        let rows = load_rows(&conn, date)?;
        Ok(Some(SpecialScheduleRecord {
            date,
            pattern_name,
            rows,
        }))
    }

    fn special_dates(&self, start: NaiveDate, end: NaiveDate) -> PersistenceResult<Vec<NaiveDate>> {
        let conn = self.connection.lock();
        let mut stmt = conn.prepare(
            "SELECT date FROM special_schedules WHERE date BETWEEN ?1 AND ?2 ORDER BY date ASC",
        )?;
        let raw = stmt.query_map(params![format_date(start), format_date(end)], |row| {
            row.get::<_, String>(0)
        })?;
        let mut dates = Vec::new();
        for item in raw {
            dates.push(parse_date(&item?)?);
        }
        Ok(dates)
    }
}

fn backend(err: PersistenceError) -> MarkerError {
    MarkerError::Backend(err.to_string())
}

impl From<rusqlite::Error> for MarkerError {
    fn from(value: rusqlite::Error) -> Self {
        MarkerError::Backend(value.to_string())
    }
}

impl MarkerEventGateway for SqliteStore {
    fn find_marker(&self, date: NaiveDate) -> MarkerResult<Option<Marker>> {
        let conn = self.connection.lock();
        let events = events_on(&conn, date).map_err(backend)?;
        Ok(detect_marker(&events, &self.marker_prefix))
    }

    fn create_marker(&self, date: NaiveDate, pattern_name: &str) -> MarkerResult<MarkerHandle> {
        let mut conn = self.connection.lock();
        let tx = conn.transaction()?;
        let existing = events_on(&tx, date).map_err(backend)?;
        for event in existing
            .iter()
            .filter(|event| is_marker_title(&event.title, &self.marker_prefix))
        {
            tx.execute(
                "DELETE FROM calendar_events WHERE id = ?1",
                params![event.handle.0],
            )?;
        }
        let handle = insert_event(&tx, date, &marker_title(&self.marker_prefix, pattern_name))
            .map_err(backend)?;
        tx.commit()?;
        Ok(handle)
    }

    fn delete_marker(&self, handle: MarkerHandle) -> MarkerResult<()> {
        let conn = self.connection.lock();
        let removed = conn.execute("DELETE FROM calendar_events WHERE id = ?1", params![handle.0])?;
        if removed == 0 {
            return Err(MarkerError::NotFound(handle));
        }
        Ok(())
    }
}
