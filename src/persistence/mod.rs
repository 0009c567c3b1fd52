use crate::reorder::{MappingRow, PeriodReorderConfig, SpecialScheduleRecord, reassemble_rows};
use crate::timetable::BaseTimetableEntry;
use crate::weekday::CalendarWeekday;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("no timetable stored")]
    NotFound,
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Read access to the normal weekly timetable.
pub trait TimetableRepository: Send + Sync {
    fn fetch_by_weekday(&self, day: CalendarWeekday) -> PersistenceResult<Vec<BaseTimetableEntry>>;
    fn all_entries(&self) -> PersistenceResult<Vec<BaseTimetableEntry>>;
    fn replace_entries(&self, entries: Vec<BaseTimetableEntry>) -> PersistenceResult<()>;
}

/// Durable special-schedule rows keyed by date.
///
/// `replace` swaps the whole record for a date in one step; a concurrent
/// `rows_for_date` sees either the old rows or the new ones, never a mix.
pub trait MappingStore: Send + Sync {
    fn replace(
        &self,
        date: NaiveDate,
        configs: &[PeriodReorderConfig],
        pattern_name: &str,
    ) -> PersistenceResult<()>;

    fn rows_for_date(&self, date: NaiveDate) -> PersistenceResult<Vec<MappingRow>>;

    /// Drop the record for `date`. Returns whether anything was stored.
    fn clear(&self, date: NaiveDate) -> PersistenceResult<bool>;

    fn record(&self, date: NaiveDate) -> PersistenceResult<Option<SpecialScheduleRecord>>;

    /// Dates in `start..=end` that carry a record, ascending.
    fn special_dates(&self, start: NaiveDate, end: NaiveDate) -> PersistenceResult<Vec<NaiveDate>>;

    fn configs_for_date(&self, date: NaiveDate) -> PersistenceResult<Vec<PeriodReorderConfig>> {
        Ok(reassemble_rows(&self.rows_for_date(date)?))
    }
}

pub fn validate_entries(entries: &[BaseTimetableEntry]) -> PersistenceResult<()> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !(1..=9).contains(&entry.period) {
            return Err(PersistenceError::InvalidData(format!(
                "entry {}{} has period outside 1..=9",
                entry.day, entry.period
            )));
        }
        if entry.subject.trim().is_empty() {
            return Err(PersistenceError::InvalidData(format!(
                "entry {}{} requires a non-empty subject",
                entry.day, entry.period
            )));
        }
        if !seen.insert((entry.day, entry.period)) {
            return Err(PersistenceError::InvalidData(format!(
                "duplicate entry for {}{}",
                entry.day, entry.period
            )));
        }
    }
    Ok(())
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_timetable_from_csv, load_timetable_from_json, save_timetable_to_csv,
    save_timetable_to_json,
};
pub use memory::MemoryMappingStore;
