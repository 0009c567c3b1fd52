use crate::persistence::{PersistenceResult, TimetableRepository, validate_entries};
use crate::weekday::CalendarWeekday;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// One cell of the normal weekly timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseTimetableEntry {
    pub day: CalendarWeekday,
    pub period: u8,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl BaseTimetableEntry {
    pub fn new(day: CalendarWeekday, period: u8, subject: impl Into<String>) -> Self {
        Self {
            day,
            period,
            subject: subject.into(),
            room: None,
            color: None,
        }
    }

    pub fn with_room(mut self, room: impl Into<String>) -> Self {
        self.room = Some(room.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

/// A slot of the effective schedule for a date.
///
/// Remapped slots carry `is_special = true` and an `original_info` label such
/// as `(月3)` naming the slot the class was copied from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconstructedEntry {
    pub day: CalendarWeekday,
    pub period: u8,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub is_special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_info: Option<String>,
}

impl From<BaseTimetableEntry> for ReconstructedEntry {
    fn from(entry: BaseTimetableEntry) -> Self {
        Self {
            day: entry.day,
            period: entry.period,
            subject: entry.subject,
            room: entry.room,
            color: entry.color,
            is_special: false,
            original_info: None,
        }
    }
}

/// Order entries by period for display. Ties keep their relative order.
pub fn sort_by_period(entries: &mut [ReconstructedEntry]) {
    entries.sort_by_key(|entry| entry.period);
}

/// In-memory weekly timetable keyed by `(day, period)`.
#[derive(Debug, Default)]
pub struct Timetable {
    entries: RwLock<Vec<BaseTimetableEntry>>,
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<BaseTimetableEntry>) -> PersistenceResult<Self> {
        validate_entries(&entries)?;
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Insert or overwrite the entry at `(entry.day, entry.period)`.
    pub fn upsert(&self, entry: BaseTimetableEntry) -> PersistenceResult<()> {
        validate_entries(std::slice::from_ref(&entry))?;
        let mut entries = self.entries.write();
        match entries
            .iter_mut()
            .find(|existing| existing.day == entry.day && existing.period == entry.period)
        {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    pub fn remove(&self, day: CalendarWeekday, period: u8) -> bool {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|entry| !(entry.day == day && entry.period == period));
        entries.len() != before
    }

    pub fn replace_all(&self, entries: Vec<BaseTimetableEntry>) -> PersistenceResult<()> {
        validate_entries(&entries)?;
        *self.entries.write() = entries;
        Ok(())
    }

    /// All entries ordered by day then period.
    pub fn entries(&self) -> Vec<BaseTimetableEntry> {
        let mut entries = self.entries.read().clone();
        entries.sort_by_key(|entry| (entry.day, entry.period));
        entries
    }
}

impl TimetableRepository for Timetable {
    fn fetch_by_weekday(&self, day: CalendarWeekday) -> PersistenceResult<Vec<BaseTimetableEntry>> {
        let mut entries: Vec<BaseTimetableEntry> = self
            .entries
            .read()
            .iter()
            .filter(|entry| entry.day == day)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.period);
        Ok(entries)
    }

    fn all_entries(&self) -> PersistenceResult<Vec<BaseTimetableEntry>> {
        Ok(self.entries())
    }

    fn replace_entries(&self, entries: Vec<BaseTimetableEntry>) -> PersistenceResult<()> {
        self.replace_all(entries)
    }
}
