use super::{PersistenceError, PersistenceResult};
use crate::timetable::BaseTimetableEntry;
use crate::weekday::LogicalWeekday;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct TimetableSnapshot {
    #[serde(default = "snapshot_version")]
    version: u32,
    entries: Vec<BaseTimetableEntry>,
}

fn snapshot_version() -> u32 {
    SNAPSHOT_VERSION
}

pub fn save_timetable_to_json<P: AsRef<Path>>(
    entries: &[BaseTimetableEntry],
    path: P,
) -> PersistenceResult<()> {
    super::validate_entries(entries)?;
    let snapshot = TimetableSnapshot {
        version: SNAPSHOT_VERSION,
        entries: entries.to_vec(),
    };
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, &snapshot)?;
    Ok(())
}

pub fn load_timetable_from_json<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<BaseTimetableEntry>> {
    let file = File::open(path)?;
    let snapshot: TimetableSnapshot = serde_json::from_reader(file)?;
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(PersistenceError::InvalidData(format!(
            "unsupported timetable snapshot version {}",
            snapshot.version
        )));
    }
    super::validate_entries(&snapshot.entries)?;
    Ok(snapshot.entries)
}

/// CSV row; `day` holds the weekday glyph (月..日).
#[derive(Default, Serialize, Deserialize)]
struct EntryCsvRecord {
    day: String,
    period: u8,
    subject: String,
    #[serde(default)]
    room: String,
    #[serde(default)]
    color: String,
}

impl From<&BaseTimetableEntry> for EntryCsvRecord {
    fn from(entry: &BaseTimetableEntry) -> Self {
        Self {
            day: entry.day.glyph().to_string(),
            period: entry.period,
            subject: entry.subject.clone(),
            room: entry.room.clone().unwrap_or_default(),
            color: entry.color.clone().unwrap_or_default(),
        }
    }
}

impl EntryCsvRecord {
    fn into_entry(self) -> PersistenceResult<BaseTimetableEntry> {
        let mut glyphs = self.day.trim().chars();
        let day = match (glyphs.next(), glyphs.next()) {
            (Some(glyph), None) => LogicalWeekday::from_glyph(glyph),
            _ => None,
        }
        .ok_or_else(|| PersistenceError::InvalidData(format!("invalid weekday '{}'", self.day)))?;

        Ok(BaseTimetableEntry {
            day: day.to_calendar(),
            period: self.period,
            subject: self.subject,
            room: parse_string_option(self.room),
            color: parse_string_option(self.color),
        })
    }
}

pub fn save_timetable_to_csv<P: AsRef<Path>>(
    entries: &[BaseTimetableEntry],
    path: P,
) -> PersistenceResult<()> {
    super::validate_entries(entries)?;
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    for entry in entries {
        writer.serialize(EntryCsvRecord::from(entry))?;
    }
    writer.flush()?;
    Ok(())
}

pub fn load_timetable_from_csv<P: AsRef<Path>>(path: P) -> PersistenceResult<Vec<BaseTimetableEntry>> {
    let file = File::open(path)?;
    let mut reader = csv::Reader::from_reader(file);
    let mut entries = Vec::new();
    for record in reader.deserialize::<EntryCsvRecord>() {
        entries.push(record?.into_entry()?);
    }

    if entries.is_empty() {
        return Err(PersistenceError::InvalidData(
            "CSV file contained no timetable entries".into(),
        ));
    }

    super::validate_entries(&entries)?;
    Ok(entries)
}

fn parse_string_option(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
