//! Calendar marker events.
//!
//! A date has a special schedule when the calendar holds a "marker" event on
//! it: an event whose title starts with the marker prefix or mentions one of
//! the schedule keywords. The rest of the title is the pattern name.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use thiserror::Error;

pub const DEFAULT_MARKER_PREFIX: &str = "特殊時程:";

/// Title keywords that identify a marker event even without the prefix.
pub const MARKER_KEYWORDS: [&str; 5] = ["時程", "短縮", "テスト時程", "特殊", "カスタム"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Marker {
    pub pattern_name: String,
    pub handle: MarkerHandle,
}

/// A calendar event as seen by marker detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub handle: MarkerHandle,
    pub date: NaiveDate,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl CalendarEvent {
    /// A 00:00-24:00 event on `date`.
    pub fn full_day(handle: MarkerHandle, date: NaiveDate, title: impl Into<String>) -> Self {
        let start = date.and_time(NaiveTime::MIN);
        Self {
            handle,
            date,
            title: title.into(),
            start,
            end: start + Duration::days(1),
            all_day: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum MarkerError {
    #[error("calendar access was denied")]
    PermissionDenied,
    #[error("marker event {0:?} not found")]
    NotFound(MarkerHandle),
    #[error("calendar backend error: {0}")]
    Backend(String),
}

pub type MarkerResult<T> = Result<T, MarkerError>;

/// Finds, creates and deletes marker events.
pub trait MarkerEventGateway: Send + Sync {
    fn find_marker(&self, date: NaiveDate) -> MarkerResult<Option<Marker>>;

    /// Replace any markers on `date` with one titled for `pattern_name`.
    fn create_marker(&self, date: NaiveDate, pattern_name: &str) -> MarkerResult<MarkerHandle>;

    fn delete_marker(&self, handle: MarkerHandle) -> MarkerResult<()>;
}

pub fn is_marker_title(title: &str, prefix: &str) -> bool {
    title.starts_with(prefix) || MARKER_KEYWORDS.iter().any(|keyword| title.contains(keyword))
}

pub fn marker_title(prefix: &str, pattern_name: &str) -> String {
    format!("{prefix}{pattern_name}")
}

/// Pattern name carried by a marker title: the title minus the prefix, or the
/// raw title when no prefix is present.
pub fn pattern_name_from_title(title: &str, prefix: &str) -> String {
    match title.strip_prefix(prefix) {
        Some(rest) => rest.trim().to_string(),
        None => title.trim().to_string(),
    }
}

/// The first marker among `events`, in the order given.
pub fn detect_marker<'a, I>(events: I, prefix: &str) -> Option<Marker>
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    events
        .into_iter()
        .find(|event| is_marker_title(&event.title, prefix))
        .map(|event| Marker {
            pattern_name: pattern_name_from_title(&event.title, prefix),
            handle: event.handle,
        })
}

/// Calendar held in memory. Access can be revoked to mimic a user who has not
/// granted calendar permission.
#[derive(Debug)]
pub struct MemoryMarkerGateway {
    prefix: String,
    events: RwLock<Vec<CalendarEvent>>,
    next_handle: AtomicI64,
    permitted: AtomicBool,
}

impl Default for MemoryMarkerGateway {
    fn default() -> Self {
        Self::with_prefix(DEFAULT_MARKER_PREFIX)
    }
}

impl MemoryMarkerGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            events: RwLock::new(Vec::new()),
            next_handle: AtomicI64::new(1),
            permitted: AtomicBool::new(true),
        }
    }

    pub fn set_permission(&self, granted: bool) {
        self.permitted.store(granted, Ordering::SeqCst);
    }

    /// Add an arbitrary full-day event, marker or not.
    pub fn add_event(&self, date: NaiveDate, title: impl Into<String>) -> MarkerHandle {
        let handle = MarkerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.events
            .write()
            .push(CalendarEvent::full_day(handle, date, title));
        handle
    }

    pub fn events_on(&self, date: NaiveDate) -> Vec<CalendarEvent> {
        self.events
            .read()
            .iter()
            .filter(|event| event.date == date)
            .cloned()
            .collect()
    }

    fn check_permission(&self) -> MarkerResult<()> {
        if self.permitted.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(MarkerError::PermissionDenied)
        }
    }
}

impl MarkerEventGateway for MemoryMarkerGateway {
    fn find_marker(&self, date: NaiveDate) -> MarkerResult<Option<Marker>> {
        self.check_permission()?;
        let events = self.events.read();
        Ok(detect_marker(
            events.iter().filter(|event| event.date == date),
            &self.prefix,
        ))
    }

    fn create_marker(&self, date: NaiveDate, pattern_name: &str) -> MarkerResult<MarkerHandle> {
        self.check_permission()?;
        let handle = MarkerHandle(self.next_handle.fetch_add(1, Ordering::SeqCst));
        let mut events = self.events.write();
        events.retain(|event| !(event.date == date && is_marker_title(&event.title, &self.prefix)));
        events.push(CalendarEvent::full_day(
            handle,
            date,
            marker_title(&self.prefix, pattern_name),
        ));
        Ok(handle)
    }

    fn delete_marker(&self, handle: MarkerHandle) -> MarkerResult<()> {
        self.check_permission()?;
        let mut events = self.events.write();
        let before = events.len();
        events.retain(|event| event.handle != handle);
        if events.len() == before {
            return Err(MarkerError::NotFound(handle));
        }
        Ok(())
    }
}
