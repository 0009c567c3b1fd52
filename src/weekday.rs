use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Monday-first weekday index (0 = Monday .. 6 = Sunday).
///
/// This is the convention used by the notation, the reorder configs and the
/// mapping rows. Base timetable storage uses [`CalendarWeekday`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LogicalWeekday(u8);

/// Sunday-first weekday index (0 = Sunday .. 6 = Saturday), the key used by
/// the base timetable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CalendarWeekday(u8);

/// Notation glyphs indexed by [`LogicalWeekday`].
pub const WEEKDAY_GLYPHS: [char; 7] = ['月', '火', '水', '木', '金', '土', '日'];

impl LogicalWeekday {
    pub const MONDAY: Self = Self(0);
    pub const TUESDAY: Self = Self(1);
    pub const WEDNESDAY: Self = Self(2);
    pub const THURSDAY: Self = Self(3);
    pub const FRIDAY: Self = Self(4);
    pub const SATURDAY: Self = Self(5);
    pub const SUNDAY: Self = Self(6);

    pub fn new(index: u8) -> Option<Self> {
        (index < 7).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    /// Map a notation glyph (月..日) to its weekday.
    pub fn from_glyph(glyph: char) -> Option<Self> {
        WEEKDAY_GLYPHS
            .iter()
            .position(|g| *g == glyph)
            .map(|idx| Self(idx as u8))
    }

    pub fn glyph(self) -> char {
        WEEKDAY_GLYPHS[self.0 as usize]
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self::from(date.weekday())
    }

    pub fn to_calendar(self) -> CalendarWeekday {
        CalendarWeekday((self.0 + 1) % 7)
    }
}

impl CalendarWeekday {
    pub fn new(index: u8) -> Option<Self> {
        (index < 7).then_some(Self(index))
    }

    pub fn index(self) -> u8 {
        self.0
    }

    pub fn of_date(date: NaiveDate) -> Self {
        Self(date.weekday().num_days_from_sunday() as u8)
    }

    pub fn to_logical(self) -> LogicalWeekday {
        LogicalWeekday((self.0 + 6) % 7)
    }

    pub fn glyph(self) -> char {
        self.to_logical().glyph()
    }
}

impl From<Weekday> for LogicalWeekday {
    fn from(value: Weekday) -> Self {
        Self(value.num_days_from_monday() as u8)
    }
}

impl From<LogicalWeekday> for CalendarWeekday {
    fn from(value: LogicalWeekday) -> Self {
        value.to_calendar()
    }
}

impl From<CalendarWeekday> for LogicalWeekday {
    fn from(value: CalendarWeekday) -> Self {
        value.to_logical()
    }
}

impl TryFrom<u8> for LogicalWeekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("logical weekday {value} out of range 0..=6"))
    }
}

impl From<LogicalWeekday> for u8 {
    fn from(value: LogicalWeekday) -> Self {
        value.0
    }
}

impl TryFrom<u8> for CalendarWeekday {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("calendar weekday {value} out of range 0..=6"))
    }
}

impl From<CalendarWeekday> for u8 {
    fn from(value: CalendarWeekday) -> Self {
        value.0
    }
}

impl fmt::Display for LogicalWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}

impl fmt::Display for CalendarWeekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.glyph())
    }
}
