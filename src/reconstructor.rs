use crate::builder::ReorderConfigBuilder;
use crate::marker::{MarkerError, MarkerEventGateway};
use crate::persistence::{MappingStore, PersistenceError, TimetableRepository};
use crate::reorder::PeriodReorderConfig;
use crate::timetable::{BaseTimetableEntry, ReconstructedEntry};
use crate::weekday::{CalendarWeekday, LogicalWeekday};
use chrono::{DateTime, NaiveDate, TimeZone};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Guard against a gateway that keeps reporting a marker it cannot delete.
const MAX_MARKER_DELETIONS: usize = 16;

#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("marker event error: {0}")]
    Marker(#[from] MarkerError),
    #[error("mapping store error: {0}")]
    Store(#[from] PersistenceError),
}

/// Reduce an instant to the calendar date it falls on in its own time zone.
pub fn normalize_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Produces the effective schedule for a date and applies or removes special
/// schedules.
///
/// Holds no mutable state of its own; all persistence goes through the three
/// collaborators.
#[derive(Clone)]
pub struct ScheduleReconstructor {
    timetable: Arc<dyn TimetableRepository>,
    markers: Arc<dyn MarkerEventGateway>,
    mappings: Arc<dyn MappingStore>,
    builder: ReorderConfigBuilder,
}

impl ScheduleReconstructor {
    pub fn new(
        timetable: Arc<dyn TimetableRepository>,
        markers: Arc<dyn MarkerEventGateway>,
        mappings: Arc<dyn MappingStore>,
    ) -> Self {
        Self {
            timetable,
            markers,
            mappings,
            builder: ReorderConfigBuilder::new(),
        }
    }

    pub fn timetable(&self) -> &Arc<dyn TimetableRepository> {
        &self.timetable
    }

    pub fn mappings(&self) -> &Arc<dyn MappingStore> {
        &self.mappings
    }

    pub fn builder(&self) -> &ReorderConfigBuilder {
        &self.builder
    }

    /// The per-period class list for `date`, unsorted.
    ///
    /// Read failures and missing data degrade to the normal weekly timetable.
    #[instrument(skip(self))]
    pub fn effective_schedule(&self, date: NaiveDate) -> Vec<ReconstructedEntry> {
        let configs = self.configs_for(date);
        if configs.is_empty() {
            return self.identity_schedule(date);
        }
        self.merge(&configs)
    }

    /// Reorder configs in force for `date`: stored rows first, otherwise built
    /// from a calendar marker that has not been materialized yet.
    pub fn configs_for(&self, date: NaiveDate) -> Vec<PeriodReorderConfig> {
        match self.mappings.configs_for_date(date) {
            Ok(configs) if !configs.is_empty() => return configs,
            Ok(_) => {}
            Err(err) => {
                warn!(%date, error = %err, "failed to read special schedule rows");
                return Vec::new();
            }
        }

        match self.mappings.record(date) {
            // Applied with nothing to remap: the stored decision stands.
            Ok(Some(_)) => return Vec::new(),
            Ok(None) => {}
            Err(err) => {
                warn!(%date, error = %err, "failed to read special schedule record");
                return Vec::new();
            }
        }

        let marker = match self.markers.find_marker(date) {
            Ok(Some(marker)) => marker,
            Ok(None) => return Vec::new(),
            Err(err) => {
                debug!(%date, error = %err, "marker lookup unavailable");
                return Vec::new();
            }
        };

        let configs = self
            .builder
            .build(&marker.pattern_name, LogicalWeekday::of_date(date));
        if let Err(err) = self.mappings.replace(date, &configs, &marker.pattern_name) {
            warn!(%date, error = %err, "failed to materialize marker into mapping store");
        } else {
            info!(%date, pattern = %marker.pattern_name, "materialized special schedule from marker");
        }
        configs
    }

    /// Base entries for the weekday of `date`, unmodified.
    pub fn identity_schedule(&self, date: NaiveDate) -> Vec<ReconstructedEntry> {
        self.base_entries(CalendarWeekday::of_date(date))
            .into_iter()
            .map(ReconstructedEntry::from)
            .collect()
    }

    /// Copy each source slot of `configs` into its target slot.
    ///
    /// Source slots without a base entry are skipped. Output follows config
    /// order, not period order.
    pub fn merge(&self, configs: &[PeriodReorderConfig]) -> Vec<ReconstructedEntry> {
        let mut by_day: HashMap<CalendarWeekday, Vec<BaseTimetableEntry>> = HashMap::new();
        let mut merged = Vec::new();

        for config in configs {
            let source_day = config.original_day().to_calendar();
            let target_day = config.target_day().to_calendar();
            let source_entries = by_day
                .entry(source_day)
                .or_insert_with(|| self.base_entries(source_day));

            for (original, target) in config.pairs() {
                let Some(base) = source_entries
                    .iter()
                    .find(|entry| entry.period == original.get())
                else {
                    debug!(day = %source_day, period = original.get(), "no base entry for source slot");
                    continue;
                };
                let mut entry = ReconstructedEntry::from(base.clone());
                entry.day = target_day;
                entry.period = target.get();
                entry.is_special = true;
                entry.original_info = Some(format!("({}{})", config.original_day().glyph(), original));
                merged.push(entry);
            }
        }
        merged
    }

    fn base_entries(&self, day: CalendarWeekday) -> Vec<BaseTimetableEntry> {
        self.timetable.fetch_by_weekday(day).unwrap_or_else(|err| {
            warn!(%day, error = %err, "failed to read base timetable");
            Vec::new()
        })
    }

    /// Mark `date` as special and store its remapping.
    ///
    /// A non-empty `custom_notation` goes straight to the custom parser and
    /// becomes the marker text; otherwise `pattern_name` is classified and
    /// titles the marker. The stored record always keeps `pattern_name`.
    /// Returns `Ok(false)` when the marker was created but nothing could be
    /// remapped.
    #[instrument(skip(self))]
    pub fn apply(
        &self,
        date: NaiveDate,
        pattern_name: &str,
        weekday: LogicalWeekday,
        custom_notation: Option<&str>,
    ) -> Result<bool, ApplyError> {
        let custom = custom_notation.map(str::trim).filter(|text| !text.is_empty());
        let configs = self.builder.preview(pattern_name, weekday, custom);

        self.markers.create_marker(date, custom.unwrap_or(pattern_name))?;
        self.mappings.replace(date, &configs, pattern_name)?;

        info!(%date, pattern_name, configs = configs.len(), "special schedule applied");
        Ok(!configs.is_empty())
    }

    /// [`Self::apply`] with the weekday taken from `date`.
    pub fn apply_special_schedule(
        &self,
        date: NaiveDate,
        pattern_name: &str,
        custom_notation: Option<&str>,
    ) -> Result<bool, ApplyError> {
        self.apply(date, pattern_name, LogicalWeekday::of_date(date), custom_notation)
    }

    /// Delete the stored rows for `date`, then its marker(s).
    ///
    /// If clearing the rows fails the markers are left untouched. Returns
    /// whether a marker or a stored record existed.
    #[instrument(skip(self))]
    pub fn remove_special_schedule(&self, date: NaiveDate) -> Result<bool, ApplyError> {
        let removed_rows = self.mappings.clear(date)?;

        let mut removed_marker = false;
        for _ in 0..MAX_MARKER_DELETIONS {
            let marker = match self.markers.find_marker(date) {
                Ok(Some(marker)) => marker,
                Ok(None) => break,
                Err(MarkerError::PermissionDenied) => {
                    warn!(%date, "calendar access denied; stored rows cleared only");
                    break;
                }
                Err(err) => return Err(err.into()),
            };
            self.markers.delete_marker(marker.handle)?;
            removed_marker = true;
        }

        if removed_marker || removed_rows {
            info!(%date, "special schedule removed");
        }
        Ok(removed_marker || removed_rows)
    }
}
