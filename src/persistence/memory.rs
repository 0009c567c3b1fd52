use super::{MappingStore, PersistenceResult};
use crate::reorder::{MappingRow, PeriodReorderConfig, SpecialScheduleRecord, flatten_configs};
use chrono::NaiveDate;
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Process-local [`MappingStore`]. The whole record for a date is swapped
/// under one write lock.
#[derive(Debug, Default)]
pub struct MemoryMappingStore {
    records: RwLock<BTreeMap<NaiveDate, SpecialScheduleRecord>>,
}

impl MemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MappingStore for MemoryMappingStore {
    fn replace(
        &self,
        date: NaiveDate,
        configs: &[PeriodReorderConfig],
        pattern_name: &str,
    ) -> PersistenceResult<()> {
        let record = SpecialScheduleRecord {
            date,
            pattern_name: pattern_name.to_string(),
            rows: flatten_configs(configs, pattern_name),
        };
        self.records.write().insert(date, record);
        Ok(())
    }

    fn rows_for_date(&self, date: NaiveDate) -> PersistenceResult<Vec<MappingRow>> {
        Ok(self
            .records
            .read()
            .get(&date)
            .map(|record| record.rows.clone())
            .unwrap_or_default())
    }

    fn clear(&self, date: NaiveDate) -> PersistenceResult<bool> {
        Ok(self.records.write().remove(&date).is_some())
    }

    fn record(&self, date: NaiveDate) -> PersistenceResult<Option<SpecialScheduleRecord>> {
        Ok(self.records.read().get(&date).cloned())
    }

    fn special_dates(&self, start: NaiveDate, end: NaiveDate) -> PersistenceResult<Vec<NaiveDate>> {
        if start > end {
            return Ok(Vec::new());
        }
        Ok(self.records.read().range(start..=end).map(|(date, _)| *date).collect())
    }
}
