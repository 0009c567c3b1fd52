use crate::period::PeriodNumber;
use crate::weekday::LogicalWeekday;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One weekday glyph followed by the periods written after it, in encounter order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSegment {
    pub day: LogicalWeekday,
    pub periods: Vec<PeriodNumber>,
}

impl ReorderSegment {
    pub fn new(day: LogicalWeekday) -> Self {
        Self {
            day,
            periods: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }
}

/// Copies `original_periods[i]` of `original_day` into `target_periods[i]` of `target_day`.
///
/// Both period lists always have the same length; the constructor refuses
/// anything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawReorderConfig")]
pub struct PeriodReorderConfig {
    original_day: LogicalWeekday,
    target_day: LogicalWeekday,
    original_periods: Vec<PeriodNumber>,
    target_periods: Vec<PeriodNumber>,
}

#[derive(Deserialize)]
struct RawReorderConfig {
    original_day: LogicalWeekday,
    target_day: LogicalWeekday,
    original_periods: Vec<PeriodNumber>,
    target_periods: Vec<PeriodNumber>,
}

impl TryFrom<RawReorderConfig> for PeriodReorderConfig {
    type Error = String;

    fn try_from(raw: RawReorderConfig) -> Result<Self, Self::Error> {
        let (original, target) = (raw.original_periods.len(), raw.target_periods.len());
        Self::new(
            raw.original_day,
            raw.target_day,
            raw.original_periods,
            raw.target_periods,
        )
        .ok_or_else(|| {
            format!("original_periods has {original} entries but target_periods has {target}")
        })
    }
}

impl PeriodReorderConfig {
    pub fn new(
        original_day: LogicalWeekday,
        target_day: LogicalWeekday,
        original_periods: Vec<PeriodNumber>,
        target_periods: Vec<PeriodNumber>,
    ) -> Option<Self> {
        if original_periods.len() != target_periods.len() {
            return None;
        }
        Some(Self {
            original_day,
            target_day,
            original_periods,
            target_periods,
        })
    }

    /// Same day, same periods: keeps the listed periods and drops the rest.
    pub fn identity(day: LogicalWeekday, periods: Vec<PeriodNumber>) -> Self {
        Self {
            original_day: day,
            target_day: day,
            target_periods: periods.clone(),
            original_periods: periods,
        }
    }

    pub fn original_day(&self) -> LogicalWeekday {
        self.original_day
    }

    pub fn target_day(&self) -> LogicalWeekday {
        self.target_day
    }

    pub fn original_periods(&self) -> &[PeriodNumber] {
        &self.original_periods
    }

    pub fn target_periods(&self) -> &[PeriodNumber] {
        &self.target_periods
    }

    pub fn len(&self) -> usize {
        self.original_periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.original_periods.is_empty()
    }

    /// `(original, target)` period pairs in index order.
    pub fn pairs(&self) -> impl Iterator<Item = (PeriodNumber, PeriodNumber)> + '_ {
        self.original_periods
            .iter()
            .copied()
            .zip(self.target_periods.iter().copied())
    }

    fn push_pair(&mut self, original: PeriodNumber, target: PeriodNumber) {
        self.original_periods.push(original);
        self.target_periods.push(target);
    }
}

/// Flattened, durable form of one period pair of a [`PeriodReorderConfig`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MappingRow {
    pub original_day: LogicalWeekday,
    pub target_day: LogicalWeekday,
    pub original_period: PeriodNumber,
    pub target_period: PeriodNumber,
    pub pattern_name: String,
}

/// Everything stored for one special-schedule date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialScheduleRecord {
    pub date: NaiveDate,
    pub pattern_name: String,
    pub rows: Vec<MappingRow>,
}

pub fn flatten_configs(configs: &[PeriodReorderConfig], pattern_name: &str) -> Vec<MappingRow> {
    configs
        .iter()
        .flat_map(|config| {
            config.pairs().map(move |(original, target)| MappingRow {
                original_day: config.original_day,
                target_day: config.target_day,
                original_period: original,
                target_period: target,
                pattern_name: pattern_name.to_string(),
            })
        })
        .collect()
}

/// Group rows back into configs keyed by `(original_day, target_day)`.
///
/// Groups appear in first-encounter order and period pairs are concatenated
/// in row order.
pub fn reassemble_rows(rows: &[MappingRow]) -> Vec<PeriodReorderConfig> {
    let mut configs: Vec<PeriodReorderConfig> = Vec::new();
    for row in rows {
        let existing = configs.iter_mut().find(|config| {
            config.original_day == row.original_day && config.target_day == row.target_day
        });
        match existing {
            Some(config) => config.push_pair(row.original_period, row.target_period),
            None => configs.push(PeriodReorderConfig {
                original_day: row.original_day,
                target_day: row.target_day,
                original_periods: vec![row.original_period],
                target_periods: vec![row.target_period],
            }),
        }
    }
    configs
}

/// Render configs as arrow notation, one `月123→火123` line per config.
pub fn render_notation(configs: &[PeriodReorderConfig]) -> String {
    configs
        .iter()
        .map(|config| {
            let mut line = String::new();
            line.push(config.original_day.glyph());
            for period in &config.original_periods {
                line.push_str(&period.to_string());
            }
            line.push('→');
            line.push(config.target_day.glyph());
            for period in &config.target_periods {
                line.push_str(&period.to_string());
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}
