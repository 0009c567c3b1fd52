use crate::classifier::{ScheduleKind, classify};
use crate::notation::{extract_bare_digits, parse_arrow_mapping, parse_multi_day_segment};
use crate::period::PeriodNumber;
use crate::reorder::PeriodReorderConfig;
use crate::weekday::LogicalWeekday;
use tracing::debug;

/// A built-in same-day template: keep periods `1..=last_period`, drop the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleTemplate {
    pub kind: ScheduleKind,
    pub last_period: u8,
}

impl ScheduleTemplate {
    pub const SHORT_A: Self = Self {
        kind: ScheduleKind::ShortA,
        last_period: 4,
    };
    pub const SHORT_B: Self = Self {
        kind: ScheduleKind::ShortB,
        last_period: 3,
    };
    pub const SHORT_C: Self = Self {
        kind: ScheduleKind::ShortC,
        last_period: 3,
    };
    pub const EXAM: Self = Self {
        kind: ScheduleKind::Exam,
        last_period: 3,
    };

    pub fn configs(&self, weekday: LogicalWeekday) -> Vec<PeriodReorderConfig> {
        vec![PeriodReorderConfig::identity(
            weekday,
            PeriodNumber::range(1, self.last_period),
        )]
    }
}

/// Turns a pattern name (or custom notation) into reorder configs for a weekday.
///
/// Output is a pure function of the input.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderConfigBuilder;

impl ReorderConfigBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, pattern_name: &str, weekday: LogicalWeekday) -> Vec<PeriodReorderConfig> {
        let kind = classify(pattern_name);
        debug!(pattern_name, %kind, weekday = weekday.index(), "building reorder configs");
        self.build_for_kind(kind, pattern_name, weekday)
    }

    pub fn build_for_kind(
        &self,
        kind: ScheduleKind,
        pattern_name: &str,
        weekday: LogicalWeekday,
    ) -> Vec<PeriodReorderConfig> {
        match kind {
            ScheduleKind::Normal => Vec::new(),
            ScheduleKind::ShortA => ScheduleTemplate::SHORT_A.configs(weekday),
            ScheduleKind::ShortB => ScheduleTemplate::SHORT_B.configs(weekday),
            ScheduleKind::ShortC => ScheduleTemplate::SHORT_C.configs(weekday),
            ScheduleKind::Exam => ScheduleTemplate::EXAM.configs(weekday),
            ScheduleKind::Custom => self.build_custom(pattern_name, weekday),
        }
    }

    /// Custom path: arrow mapping, then compact sequential mode, then bare digits.
    pub fn build_custom(&self, notation: &str, weekday: LogicalWeekday) -> Vec<PeriodReorderConfig> {
        let mapped = parse_arrow_mapping(notation);
        if !mapped.is_empty() {
            return mapped;
        }

        let sequential = sequential_configs(notation, weekday);
        if !sequential.is_empty() {
            return sequential;
        }

        let digits = extract_bare_digits(notation);
        if digits.is_empty() {
            debug!(notation, "custom notation produced no periods");
            return Vec::new();
        }
        vec![PeriodReorderConfig::identity(weekday, digits)]
    }

    /// The configs `apply` would persist for this input, with no side effects.
    pub fn preview(
        &self,
        pattern_name: &str,
        weekday: LogicalWeekday,
        custom_notation: Option<&str>,
    ) -> Vec<PeriodReorderConfig> {
        match custom_notation.map(str::trim).filter(|text| !text.is_empty()) {
            Some(notation) => self.build_custom(notation, weekday),
            None => self.build(pattern_name, weekday),
        }
    }
}

/// `月3水12` on a Friday: 月3 becomes 金1, 水1 becomes 金2, 水2 becomes 金3.
fn sequential_configs(notation: &str, weekday: LogicalWeekday) -> Vec<PeriodReorderConfig> {
    let mut next_target: u8 = 1;
    let mut configs = Vec::new();
    for segment in parse_multi_day_segment(notation) {
        let mut targets = Vec::with_capacity(segment.len());
        let mut originals = Vec::with_capacity(segment.len());
        for period in segment.periods {
            // Slots past the ninth period have nowhere to land.
            let Some(target) = PeriodNumber::new(next_target) else {
                break;
            };
            originals.push(period);
            targets.push(target);
            next_target += 1;
        }
        if originals.is_empty() {
            break;
        }
        if let Some(config) = PeriodReorderConfig::new(segment.day, weekday, originals, targets) {
            configs.push(config);
        }
    }
    configs
}
