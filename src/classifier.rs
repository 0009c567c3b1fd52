use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of schedule variants a pattern name can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleKind {
    Normal,
    ShortA,
    ShortB,
    ShortC,
    Exam,
    Custom,
}

impl ScheduleKind {
    pub const ALL: [ScheduleKind; 6] = [
        ScheduleKind::Normal,
        ScheduleKind::ShortA,
        ScheduleKind::ShortB,
        ScheduleKind::ShortC,
        ScheduleKind::Exam,
        ScheduleKind::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleKind::Normal => "normal",
            ScheduleKind::ShortA => "short_a",
            ScheduleKind::ShortB => "short_b",
            ScheduleKind::ShortC => "short_c",
            ScheduleKind::Exam => "exam",
            ScheduleKind::Custom => "custom",
        }
    }

    /// Canonical pattern name for the built-in kinds; `None` for custom.
    pub fn builtin_pattern_name(&self) -> Option<&'static str> {
        match self {
            ScheduleKind::Normal => Some("通常時程"),
            ScheduleKind::ShortA => Some("短縮A時程"),
            ScheduleKind::ShortB => Some("短縮B時程"),
            ScheduleKind::ShortC => Some("短縮C時程"),
            ScheduleKind::Exam => Some("テスト時程"),
            ScheduleKind::Custom => None,
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScheduleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or(())
    }
}

/// Priority-ordered substring rules. The first rule with a matching needle wins.
const RULES: &[(ScheduleKind, &[&str])] = &[
    (ScheduleKind::ShortA, &["短縮a"]),
    (ScheduleKind::ShortB, &["短縮b"]),
    (ScheduleKind::ShortC, &["短縮c"]),
    (ScheduleKind::Exam, &["テスト", "試験"]),
    (ScheduleKind::Normal, &["通常"]),
];

/// Classify a free-form pattern name. Matching is case-insensitive substring
/// containment; names matching no rule are [`ScheduleKind::Custom`].
pub fn classify(pattern_name: &str) -> ScheduleKind {
    let lowered = pattern_name.to_lowercase();
    RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ScheduleKind::Custom)
}

/// Built-in pattern names in picker order.
pub fn builtin_patterns() -> Vec<(ScheduleKind, &'static str)> {
    ScheduleKind::ALL
        .into_iter()
        .filter_map(|kind| kind.builtin_pattern_name().map(|name| (kind, name)))
        .collect()
}
