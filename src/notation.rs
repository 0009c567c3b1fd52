//! Parser for the compact day+period notation.
//!
//! A weekday glyph (月 火 水 木 金 土 日) opens a segment and the digits 1-9
//! written after it are that day's periods: `月123水45`. A mapping line puts a
//! single source segment on the left of `→` and one or more target segments on
//! the right: `月12345→月123水45`. Every function here is total; malformed
//! input yields an empty or shorter result, never an error.

use crate::period::PeriodNumber;
use crate::reorder::{PeriodReorderConfig, ReorderSegment};
use crate::weekday::LogicalWeekday;
use tracing::debug;

pub const ARROW: char = '→';

/// Parse text whose first character is a weekday glyph.
///
/// Every later digit 1-9 is a period of that day; other characters, including
/// further weekday glyphs, are ignored.
pub fn parse_single_day_segment(text: &str) -> Option<ReorderSegment> {
    let mut chars = text.chars();
    let day = chars.next().and_then(LogicalWeekday::from_glyph)?;
    let mut segment = ReorderSegment::new(day);
    segment
        .periods
        .extend(chars.filter_map(PeriodNumber::from_digit));
    Some(segment)
}

/// Split text into one segment per weekday glyph.
///
/// Digits before the first glyph and glyphs with no periods are dropped.
pub fn parse_multi_day_segment(text: &str) -> Vec<ReorderSegment> {
    let mut segments = Vec::new();
    let mut current: Option<ReorderSegment> = None;

    for ch in text.chars() {
        if let Some(day) = LogicalWeekday::from_glyph(ch) {
            if let Some(done) = current.take() {
                if !done.is_empty() {
                    segments.push(done);
                }
            }
            current = Some(ReorderSegment::new(day));
        } else if let Some(period) = PeriodNumber::from_digit(ch) {
            if let Some(segment) = current.as_mut() {
                segment.periods.push(period);
            }
        }
    }

    if let Some(done) = current {
        if !done.is_empty() {
            segments.push(done);
        }
    }
    segments
}

/// Parse one or more `source→targets` lines into reorder configs.
///
/// When the target segments together hold exactly as many periods as the
/// source, the source periods are dealt out across them in order
/// (`月123→月12水3`). Otherwise each target segment whose length equals the
/// source length receives the whole source (`月12→火12水12`) and the others
/// are dropped.
pub fn parse_arrow_mapping(text: &str) -> Vec<PeriodReorderConfig> {
    let mut configs = Vec::new();
    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let Some((left, right)) = line.split_once(ARROW) else {
            debug!(line, "mapping line has no arrow");
            continue;
        };
        let Some(source) = parse_single_day_segment(left.trim()) else {
            debug!(line, "mapping line has no source weekday");
            continue;
        };
        let targets = parse_multi_day_segment(right.trim());
        if targets.is_empty() {
            debug!(line, "mapping line has no target segments");
            continue;
        }
        configs.extend(pair_line(&source, &targets, line));
    }
    configs
}

fn pair_line(
    source: &ReorderSegment,
    targets: &[ReorderSegment],
    line: &str,
) -> Vec<PeriodReorderConfig> {
    let total: usize = targets.iter().map(ReorderSegment::len).sum();
    let mut configs = Vec::with_capacity(targets.len());

    if total == source.len() {
        let mut offset = 0;
        for target in targets {
            let originals = source.periods[offset..offset + target.len()].to_vec();
            offset += target.len();
            if let Some(config) =
                PeriodReorderConfig::new(source.day, target.day, originals, target.periods.clone())
            {
                configs.push(config);
            }
        }
        return configs;
    }

    for target in targets {
        if target.len() != source.len() {
            debug!(
                line,
                source_periods = source.len(),
                target_periods = target.len(),
                "dropping target segment with mismatched period count"
            );
            continue;
        }
        if let Some(config) = PeriodReorderConfig::new(
            source.day,
            target.day,
            source.periods.clone(),
            target.periods.clone(),
        ) {
            configs.push(config);
        }
    }
    configs
}

/// Every digit 1-9 in the text, in order. Last-resort extractor for input
/// that carries no weekday glyphs.
pub fn extract_bare_digits(text: &str) -> Vec<PeriodNumber> {
    text.chars().filter_map(PeriodNumber::from_digit).collect()
}
