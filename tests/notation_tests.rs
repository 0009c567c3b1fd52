use timetable_remap::{
    LogicalWeekday, PeriodNumber, extract_bare_digits, parse_arrow_mapping,
    parse_multi_day_segment, parse_single_day_segment,
};

fn periods(values: &[u8]) -> Vec<PeriodNumber> {
    values
        .iter()
        .map(|v| PeriodNumber::new(*v).unwrap())
        .collect()
}

#[test]
fn single_day_segment_keeps_encounter_order_and_duplicates() {
    let segment = parse_single_day_segment("火3113").expect("segment");
    assert_eq!(segment.day, LogicalWeekday::TUESDAY);
    assert_eq!(segment.periods, periods(&[3, 1, 1, 3]));
}

#[test]
fn single_day_segment_ignores_zero_and_later_glyphs() {
    let segment = parse_single_day_segment("月10水2").expect("segment");
    assert_eq!(segment.day, LogicalWeekday::MONDAY);
    assert_eq!(segment.periods, periods(&[1, 2]));
}

#[test]
fn single_day_segment_requires_leading_glyph() {
    assert!(parse_single_day_segment("123").is_none());
    assert!(parse_single_day_segment("").is_none());
    assert!(parse_single_day_segment(" 月1").is_none());
}

#[test]
fn multi_day_segment_single_day() {
    let segments = parse_multi_day_segment("月12345");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].day, LogicalWeekday::MONDAY);
    assert_eq!(segments[0].periods, periods(&[1, 2, 3, 4, 5]));
}

#[test]
fn multi_day_segment_splits_on_glyphs() {
    let segments = parse_multi_day_segment("月123水45");
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].day.index(), 0);
    assert_eq!(segments[0].periods, periods(&[1, 2, 3]));
    assert_eq!(segments[1].day.index(), 2);
    assert_eq!(segments[1].periods, periods(&[4, 5]));
}

#[test]
fn multi_day_segment_drops_leading_digits_and_empty_days() {
    let segments = parse_multi_day_segment("12月火3 x 日");
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].day, LogicalWeekday::TUESDAY);
    assert_eq!(segments[0].periods, periods(&[3]));
}

#[test]
fn multi_day_segment_of_garbage_is_empty() {
    assert!(parse_multi_day_segment("").is_empty());
    assert!(parse_multi_day_segment("abc 0").is_empty());
}

#[test]
fn arrow_mapping_splits_source_across_targets() {
    let configs = parse_arrow_mapping("月12345→月123水45");
    assert_eq!(configs.len(), 2);
    for config in &configs {
        assert_eq!(config.original_periods().len(), config.target_periods().len());
    }
    let total: usize = configs.iter().map(|c| c.len()).sum();
    assert_eq!(total, 5);

    assert_eq!(configs[0].original_periods(), periods(&[1, 2, 3]).as_slice());
    assert_eq!(configs[0].target_day(), LogicalWeekday::MONDAY);
    assert_eq!(configs[1].original_periods(), periods(&[4, 5]).as_slice());
    assert_eq!(configs[1].target_day(), LogicalWeekday::WEDNESDAY);
    assert_eq!(configs[1].target_periods(), periods(&[4, 5]).as_slice());
}

#[test]
fn arrow_mapping_uneven_split() {
    let configs = parse_arrow_mapping("月123→月12水3");
    assert_eq!(configs.len(), 2);

    assert_eq!(configs[0].original_day().index(), 0);
    assert_eq!(configs[0].target_day().index(), 0);
    assert_eq!(configs[0].original_periods(), periods(&[1, 2]).as_slice());
    assert_eq!(configs[0].target_periods(), periods(&[1, 2]).as_slice());

    assert_eq!(configs[1].original_day().index(), 0);
    assert_eq!(configs[1].target_day().index(), 2);
    assert_eq!(configs[1].original_periods(), periods(&[3]).as_slice());
    assert_eq!(configs[1].target_periods(), periods(&[3]).as_slice());
}

#[test]
fn arrow_mapping_broadcasts_equal_length_targets() {
    let configs = parse_arrow_mapping("月12→火34水56木7");
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].target_day(), LogicalWeekday::TUESDAY);
    assert_eq!(configs[0].original_periods(), periods(&[1, 2]).as_slice());
    assert_eq!(configs[0].target_periods(), periods(&[3, 4]).as_slice());
    assert_eq!(configs[1].target_day(), LogicalWeekday::WEDNESDAY);
    assert_eq!(configs[1].target_periods(), periods(&[5, 6]).as_slice());
}

#[test]
fn arrow_mapping_reads_multiple_lines_and_skips_bad_ones() {
    let text = "  月12 → 火12  \nnot a mapping\n金1→\n\n水3→木5\n3→月1";
    let configs = parse_arrow_mapping(text);
    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].original_day(), LogicalWeekday::MONDAY);
    assert_eq!(configs[0].target_day(), LogicalWeekday::TUESDAY);
    assert_eq!(configs[1].original_day(), LogicalWeekday::WEDNESDAY);
    assert_eq!(configs[1].target_day(), LogicalWeekday::THURSDAY);
    assert_eq!(configs[1].target_periods(), periods(&[5]).as_slice());
}

#[test]
fn arrow_mapping_without_arrow_is_empty() {
    assert!(parse_arrow_mapping("月123水45").is_empty());
    assert!(parse_arrow_mapping("").is_empty());
}

#[test]
fn bare_digits_skip_zero_and_text() {
    assert_eq!(extract_bare_digits("1, 2, 0, 10 and 4"), periods(&[1, 2, 1, 4]));
    assert!(extract_bare_digits("no periods").is_empty());
}
