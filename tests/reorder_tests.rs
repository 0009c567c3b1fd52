use std::collections::HashSet;

use timetable_remap::{
    LogicalWeekday, PeriodNumber, PeriodReorderConfig, ReorderConfigBuilder, flatten_configs,
    parse_arrow_mapping, reassemble_rows, render_notation,
};

fn p(value: u8) -> PeriodNumber {
    PeriodNumber::new(value).unwrap()
}

fn tuples(configs: &[PeriodReorderConfig]) -> HashSet<(u8, u8, u8, u8)> {
    configs
        .iter()
        .flat_map(|config| {
            config.pairs().map(move |(original, target)| {
                (
                    config.original_day().index(),
                    config.target_day().index(),
                    original.get(),
                    target.get(),
                )
            })
        })
        .collect()
}

#[test]
fn constructor_rejects_mismatched_lengths() {
    let config = PeriodReorderConfig::new(
        LogicalWeekday::MONDAY,
        LogicalWeekday::TUESDAY,
        vec![p(1), p(2)],
        vec![p(1)],
    );
    assert!(config.is_none());
}

#[test]
fn deserialize_rejects_mismatched_lengths() {
    let ok = r#"{"original_day":0,"target_day":1,"original_periods":[1,2],"target_periods":[3,4]}"#;
    let bad = r#"{"original_day":0,"target_day":1,"original_periods":[1,2],"target_periods":[3]}"#;
    let parsed: PeriodReorderConfig = serde_json::from_str(ok).unwrap();
    assert_eq!(parsed.target_periods(), &[p(3), p(4)]);
    assert!(serde_json::from_str::<PeriodReorderConfig>(bad).is_err());
}

#[test]
fn flatten_produces_one_row_per_pair() {
    let configs = parse_arrow_mapping("月12345→月123水45");
    let rows = flatten_configs(&configs, "カスタム");
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|row| row.pattern_name == "カスタム"));
    assert_eq!(rows[3].original_period, p(4));
    assert_eq!(rows[3].target_day, LogicalWeekday::WEDNESDAY);
}

#[test]
fn reassemble_restores_flattened_configs() {
    let builder = ReorderConfigBuilder::new();
    let configs = builder.build("短縮B時程", LogicalWeekday::WEDNESDAY);
    let rows = flatten_configs(&configs, "短縮B時程");
    assert_eq!(tuples(&reassemble_rows(&rows)), tuples(&configs));

    let configs = parse_arrow_mapping("月123→月12水3\n火45→金45");
    let rows = flatten_configs(&configs, "custom");
    let reassembled = reassemble_rows(&rows);
    assert_eq!(reassembled, configs);
}

#[test]
fn reassemble_groups_by_day_pair_in_first_encounter_order() {
    let configs = parse_arrow_mapping("月1→火1\n水2→木2\n月3→火3");
    let rows = flatten_configs(&configs, "x");
    let reassembled = reassemble_rows(&rows);
    assert_eq!(reassembled.len(), 2);
    assert_eq!(reassembled[0].original_day(), LogicalWeekday::MONDAY);
    assert_eq!(reassembled[0].original_periods(), &[p(1), p(3)]);
    assert_eq!(reassembled[1].original_day(), LogicalWeekday::WEDNESDAY);
}

#[test]
fn render_notation_parses_back() {
    let configs = parse_arrow_mapping("月123→火123\n水45→金67");
    let rendered = render_notation(&configs);
    assert_eq!(rendered, "月123→火123\n水45→金67");
    assert_eq!(parse_arrow_mapping(&rendered), configs);
    assert_eq!(render_notation(&[]), "");
}
