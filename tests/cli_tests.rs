#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::prelude::*;

#[allow(deprecated)]
fn cli() -> Command {
    let mut cmd = Command::cargo_bin("cli").unwrap();
    cmd.arg(":memory:").env_remove("TIMETABLE_REMAP_CONFIG");
    cmd
}

#[test]
fn help_and_unknown_commands() {
    cli()
        .write_stdin("help\nfrobnicate\nquit\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply <YYYY-MM-DD> <pattern...>"))
        .stdout(predicate::str::contains("Unknown command. Type 'help'."));
}

#[test]
fn classify_and_parse() {
    cli()
        .write_stdin("classify 短縮a時程\nparse 月123→月12水3\nparse 月123\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Kind: short_a"))
        .stdout(predicate::str::contains("Parsed 2 mapping(s):\n月12→月12\n月3→水3"))
        .stdout(predicate::str::contains("No mappings parsed."));
}

#[test]
fn apply_show_and_remove_round_trip() {
    let script = "\
timetable set 月 1 Math 101
timetable set 月 2 English
timetable set 月 3 Science
timetable set 月 4 History
apply 2025-01-06 テスト時程
show 2025-01-06
specials 2025-01-01 2025-01-31
remove 2025-01-06
remove 2025-01-06
exit
";
    cli()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Entry 月1 set."))
        .stdout(predicate::str::contains("Special schedule applied to 2025-01-06."))
        .stdout(predicate::str::contains("(月3)"))
        .stdout(predicate::str::contains("History").not())
        .stdout(predicate::str::contains("2025-01-06 テスト時程"))
        .stdout(predicate::str::contains("Special schedule removed from 2025-01-06."))
        .stdout(predicate::str::contains("No special schedule on 2025-01-06."));
}

#[test]
fn normal_pattern_reports_nothing_to_remap() {
    cli()
        .write_stdin("apply 2025-01-06 通常時程\n")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Marker set for 2025-01-06 but nothing to remap.",
        ));
}

#[test]
fn timetable_save_and_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timetable.csv");
    let script = format!(
        "timetable set 金 2 Art\ntimetable save csv {p}\ntimetable remove 金 2\ntimetable load csv {p}\ntimetable show\n",
        p = path.display()
    );
    cli()
        .write_stdin(script)
        .assert()
        .success()
        .stdout(predicate::str::contains("Timetable saved to"))
        .stdout(predicate::str::contains("Entry 金2 removed."))
        .stdout(predicate::str::contains("Timetable loaded from"))
        .stdout(predicate::str::contains("| Art"));
}
