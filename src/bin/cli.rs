use chrono::NaiveDate;
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use timetable_remap::{
    BaseTimetableEntry, EngineConfig, LogicalWeekday, ReconstructedEntry, ScheduleReconstructor,
    SqliteStore, builtin_patterns, classify, load_timetable_from_csv,
    load_timetable_from_json, logging, parse_arrow_mapping, render_notation,
    save_timetable_to_csv, save_timetable_to_json, sort_by_period,
};

fn render_row<'a>(widths: &[usize], cells: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (ci, cell) in cells.enumerate() {
        line.push(' ');
        line.push_str(cell);
        line.push_str(&" ".repeat(widths[ci].saturating_sub(cell.chars().count())));
        line.push_str(" |");
    }
    line
}

fn render_text_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (ci, cell) in row.iter().enumerate() {
            widths[ci] = widths[ci].max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(*w + 2));
        sep.push('+');
    }

    let mut out = String::new();
    out.push_str(&sep);
    out.push('\n');
    out.push_str(&render_row(&widths, headers.iter().copied()));
    out.push('\n');
    out.push_str(&sep);
    out.push('\n');
    for row in rows {
        out.push_str(&render_row(&widths, row.iter().map(String::as_str)));
        out.push('\n');
    }
    out.push_str(&sep);
    out
}

fn render_day(entries: &[ReconstructedEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.period.to_string(),
                entry.subject.clone(),
                entry.room.clone().unwrap_or_default(),
                entry.original_info.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_text_table(&["period", "subject", "room", "from"], &rows)
}

fn render_timetable(entries: &[BaseTimetableEntry]) -> String {
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|entry| {
            vec![
                entry.day.glyph().to_string(),
                entry.period.to_string(),
                entry.subject.clone(),
                entry.room.clone().unwrap_or_default(),
                entry.color.clone().unwrap_or_default(),
            ]
        })
        .collect();
    render_text_table(&["day", "period", "subject", "room", "color"], &rows)
}

fn print_help() {
    println!(
        "Commands:\n  help                                   Show this help\n  patterns                               List built-in schedule patterns\n  classify <name...>                     Show the schedule kind for a pattern name\n  parse <notation>                       Parse arrow notation (use '|' between lines)\n  preview <YYYY-MM-DD> <pattern...>      Show the remapping a pattern would produce\n  timetable show                         Show the base weekly timetable\n  timetable set <day> <period> <subject> [room] [color]\n                                         Upsert a base entry (day is 月..日)\n  timetable remove <day> <period>        Remove a base entry\n  timetable load <json|csv> <path>       Replace the base timetable from disk\n  timetable save <json|csv> <path>       Write the base timetable to disk\n  apply <YYYY-MM-DD> <pattern...>        Apply a named special schedule\n  custom <YYYY-MM-DD> <notation>         Apply custom notation (use '|' between lines)\n  remove <YYYY-MM-DD>                    Remove the special schedule for a date\n  show <YYYY-MM-DD>                      Show the effective schedule for a date\n  specials <start> <end>                 List dates with special schedules\n  quit|exit                              Exit"
    );
}

fn parse_date(input: Option<&str>) -> Option<NaiveDate> {
    input.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

fn parse_day(input: &str) -> Option<LogicalWeekday> {
    let mut chars = input.chars();
    match (chars.next(), chars.next()) {
        (Some(glyph), None) => LogicalWeekday::from_glyph(glyph),
        _ => None,
    }
}

fn notation_arg(rest: Vec<&str>) -> String {
    rest.join(" ").replace('|', "\n")
}

fn open_engine() -> Result<ScheduleReconstructor, Box<dyn std::error::Error>> {
    let mut config = EngineConfig::load(None)?;
    if let Some(path) = env::args().nth(1) {
        config.database_path = PathBuf::from(path);
    }
    let store = if config.is_in_memory() {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::new(&config.database_path)?
    };
    let store = Arc::new(store.with_marker_prefix(config.marker_prefix.clone()));
    Ok(ScheduleReconstructor::new(store.clone(), store.clone(), store))
}

fn handle_timetable<'a>(engine: &ScheduleReconstructor, mut parts: impl Iterator<Item = &'a str>) {
    let timetable = engine.timetable();
    match parts.next() {
        Some("show") | None => match timetable.all_entries() {
            Ok(entries) => println!("{}", render_timetable(&entries)),
            Err(e) => println!("Error reading timetable: {}", e),
        },
        Some("set") => {
            let day = parts.next().and_then(parse_day);
            let period = parts.next().and_then(|p| p.parse::<u8>().ok());
            let subject = parts.next();
            match (day, period, subject) {
                (Some(day), Some(period), Some(subject)) => {
                    let mut entry = BaseTimetableEntry::new(day.to_calendar(), period, subject);
                    entry.room = parts.next().map(str::to_string);
                    entry.color = parts.next().map(str::to_string);
                    let result = timetable.all_entries().and_then(|mut entries| {
                        entries.retain(|e| !(e.day == entry.day && e.period == entry.period));
                        entries.push(entry);
                        timetable.replace_entries(entries)
                    });
                    match result {
                        Ok(_) => println!("Entry {}{} set.", day, period),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: timetable set <day> <period> <subject> [room] [color]"),
            }
        }
        Some("remove") => {
            let day = parts.next().and_then(parse_day);
            let period = parts.next().and_then(|p| p.parse::<u8>().ok());
            match (day, period) {
                (Some(day), Some(period)) => {
                    let calendar_day = day.to_calendar();
                    let result = timetable.all_entries().and_then(|mut entries| {
                        let before = entries.len();
                        entries.retain(|e| !(e.day == calendar_day && e.period == period));
                        let removed = entries.len() != before;
                        timetable.replace_entries(entries).map(|_| removed)
                    });
                    match result {
                        Ok(true) => println!("Entry {}{} removed.", day, period),
                        Ok(false) => println!("Entry {}{} not found.", day, period),
                        Err(e) => println!("Error: {}", e),
                    }
                }
                _ => println!("Usage: timetable remove <day> <period>"),
            }
        }
        Some("load") => {
            let loaded = match (parts.next(), parts.next()) {
                (Some("json"), Some(path)) => Some((path, load_timetable_from_json(path))),
                (Some("csv"), Some(path)) => Some((path, load_timetable_from_csv(path))),
                _ => None,
            };
            match loaded {
                Some((path, Ok(entries))) => match timetable.replace_entries(entries) {
                    Ok(_) => println!("Timetable loaded from {}.", path),
                    Err(e) => println!("Error storing timetable: {}", e),
                },
                Some((_, Err(e))) => println!("Error loading timetable: {}", e),
                None => println!("Usage: timetable load <json|csv> <path>"),
            }
        }
        Some("save") => {
            let fmt = parts.next();
            let path = parts.next();
            let entries = match timetable.all_entries() {
                Ok(entries) => entries,
                Err(e) => {
                    println!("Error reading timetable: {}", e);
                    return;
                }
            };
            let result = match (fmt, path) {
                (Some("json"), Some(path)) => Some((path, save_timetable_to_json(&entries, path))),
                (Some("csv"), Some(path)) => Some((path, save_timetable_to_csv(&entries, path))),
                _ => None,
            };
            match result {
                Some((path, Ok(_))) => println!("Timetable saved to {}.", path),
                Some((_, Err(e))) => println!("Error saving timetable: {}", e),
                None => println!("Usage: timetable save <json|csv> <path>"),
            }
        }
        Some(other) => {
            println!("Unknown timetable command '{}'.", other);
            println!("Usage: timetable show|set|remove|load|save ...");
        }
    }
}

fn main() {
    if let Err(e) = logging::init_logging("warn") {
        eprintln!("Logging disabled: {}", e);
    }
    let engine = match open_engine() {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Failed to open timetable store: {}", e);
            std::process::exit(1);
        }
    };

    println!("Timetable Remap (CLI) - type 'help' for commands\n");

    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");

        match cmd {
            "help" => print_help(),
            "quit" | "exit" => break,
            "patterns" => {
                println!("Built-in patterns:");
                for (kind, name) in builtin_patterns() {
                    println!("  {:<10} {}", kind.as_str(), name);
                }
            }
            "classify" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: classify <name...>");
                    continue;
                }
                println!("Kind: {}", classify(&rest.join(" ")));
            }
            "parse" => {
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: parse <notation>");
                    continue;
                }
                let configs = parse_arrow_mapping(&notation_arg(rest));
                if configs.is_empty() {
                    println!("No mappings parsed.");
                } else {
                    println!("Parsed {} mapping(s):\n{}", configs.len(), render_notation(&configs));
                }
            }
            "preview" => {
                let Some(date) = parse_date(parts.next()) else {
                    println!("Usage: preview <YYYY-MM-DD> <pattern...>");
                    continue;
                };
                let rest: Vec<&str> = parts.collect();
                let configs = engine
                    .builder()
                    .build(&rest.join(" "), LogicalWeekday::of_date(date));
                if configs.is_empty() {
                    println!("No remapping (normal schedule).");
                } else {
                    println!("{}", render_notation(&configs));
                }
            }
            "timetable" => handle_timetable(&engine, parts),
            "apply" | "custom" => {
                let Some(date) = parse_date(parts.next()) else {
                    println!("Usage: {} <YYYY-MM-DD> <pattern...>", cmd);
                    continue;
                };
                let rest: Vec<&str> = parts.collect();
                if rest.is_empty() {
                    println!("Usage: {} <YYYY-MM-DD> <pattern...>", cmd);
                    continue;
                }
                let result = if cmd == "custom" {
                    let notation = notation_arg(rest);
                    engine.apply_special_schedule(date, &notation, Some(notation.as_str()))
                } else {
                    engine.apply_special_schedule(date, &rest.join(" "), None)
                };
                match result {
                    Ok(true) => println!("Special schedule applied to {}.", date),
                    Ok(false) => println!("Marker set for {} but nothing to remap.", date),
                    Err(e) => println!("Error applying special schedule: {}", e),
                }
            }
            "remove" => match parse_date(parts.next()) {
                Some(date) => match engine.remove_special_schedule(date) {
                    Ok(true) => println!("Special schedule removed from {}.", date),
                    Ok(false) => println!("No special schedule on {}.", date),
                    Err(e) => println!("Error removing special schedule: {}", e),
                },
                None => println!("Usage: remove <YYYY-MM-DD>"),
            },
            "show" => match parse_date(parts.next()) {
                Some(date) => {
                    let mut entries = engine.effective_schedule(date);
                    sort_by_period(&mut entries);
                    println!("{} ({})", date, LogicalWeekday::of_date(date));
                    println!("{}", render_day(&entries));
                }
                None => println!("Usage: show <YYYY-MM-DD>"),
            },
            "specials" => match (parse_date(parts.next()), parse_date(parts.next())) {
                (Some(start), Some(end)) => match engine.mappings().special_dates(start, end) {
                    Ok(dates) if dates.is_empty() => println!("No special schedules."),
                    Ok(dates) => {
                        for date in dates {
                            let name = engine
                                .mappings()
                                .record(date)
                                .ok()
                                .flatten()
                                .map(|record| record.pattern_name)
                                .unwrap_or_default();
                            println!("  {} {}", date, name.replace('\n', " | "));
                        }
                    }
                    Err(e) => println!("Error listing special schedules: {}", e),
                },
                _ => println!("Usage: specials <YYYY-MM-DD> <YYYY-MM-DD>"),
            },
            _ => {
                println!("Unknown command. Type 'help'.");
            }
        }
    }
}
