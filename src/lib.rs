pub mod builder;
pub mod classifier;
pub mod config;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod logging;
pub mod marker;
pub mod notation;
pub mod period;
pub mod persistence;
pub mod reconstructor;
pub mod reorder;
pub mod timetable;
pub mod weekday;

pub use builder::{ReorderConfigBuilder, ScheduleTemplate};
pub use classifier::{ScheduleKind, builtin_patterns, classify};
pub use config::{ConfigError, EngineConfig};
pub use marker::{
    CalendarEvent, Marker, MarkerError, MarkerEventGateway, MarkerHandle, MemoryMarkerGateway,
};
pub use notation::{
    extract_bare_digits, parse_arrow_mapping, parse_multi_day_segment, parse_single_day_segment,
};
pub use period::PeriodNumber;
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    MappingStore, MemoryMappingStore, PersistenceError, PersistenceResult, TimetableRepository,
    load_timetable_from_csv, load_timetable_from_json, save_timetable_to_csv,
    save_timetable_to_json, validate_entries,
};
pub use reconstructor::{ApplyError, ScheduleReconstructor, normalize_date};
pub use reorder::{
    MappingRow, PeriodReorderConfig, ReorderSegment, SpecialScheduleRecord, flatten_configs,
    reassemble_rows, render_notation,
};
pub use timetable::{BaseTimetableEntry, ReconstructedEntry, Timetable, sort_by_period};
pub use weekday::{CalendarWeekday, LogicalWeekday};
