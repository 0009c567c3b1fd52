use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    ApplyError, BaseTimetableEntry, LogicalWeekday, MarkerError, PeriodReorderConfig,
    PersistenceError, ReconstructedEntry, ScheduleKind, ScheduleReconstructor, builtin_patterns,
    classify, render_notation, sort_by_period,
};

#[derive(Clone)]
pub struct AppState {
    engine: Arc<ScheduleReconstructor>,
}

impl AppState {
    pub fn new(engine: ScheduleReconstructor) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    pub fn with_shared(engine: Arc<ScheduleReconstructor>) -> Self {
        Self { engine }
    }

    fn engine(&self) -> Arc<ScheduleReconstructor> {
        self.engine.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Forbidden(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        match value {
            PersistenceError::InvalidData(message) => ApiError::Invalid(message),
            PersistenceError::NotFound => ApiError::NotFound("no timetable stored".to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<ApplyError> for ApiError {
    fn from(value: ApplyError) -> Self {
        match value {
            ApplyError::Marker(MarkerError::PermissionDenied) => {
                ApiError::Forbidden("calendar access was denied".to_string())
            }
            ApplyError::Store(err) => ApiError::from(err),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Forbidden(message) => (StatusCode::FORBIDDEN, "forbidden", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::invalid(format!("invalid date '{raw}' (expected YYYY-MM-DD)")))
}

#[derive(Debug, Serialize)]
struct PatternBody {
    kind: ScheduleKind,
    pattern_name: &'static str,
}

#[derive(Debug, Deserialize)]
struct ClassifyPayload {
    pattern_name: String,
}

#[derive(Debug, Deserialize)]
struct PreviewPayload {
    pattern_name: String,
    #[serde(default)]
    weekday: Option<LogicalWeekday>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    custom_notation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewBody {
    pub kind: ScheduleKind,
    pub configs: Vec<PeriodReorderConfig>,
    pub notation: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DayScheduleBody {
    pub date: NaiveDate,
    pub special: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_name: Option<String>,
    pub entries: Vec<ReconstructedEntry>,
}

#[derive(Debug, Deserialize)]
struct ApplyPayload {
    pattern_name: String,
    #[serde(default)]
    custom_notation: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApplyBody {
    pub applied: bool,
    pub configs: Vec<PeriodReorderConfig>,
}

#[derive(Debug, Deserialize)]
struct RangeQuery {
    start: String,
    end: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patterns", get(list_patterns))
        .route("/classify", post(classify_pattern))
        .route("/preview", post(preview))
        .route("/timetable", get(get_timetable).put(replace_timetable))
        .route("/schedule/:date", get(get_schedule))
        .route(
            "/schedule/:date/special",
            put(apply_special).delete(remove_special),
        )
        .route("/specials", get(list_specials))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, engine: ScheduleReconstructor) -> std::io::Result<()> {
    let app = router(AppState::new(engine));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_patterns() -> Json<Vec<PatternBody>> {
    Json(
        builtin_patterns()
            .into_iter()
            .map(|(kind, pattern_name)| PatternBody { kind, pattern_name })
            .collect(),
    )
}

async fn classify_pattern(Json(payload): Json<ClassifyPayload>) -> impl IntoResponse {
    Json(json!({ "kind": classify(&payload.pattern_name) }))
}

async fn preview(
    State(state): State<AppState>,
    Json(payload): Json<PreviewPayload>,
) -> Result<Json<PreviewBody>, ApiError> {
    let weekday = match (payload.weekday, payload.date) {
        (Some(weekday), _) => weekday,
        (None, Some(date)) => LogicalWeekday::of_date(date),
        (None, None) => return Err(ApiError::invalid("preview requires a weekday or a date")),
    };
    let custom = payload.custom_notation.as_deref();
    let kind = match custom.map(str::trim) {
        Some(text) if !text.is_empty() => ScheduleKind::Custom,
        _ => classify(&payload.pattern_name),
    };
    let configs = state
        .engine()
        .builder()
        .preview(&payload.pattern_name, weekday, custom);
    let notation = render_notation(&configs);
    Ok(Json(PreviewBody {
        kind,
        configs,
        notation,
    }))
}

async fn get_timetable(
    State(state): State<AppState>,
) -> Result<Json<Vec<BaseTimetableEntry>>, ApiError> {
    let entries = state.engine().timetable().all_entries()?;
    Ok(Json(entries))
}

async fn replace_timetable(
    State(state): State<AppState>,
    Json(entries): Json<Vec<BaseTimetableEntry>>,
) -> Result<Json<Vec<BaseTimetableEntry>>, ApiError> {
    let engine = state.engine();
    engine.timetable().replace_entries(entries)?;
    Ok(Json(engine.timetable().all_entries()?))
}

async fn get_schedule(
    State(state): State<AppState>,
    Path(raw_date): Path<String>,
) -> Result<Json<DayScheduleBody>, ApiError> {
    let date = parse_date(&raw_date)?;
    let engine = state.engine();
    let mut entries = engine.effective_schedule(date);
    sort_by_period(&mut entries);
    let pattern_name = engine
        .mappings()
        .record(date)
        .ok()
        .flatten()
        .map(|record| record.pattern_name);
    Ok(Json(DayScheduleBody {
        date,
        special: entries.iter().any(|entry| entry.is_special),
        pattern_name,
        entries,
    }))
}

async fn apply_special(
    State(state): State<AppState>,
    Path(raw_date): Path<String>,
    Json(payload): Json<ApplyPayload>,
) -> Result<Json<ApplyBody>, ApiError> {
    let date = parse_date(&raw_date)?;
    if payload.pattern_name.trim().is_empty() {
        return Err(ApiError::invalid("pattern_name must not be empty"));
    }
    let engine = state.engine();
    let custom = payload.custom_notation.as_deref();
    let applied = engine.apply_special_schedule(date, payload.pattern_name.trim(), custom)?;
    let configs = engine.mappings().configs_for_date(date)?;
    Ok(Json(ApplyBody { applied, configs }))
}

async fn remove_special(
    State(state): State<AppState>,
    Path(raw_date): Path<String>,
) -> Result<StatusCode, ApiError> {
    let date = parse_date(&raw_date)?;
    let removed = state.engine().remove_special_schedule(date)?;
    if !removed {
        return Err(ApiError::not_found(format!(
            "no special schedule on {date}"
        )));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_specials(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<NaiveDate>>, ApiError> {
    let start = parse_date(&range.start)?;
    let end = parse_date(&range.end)?;
    let dates = state.engine().mappings().special_dates(start, end)?;
    Ok(Json(dates))
}
