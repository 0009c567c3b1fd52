#[cfg(feature = "http_api")]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::sync::Arc;

    use timetable_remap::{EngineConfig, ScheduleReconstructor, SqliteStore, http_api, logging};

    let config = EngineConfig::load(None)?;
    logging::init_logging(&config.log_filter)?;

    let store = if config.is_in_memory() {
        SqliteStore::in_memory()?
    } else {
        SqliteStore::new(&config.database_path)?
    };
    let store = Arc::new(store.with_marker_prefix(config.marker_prefix.clone()));
    let engine = ScheduleReconstructor::new(store.clone(), store.clone(), store);

    let addr = config.socket_addr()?;
    tracing::info!(%addr, database = %config.database_path.display(), "timetable-remap HTTP API listening");
    println!("timetable-remap HTTP API listening on http://{addr}");
    http_api::serve(addr, engine).await?;
    Ok(())
}

#[cfg(not(feature = "http_api"))]
fn main() {
    eprintln!("Rebuild with the `http_api` feature to enable the HTTP server.");
}
