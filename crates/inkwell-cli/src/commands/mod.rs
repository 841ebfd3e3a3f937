pub mod config;
pub mod history;
pub mod mood;
pub mod premium;
pub mod today;
pub mod write;

use inkwell_core::error::Result;
use inkwell_core::{Config, Database, Event, SessionEngine, SystemClock};
use serde::Serialize;

pub type CliResult = Result<()>;

/// Engine wired to the on-disk store and the user's configuration.
pub fn open_engine<'a>(
    db: &'a Database,
    config: &'a Config,
) -> SessionEngine<&'a Database, &'a Config, SystemClock> {
    SessionEngine::with_params(db, config, SystemClock, config.gauge_params())
}

/// One event per line, for piping into other tools.
pub fn emit(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

pub fn print_pretty<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
