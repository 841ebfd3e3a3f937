use inkwell_core::{Config, CoreError, Database, MoodLevel};

use super::{emit, open_engine, CliResult};

pub fn run(level: u8, note: Option<String>) -> CliResult {
    let mood = MoodLevel::try_from(level).map_err(CoreError::Custom)?;
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = open_engine(&db, &config);

    engine
        .restore_today()?
        .ok_or_else(|| CoreError::Custom("no completed session today".to_string()))?;
    let event = engine.set_mood(mood, note)?;
    emit(&event)
}
