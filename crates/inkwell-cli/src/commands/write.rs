use chrono::NaiveDate;
use inkwell_core::{
    Clock, Config, CoreError, Database, SessionEngine, SessionRepository, SettingsProvider,
    WritingMode,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use super::{emit, open_engine, CliResult};

pub fn run(seed_draft: Option<NaiveDate>) -> CliResult {
    let config = Config::load_or_default();
    let db = Database::open()?;
    let mut engine = open_engine(&db, &config);

    if let Some(restored) = engine.restore_today()? {
        emit(&restored)?;
        return Err(CoreError::Custom(
            "today's session is already completed".to_string(),
        ));
    }

    let started = match seed_draft {
        Some(date) => engine.resume_draft(date)?,
        None => engine.start("")?,
    };
    emit(&started)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(drive(&mut engine))
}

/// Feed stdin lines into the engine and tick it until the sitting ends.
///
/// When stdin closes, a sitting that already meets the word target is
/// completed and a zen sitting (which can never drain) is discarded.
/// Otherwise ticking continues until the gauge runs dry.
async fn drive<R, S, C>(engine: &mut SessionEngine<R, S, C>) -> CliResult
where
    R: SessionRepository,
    S: SettingsProvider,
    C: Clock,
{
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(engine.tick_period());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut text = engine.text().to_string();
    let mut stdin_open = true;

    while let Some(lease) = engine.tick_lease() {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(event) = engine.tick(lease) {
                    emit(&event)?;
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    if engine.can_complete() {
                        emit(&engine.complete()?)?;
                    } else if engine.writing_mode() == WritingMode::Zen {
                        info!("stdin closed in zen mode, discarding the sitting");
                        emit(&engine.reset())?;
                    } else {
                        info!("stdin closed, waiting for the gauge to run dry");
                    }
                    continue;
                };
                match line.trim() {
                    ":done" => match engine.complete() {
                        Ok(event) => emit(&event)?,
                        Err(e) => warn!("{e}"),
                    },
                    ":status" => emit(&engine.snapshot())?,
                    ":quit" => {
                        emit(&engine.reset())?;
                    }
                    _ => {
                        if !text.is_empty() {
                            text.push('\n');
                        }
                        text.push_str(&line);
                        engine.update_text(text.clone())?;
                    }
                }
            }
        }
    }
    Ok(())
}
