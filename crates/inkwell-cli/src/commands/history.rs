use chrono::NaiveDate;
use clap::Subcommand;
use inkwell_core::{Config, CoreError, Database, HistoryAggregator, HistorySnapshot, SystemClock};
use serde_json::json;

use super::{print_pretty, CliResult};

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Streaks and totals
    Summary,
    /// Interrupted sessions, newest first
    Drafts,
    /// One day's session
    Show {
        /// Date (YYYY-MM-DD)
        date: NaiveDate,
    },
    /// Completed dates hidden on the free tier
    Locked,
}

fn load_snapshot(db: &Database) -> inkwell_core::error::Result<HistorySnapshot> {
    let config = Config::load_or_default();
    let history = HistoryAggregator::with_policy(db, db, SystemClock, config.history_policy());
    Ok(history.snapshot()?)
}

pub fn run(action: HistoryAction) -> CliResult {
    let db = Database::open()?;
    let snapshot = load_snapshot(&db)?;

    match action {
        HistoryAction::Summary => print_pretty(&json!({
            "current_streak": snapshot.current_streak,
            "longest_streak": snapshot.longest_streak,
            "total_sessions": snapshot.total_sessions,
            "total_words": snapshot.total_words,
            "drafts": snapshot.draft_count(),
            "locked": snapshot.locked_count(),
            "cutoff": snapshot.cutoff,
        })),
        HistoryAction::Drafts => print_pretty(&snapshot.drafts),
        HistoryAction::Show { date } => {
            if snapshot.is_locked(date) {
                return Err(CoreError::Custom(format!(
                    "{date} is older than the free history window"
                )));
            }
            match snapshot.session_for(date) {
                Some(session) => print_pretty(session),
                None => Err(CoreError::Custom(format!("no session on {date}"))),
            }
        }
        HistoryAction::Locked => print_pretty(&snapshot.locked_dates),
    }
}
