use inkwell_core::{Clock, Database, SessionRepository, SystemClock};
use serde_json::json;

use super::{print_pretty, CliResult};

pub fn run() -> CliResult {
    let db = Database::open()?;
    let today = SystemClock.today();
    match db.get_by_date(today)? {
        Some(session) => print_pretty(&session),
        None => print_pretty(&json!({ "date": today, "status": "none" })),
    }
}
