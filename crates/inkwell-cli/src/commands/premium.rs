use clap::Subcommand;
use inkwell_core::{Database, PremiumStatus};
use serde_json::json;

use super::{print_pretty, CliResult};

#[derive(Subcommand)]
pub enum PremiumAction {
    /// Show whether premium history access is active
    Status,
    /// Unlock the full history
    On,
    /// Return to the free tier
    Off,
}

pub fn run(action: PremiumAction) -> CliResult {
    let db = Database::open()?;
    match action {
        PremiumAction::Status => {}
        PremiumAction::On => db.set_premium_status(true)?,
        PremiumAction::Off => db.set_premium_status(false)?,
    }
    print_pretty(&json!({ "premium": db.is_premium_active() }))
}
