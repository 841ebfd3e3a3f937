use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "inkwell", version, about = "Inkwell daily writing CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write today's session from stdin (`:done` completes, `:status` reports)
    Write {
        /// Seed the session with the draft left on this date (YYYY-MM-DD)
        #[arg(long, value_name = "DATE")]
        seed_draft: Option<chrono::NaiveDate>,
    },
    /// Show today's session
    Today,
    /// Record how today's completed session felt
    Mood {
        /// 1 (struggled) to 5 (flow)
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        level: u8,
        /// Free-form note
        #[arg(long)]
        note: Option<String>,
    },
    /// Streaks, totals and past sessions
    History {
        #[command(subcommand)]
        action: commands::history::HistoryAction,
    },
    /// Premium history access
    Premium {
        #[command(subcommand)]
        action: commands::premium::PremiumAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("INKWELL_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Write { seed_draft } => commands::write::run(seed_draft),
        Commands::Today => commands::today::run(),
        Commands::Mood { level, note } => commands::mood::run(level, note),
        Commands::History { action } => commands::history::run(action),
        Commands::Premium { action } => commands::premium::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
