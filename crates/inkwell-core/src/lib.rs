//! # Inkwell Core Library
//!
//! Core logic for Inkwell, a daily writing practice: one sitting per day,
//! a word target to reach, and an ink gauge that drains whenever typing
//! pauses. The `inkwell` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Session Engine**: a clock-driven state machine; the caller feeds text
//!   and delivers decay ticks through a [`TickLease`]
//! - **History**: streaks, free-tier locking and totals, recomputed from the
//!   stored sessions on demand
//! - **Storage**: SQLite session storage and TOML configuration
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: gauge, flow and the session lifecycle
//! - [`HistoryAggregator`]: derived history statistics
//! - [`Database`]: session persistence
//! - [`Config`]: application configuration management

pub mod clock;
pub mod error;
pub mod events;
pub mod history;
pub mod session;
pub mod settings;
pub mod storage;
pub mod writing;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, SessionError};
pub use events::Event;
pub use history::{HistoryAggregator, HistoryPolicy, HistorySnapshot, PremiumStatus};
pub use session::{MoodLevel, Session, SessionId, SessionPatch, SessionStatus};
pub use settings::{FixedSettings, SettingsProvider, WritingMode};
pub use storage::{Config, Database, MemoryRepository, SessionRepository};
pub use writing::{EngineState, EngineStatus, GaugeParams, SessionEngine, TickLease, VirtualTicker};
