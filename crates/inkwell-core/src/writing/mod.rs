//! The writing session: gauge, flow and the engine that owns them.

mod engine;
pub mod params;
mod state;
pub mod ticker;
mod words;

pub use engine::SessionEngine;
pub use params::GaugeParams;
pub use state::{EngineState, EngineStatus};
pub use ticker::{TickLease, VirtualTicker};
pub use words::{char_count, count_words};
