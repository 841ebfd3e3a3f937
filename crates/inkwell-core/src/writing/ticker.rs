//! Decay tick scheduling.
//!
//! The engine never runs its own timer. While a sitting is active it holds a
//! live [`TickLease`]; whoever drives the engine (a tokio interval in the
//! CLI, [`VirtualTicker`] in tests) calls `tick(lease)` once per period and
//! stops as soon as the engine reports no lease. Every exit from `active`
//! revokes the lease, and a tick presented with a revoked lease is ignored,
//! so a late tick can never act on a later sitting.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::ManualClock;
use crate::events::Event;
use crate::settings::SettingsProvider;
use crate::storage::SessionRepository;

use super::engine::SessionEngine;

/// Proof that a tick was scheduled for the current sitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickLease {
    generation: u64,
}

/// The engine's side of the schedule: at most one live lease at a time.
#[derive(Debug, Clone, Default)]
pub(crate) struct TickSchedule {
    generation: u64,
    live: bool,
}

impl TickSchedule {
    /// Revoke any live lease and issue a fresh one.
    pub(crate) fn arm(&mut self) -> TickLease {
        self.generation = self.generation.wrapping_add(1);
        self.live = true;
        TickLease {
            generation: self.generation,
        }
    }

    pub(crate) fn cancel(&mut self) {
        self.live = false;
    }

    pub(crate) fn current(&self) -> Option<TickLease> {
        self.live.then_some(TickLease {
            generation: self.generation,
        })
    }

    pub(crate) fn honours(&self, lease: TickLease) -> bool {
        self.live && lease.generation == self.generation
    }
}

/// Drives an engine through virtual time on a [`ManualClock`].
pub struct VirtualTicker<'c> {
    clock: &'c ManualClock,
}

impl<'c> VirtualTicker<'c> {
    pub fn new(clock: &'c ManualClock) -> Self {
        Self { clock }
    }

    /// Advance one period and deliver one tick, if a tick is scheduled.
    pub fn step<R, S, C>(&self, engine: &mut SessionEngine<R, S, C>) -> Option<Event>
    where
        R: SessionRepository,
        S: SettingsProvider,
        C: crate::clock::Clock,
    {
        let lease = engine.tick_lease()?;
        self.clock.advance(chrono_duration(engine.tick_period()));
        engine.tick(lease)
    }

    /// Tick repeatedly for `span` of virtual time or until the schedule is
    /// cancelled, collecting the events produced.
    pub fn run_for<R, S, C>(&self, engine: &mut SessionEngine<R, S, C>, span: Duration) -> Vec<Event>
    where
        R: SessionRepository,
        S: SettingsProvider,
        C: crate::clock::Clock,
    {
        let period = engine.tick_period();
        let steps = (span.as_millis() / period.as_millis().max(1)) as u64;
        let mut events = Vec::new();
        for _ in 0..steps {
            let Some(lease) = engine.tick_lease() else {
                break;
            };
            self.clock.advance(chrono_duration(period));
            if let Some(event) = engine.tick(lease) {
                events.push(event);
            }
        }
        events
    }
}

fn chrono_duration(period: Duration) -> chrono::Duration {
    chrono::Duration::milliseconds(period.as_millis() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rearming_revokes_previous_lease() {
        let mut schedule = TickSchedule::default();
        let first = schedule.arm();
        let second = schedule.arm();
        assert!(!schedule.honours(first));
        assert!(schedule.honours(second));
        assert_eq!(schedule.current(), Some(second));
    }

    #[test]
    fn step_advances_by_configured_period() {
        use crate::clock::Clock;
        use crate::settings::WritingMode;
        use crate::storage::MemoryRepository;
        use crate::writing::GaugeParams;

        let repo = MemoryRepository::new();
        let clock = ManualClock::at_date(chrono::NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        let params = GaugeParams {
            tick_ms: 250,
            ..GaugeParams::default()
        };
        let mut engine = SessionEngine::with_params(&repo, WritingMode::Normal, &clock, params);
        engine.start("").unwrap();

        let before = clock.now();
        let ticker = VirtualTicker::new(&clock);
        ticker.step(&mut engine);
        assert_eq!((clock.now() - before).num_milliseconds(), 250);

        ticker.run_for(&mut engine, Duration::from_millis(1_000));
        assert_eq!((clock.now() - before).num_milliseconds(), 1_250);
    }

    #[test]
    fn cancel_revokes_everything() {
        let mut schedule = TickSchedule::default();
        let lease = schedule.arm();
        schedule.cancel();
        assert!(!schedule.honours(lease));
        assert_eq!(schedule.current(), None);
    }
}
