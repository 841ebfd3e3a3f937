//! Writing session engine.
//!
//! The engine is a clock-driven state machine for one daily sitting. It does
//! not use internal threads or timers: the caller feeds text and delivers
//! decay ticks (see [`TickLease`]).
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Active -> (Completed | Interrupted) -> Idle
//!           ^  |
//!           +--+  text updates, ticks
//! ```
//!
//! `Active -> Completed` is user-driven and needs the word target;
//! `Active -> Interrupted` happens on a tick when the gauge runs dry first.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = SessionEngine::new(&db, &config, SystemClock);
//! engine.start("")?;
//! engine.update_text("It was a bright cold day")?;
//! // Every tick period while a lease is live:
//! if let Some(lease) = engine.tick_lease() {
//!     engine.tick(lease);
//! }
//! ```

use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::SessionError;
use crate::events::Event;
use crate::session::{MoodLevel, Session, SessionId, SessionPatch, SessionStatus};
use crate::settings::{SettingsProvider, WritingMode};
use crate::storage::SessionRepository;

use super::params::{GaugeParams, GAUGE_MAX, GAUGE_MIN};
use super::state::{EngineState, EngineStatus};
use super::ticker::{TickLease, TickSchedule};
use super::words::char_count;

/// Owns the lifecycle of the current writing session.
///
/// Collaborators are passed in explicitly; references work too, so one
/// repository can back several engines in tests.
pub struct SessionEngine<R, S, C> {
    repo: R,
    settings: S,
    clock: C,
    params: GaugeParams,
    state: EngineState,
    ticks: TickSchedule,
}

impl<R, S, C> SessionEngine<R, S, C>
where
    R: SessionRepository,
    S: SettingsProvider,
    C: Clock,
{
    pub fn new(repo: R, settings: S, clock: C) -> Self {
        Self::with_params(repo, settings, clock, GaugeParams::default())
    }

    pub fn with_params(repo: R, settings: S, clock: C, params: GaugeParams) -> Self {
        Self {
            repo,
            settings,
            clock,
            params: params.sanitized(),
            state: EngineState::default(),
            ticks: TickSchedule::default(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn status(&self) -> EngineStatus {
        self.state.status
    }

    pub fn text(&self) -> &str {
        &self.state.text
    }

    pub fn gauge_level(&self) -> f64 {
        self.state.gauge_level
    }

    pub fn in_flow(&self) -> bool {
        self.state.in_flow
    }

    pub fn word_count(&self) -> usize {
        self.state.word_count()
    }

    pub fn can_complete(&self) -> bool {
        self.state.can_complete(&self.params)
    }

    /// 0.0 .. 100.0 progress toward the word target.
    pub fn progress(&self) -> f64 {
        self.state.progress(&self.params)
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    pub fn saved_session_id(&self) -> Option<SessionId> {
        self.state.saved_session_id
    }

    /// Mode reported by the settings provider right now.
    pub fn writing_mode(&self) -> WritingMode {
        self.settings.writing_mode()
    }

    pub fn params(&self) -> &GaugeParams {
        &self.params
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    pub fn tick_period(&self) -> Duration {
        self.params.tick_period()
    }

    /// The live tick lease, `None` whenever no tick should be delivered.
    pub fn tick_lease(&self) -> Option<TickLease> {
        self.ticks.current()
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        let now = self.clock.now();
        Event::StateSnapshot {
            status: self.state.status,
            word_count: self.word_count(),
            word_target: self.params.word_target,
            progress_pct: self.progress(),
            gauge_level: self.state.gauge_level,
            in_flow: self.state.in_flow,
            can_complete: self.can_complete(),
            elapsed_ms: self.state.elapsed_ms(now),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load today's record; a completed one puts the engine in `Completed`
    /// so the day cannot be written twice. Interrupted records don't block.
    pub fn restore_today(&mut self) -> Result<Option<Event>, SessionError> {
        if self.state.status != EngineStatus::Idle {
            return Err(self.rejected("restore"));
        }
        let today = self.clock.today();
        let Some(session) = self.repo.get_by_date(today)? else {
            return Ok(None);
        };
        if !session.is_completed() {
            return Ok(None);
        }
        info!(date = %today, "restored completed session");
        let word_count = session.word_count;
        self.state = EngineState {
            previous_char_count: char_count(&session.text),
            text: session.text,
            status: EngineStatus::Completed,
            start_time: Some(session.created_at),
            saved_session_id: session.id,
            ..EngineState::default()
        };
        Ok(Some(Event::SessionRestored {
            session_id: session.id,
            date: today,
            word_count,
            at: self.clock.now(),
        }))
    }

    /// Begin a sitting, optionally seeded with earlier text.
    ///
    /// Restarts an active or interrupted sitting; refused once today is
    /// completed.
    pub fn start(&mut self, seed: &str) -> Result<Event, SessionError> {
        if self.state.status == EngineStatus::Completed {
            return Err(self.rejected("start"));
        }
        // Revoke any lease from a previous sitting before issuing a new one.
        self.ticks.cancel();
        self.ticks.arm();

        let now = self.clock.now();
        self.state = EngineState {
            text: seed.to_string(),
            status: EngineStatus::Active,
            start_time: Some(now),
            gauge_level: self.params.start,
            last_type_time: Some(now),
            in_flow: false,
            flow_start_time: None,
            previous_char_count: char_count(seed),
            saved_session_id: None,
        };
        info!(seed_words = self.word_count(), "writing session started");
        Ok(Event::SessionStarted {
            date: self.clock.today(),
            seed_words: self.word_count(),
            gauge_level: self.state.gauge_level,
            at: now,
        })
    }

    /// Start a sitting seeded with the interrupted draft stored for `date`.
    pub fn resume_draft(&mut self, date: NaiveDate) -> Result<Event, SessionError> {
        let draft = self
            .repo
            .get_by_date(date)?
            .filter(Session::is_interrupted)
            .ok_or(SessionError::NoDraft(date))?;
        self.start(&draft.text)
    }

    /// Replace the text of the active sitting.
    ///
    /// Returns the number of characters added. Only growth feeds the gauge;
    /// deletions are free.
    pub fn update_text(&mut self, text: impl Into<String>) -> Result<usize, SessionError> {
        if self.state.status != EngineStatus::Active {
            return Err(self.rejected("update text"));
        }
        let text = text.into();
        let new_count = char_count(&text);
        let chars_added = new_count.saturating_sub(self.state.previous_char_count);
        if chars_added > 0 {
            self.state.gauge_level = (self.state.gauge_level
                + chars_added as f64 * self.params.per_char)
                .min(GAUGE_MAX);
            self.state.last_type_time = Some(self.clock.now());
        }
        self.state.text = text;
        self.state.previous_char_count = new_count;
        Ok(chars_added)
    }

    /// Deliver one decay tick. Stale leases and inactive sittings are ignored.
    pub fn tick(&mut self, lease: TickLease) -> Option<Event> {
        if !self.ticks.honours(lease) {
            return None;
        }
        if self.state.status != EngineStatus::Active {
            self.ticks.cancel();
            return None;
        }
        if self.settings.writing_mode() == WritingMode::Zen {
            return None;
        }

        let now = self.clock.now();
        let flow_event = self.track_flow(now);

        let idle_secs = self
            .state
            .last_type_time
            .map(|t| seconds_between(t, now))
            .unwrap_or(f64::INFINITY);
        if idle_secs > self.params.grace_delay_secs {
            let decay = self.params.decay_per_tick(self.state.in_flow);
            self.state.gauge_level = (self.state.gauge_level - decay).max(GAUGE_MIN);

            if self.state.gauge_level <= GAUGE_MIN && !self.can_complete() {
                return Some(self.interrupt(now));
            }
        }

        flow_event
    }

    /// Finish the sitting. Needs the word target.
    ///
    /// The transition is committed before the record is written; if the
    /// write fails the session stays completed and the returned event
    /// carries no `session_id`.
    pub fn complete(&mut self) -> Result<Event, SessionError> {
        if self.state.status != EngineStatus::Active {
            return Err(self.rejected("complete"));
        }
        if !self.can_complete() {
            return Err(SessionError::BelowWordTarget {
                words: self.word_count(),
                target: self.params.word_target,
            });
        }

        self.ticks.cancel();
        self.state.clear_flow();
        self.state.status = EngineStatus::Completed;

        let now = self.clock.now();
        let record = self.record(SessionStatus::Completed, now);
        let session_id = self.persist(&record);
        self.state.saved_session_id = session_id;
        info!(words = record.word_count, duration_ms = record.duration_ms, "writing session completed");

        Ok(Event::SessionCompleted {
            session_id,
            date: record.date,
            word_count: record.word_count,
            duration_ms: record.duration_ms,
            at: now,
        })
    }

    /// Attach a mood to the completed, stored session.
    pub fn set_mood(&mut self, mood: MoodLevel, note: Option<String>) -> Result<Event, SessionError> {
        if self.state.status != EngineStatus::Completed {
            return Err(self.rejected("record mood"));
        }
        let id = self
            .state
            .saved_session_id
            .ok_or(SessionError::MissingIdentity)?;
        let patch = SessionPatch {
            mood: Some(mood),
            mood_note: note,
        };
        self.repo.update(id, &patch).map_err(|e| {
            error!(session_id = %id, "failed to save mood: {e}");
            SessionError::Persistence(e)
        })?;
        Ok(Event::MoodRecorded {
            session_id: id,
            mood,
            at: self.clock.now(),
        })
    }

    /// Drop everything and go back to `Idle`.
    pub fn reset(&mut self) -> Event {
        self.ticks.cancel();
        self.state = EngineState::default();
        Event::SessionReset {
            at: self.clock.now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Flow needs the gauge pinned at max for the threshold; any drop ends it.
    fn track_flow(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state.gauge_level >= GAUGE_MAX {
            match self.state.flow_start_time {
                None => self.state.flow_start_time = Some(now),
                Some(since) => {
                    if !self.state.in_flow
                        && seconds_between(since, now) >= self.params.flow_threshold_secs
                    {
                        self.state.in_flow = true;
                        debug!("flow entered");
                        return Some(Event::FlowEntered {
                            gauge_level: self.state.gauge_level,
                            at: now,
                        });
                    }
                }
            }
            None
        } else {
            let was_in_flow = self.state.in_flow;
            self.state.clear_flow();
            if was_in_flow {
                debug!(gauge = self.state.gauge_level, "flow exited");
                Some(Event::FlowExited {
                    gauge_level: self.state.gauge_level,
                    at: now,
                })
            } else {
                None
            }
        }
    }

    fn interrupt(&mut self, now: DateTime<Utc>) -> Event {
        self.ticks.cancel();
        self.state.status = EngineStatus::Interrupted;
        self.state.gauge_level = GAUGE_MIN;
        self.state.clear_flow();

        let record = self.record(SessionStatus::Interrupted, now);
        let session_id = self.persist(&record);
        info!(words = record.word_count, "writing session interrupted");

        Event::SessionInterrupted {
            session_id,
            date: record.date,
            word_count: record.word_count,
            duration_ms: record.duration_ms,
            at: now,
        }
    }

    fn record(&self, status: SessionStatus, now: DateTime<Utc>) -> Session {
        Session {
            id: None,
            date: self.clock.today(),
            text: self.state.text.clone(),
            word_count: self.word_count(),
            duration_ms: self.state.elapsed_ms(now),
            status,
            mood: None,
            mood_note: None,
            created_at: self.state.start_time.unwrap_or(now),
            completed_at: (status == SessionStatus::Completed).then_some(now),
        }
    }

    /// Store a terminal record. Failures are logged, never rolled back.
    fn persist(&self, record: &Session) -> Option<SessionId> {
        match self.repo.save(record) {
            Ok(id) => Some(id),
            Err(e) => {
                error!(date = %record.date, status = record.status.as_str(), "failed to save session: {e}");
                None
            }
        }
    }

    fn rejected(&self, action: &'static str) -> SessionError {
        debug!(action, status = %self.state.status, "command ignored");
        SessionError::InvalidTransition {
            action,
            status: self.state.status,
        }
    }
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}
