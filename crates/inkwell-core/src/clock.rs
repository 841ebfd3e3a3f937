//! Time abstraction.
//!
//! Everything in the core that needs "now" or "today" asks a [`Clock`], so
//! tick-based decay and day-key computation can be driven by virtual time.

use std::cell::Cell;

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Offset, Utc};

pub trait Clock {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Offset used to turn an instant into a calendar day.
    fn offset(&self) -> FixedOffset;

    /// Local calendar day of [`Clock::now`]; the key sessions are stored under.
    fn today(&self) -> NaiveDate {
        self.now().with_timezone(&self.offset()).date_naive()
    }
}

/// Wall clock in the host's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Manually advanced clock for deterministic tests and simulations.
///
/// Interior mutability lets the clock be advanced while an engine holds a
/// shared reference to it.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
    offset: FixedOffset,
}

impl ManualClock {
    /// Clock frozen at `start`, reporting days in UTC.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
            offset: Utc.fix(),
        }
    }

    /// Clock frozen at `start`, reporting days at the given offset.
    pub fn with_offset(start: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            now: Cell::new(start),
            offset,
        }
    }

    /// Clock at noon UTC on `date`.
    pub fn at_date(date: NaiveDate) -> Self {
        let noon = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);
        Self::new(noon)
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.advance(Duration::milliseconds(ms));
    }

    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }

    fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }

    fn offset(&self) -> FixedOffset {
        (**self).offset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let start = clock.now();
        clock.advance_ms(1_500);
        assert_eq!((clock.now() - start).num_milliseconds(), 1_500);
    }

    #[test]
    fn today_respects_offset() {
        // 23:30 UTC is already the next day at +02:00.
        let instant = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(23, 30, 0)
            .unwrap()
            .and_utc();
        let utc = ManualClock::new(instant);
        let east = ManualClock::with_offset(instant, FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(east.today(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }

    #[test]
    fn crossing_midnight_changes_day() {
        let clock = ManualClock::at_date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        clock.advance(Duration::hours(12));
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 2).unwrap());
    }
}
