use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::error::DatabaseError;
use crate::session::Session;
use crate::storage::SessionRepository;

use super::streak::{current_streak, longest_streak};
use super::{HistoryPolicy, PremiumStatus};

/// Everything the history views need, derived from one read of the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistorySnapshot {
    /// All sessions, newest date first.
    pub sessions: Vec<Session>,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Completed dates hidden on the free tier.
    pub locked_dates: BTreeSet<NaiveDate>,
    pub completed_dates: BTreeSet<NaiveDate>,
    /// Interrupted sessions, newest first.
    pub drafts: Vec<Session>,
    pub total_sessions: usize,
    pub total_words: usize,
    pub cutoff: NaiveDate,
}

impl HistorySnapshot {
    pub fn from_sessions(
        mut sessions: Vec<Session>,
        today: NaiveDate,
        policy: HistoryPolicy,
        premium: bool,
    ) -> Self {
        sessions.sort_by(|a, b| b.date.cmp(&a.date));

        let completed: Vec<&Session> = sessions.iter().filter(|s| s.is_completed()).collect();
        let completed_dates: BTreeSet<NaiveDate> = completed.iter().map(|s| s.date).collect();
        let locked_dates = completed_dates
            .iter()
            .copied()
            .filter(|date| policy.is_locked(*date, today, premium))
            .collect();
        let total_sessions = completed.len();
        let total_words = completed.iter().map(|s| s.word_count).sum();
        let drafts = sessions
            .iter()
            .filter(|s| s.is_interrupted())
            .cloned()
            .collect();

        Self {
            current_streak: current_streak(completed_dates.iter().copied(), today),
            longest_streak: longest_streak(completed_dates.iter().copied()),
            locked_dates,
            completed_dates,
            drafts,
            total_sessions,
            total_words,
            cutoff: policy.cutoff(today),
            sessions,
        }
    }

    pub fn session_for(&self, date: NaiveDate) -> Option<&Session> {
        self.sessions.iter().find(|s| s.date == date)
    }

    pub fn has_completed(&self, date: NaiveDate) -> bool {
        self.completed_dates.contains(&date)
    }

    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.locked_dates.contains(&date)
    }

    pub fn locked_count(&self) -> usize {
        self.locked_dates.len()
    }

    pub fn draft_count(&self) -> usize {
        self.drafts.len()
    }
}

/// Recomputes [`HistorySnapshot`]s from a repository.
pub struct HistoryAggregator<R, P, C> {
    repo: R,
    premium: P,
    clock: C,
    policy: HistoryPolicy,
}

impl<R, P, C> HistoryAggregator<R, P, C>
where
    R: SessionRepository,
    P: PremiumStatus,
    C: Clock,
{
    pub fn new(repo: R, premium: P, clock: C) -> Self {
        Self::with_policy(repo, premium, clock, HistoryPolicy::default())
    }

    pub fn with_policy(repo: R, premium: P, clock: C, policy: HistoryPolicy) -> Self {
        Self {
            repo,
            premium,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> HistoryPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Result<HistorySnapshot, DatabaseError> {
        let sessions = self.repo.get_all()?;
        let today = self.clock.today();
        let premium = self.premium.is_premium_active();
        debug!(sessions = sessions.len(), premium, %today, "recomputing history");
        Ok(HistorySnapshot::from_sessions(
            sessions,
            today,
            self.policy,
            premium,
        ))
    }

    pub fn current_streak(&self) -> Result<u32, DatabaseError> {
        let dates = self.repo.get_all_completed()?.into_iter().map(|s| s.date);
        Ok(current_streak(dates, self.clock.today()))
    }

    pub fn longest_streak(&self) -> Result<u32, DatabaseError> {
        let dates = self.repo.get_all_completed()?.into_iter().map(|s| s.date);
        Ok(longest_streak(dates))
    }

    /// Whether `date` falls outside the free-tier window right now.
    pub fn is_locked(&self, date: NaiveDate) -> bool {
        self.policy
            .is_locked(date, self.clock.today(), self.premium.is_premium_active())
    }

    pub fn cutoff(&self) -> NaiveDate {
        self.policy.cutoff(self.clock.today())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::SessionStatus;
    use crate::storage::MemoryRepository;
    use chrono::{Days, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 20).unwrap()
    }

    fn days_ago(n: u64) -> NaiveDate {
        today().checked_sub_days(Days::new(n)).unwrap()
    }

    fn session(date: NaiveDate, words: usize, status: SessionStatus) -> Session {
        let at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
        Session {
            id: None,
            date,
            text: "word ".repeat(words),
            word_count: words,
            duration_ms: 600_000,
            status,
            mood: None,
            mood_note: None,
            created_at: at,
            completed_at: (status == SessionStatus::Completed).then_some(at),
        }
    }

    fn repo() -> MemoryRepository {
        MemoryRepository::with_sessions([
            session(days_ago(95), 310, SessionStatus::Completed),
            session(days_ago(89), 305, SessionStatus::Completed),
            session(days_ago(3), 120, SessionStatus::Interrupted),
            session(days_ago(2), 400, SessionStatus::Completed),
            session(days_ago(1), 350, SessionStatus::Completed),
            session(days_ago(10), 40, SessionStatus::Interrupted),
        ])
    }

    #[test]
    fn snapshot_totals_count_completed_only() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let history = HistoryAggregator::new(&repo, false, &clock);
        let snapshot = history.snapshot().unwrap();

        assert_eq!(snapshot.sessions.len(), 6);
        assert_eq!(snapshot.total_sessions, 4);
        assert_eq!(snapshot.total_words, 310 + 305 + 400 + 350);
        assert_eq!(snapshot.current_streak, 2);
        assert_eq!(snapshot.longest_streak, 2);
    }

    #[test]
    fn sessions_and_drafts_are_newest_first() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let snapshot = HistoryAggregator::new(&repo, false, &clock).snapshot().unwrap();

        let dates: Vec<NaiveDate> = snapshot.sessions.iter().map(|s| s.date).collect();
        let mut sorted = dates.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(dates, sorted);

        let drafts: Vec<NaiveDate> = snapshot.drafts.iter().map(|s| s.date).collect();
        assert_eq!(drafts, vec![days_ago(3), days_ago(10)]);
        assert_eq!(snapshot.draft_count(), 2);
    }

    #[test]
    fn free_tier_locks_old_completed_dates() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let snapshot = HistoryAggregator::new(&repo, false, &clock).snapshot().unwrap();

        assert!(snapshot.is_locked(days_ago(95)));
        assert!(!snapshot.is_locked(days_ago(89)));
        assert_eq!(snapshot.locked_count(), 1);
        assert_eq!(snapshot.cutoff, days_ago(90));
    }

    #[test]
    fn premium_unlocks_history() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let history = HistoryAggregator::new(&repo, true, &clock);
        let snapshot = history.snapshot().unwrap();

        assert_eq!(snapshot.locked_count(), 0);
        assert!(!history.is_locked(days_ago(95)));
    }

    #[test]
    fn lookup_by_date() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let snapshot = HistoryAggregator::new(&repo, false, &clock).snapshot().unwrap();

        assert!(snapshot.has_completed(days_ago(1)));
        assert!(!snapshot.has_completed(days_ago(3)));
        assert_eq!(snapshot.session_for(days_ago(3)).map(|s| s.word_count), Some(120));
        assert!(snapshot.session_for(days_ago(4)).is_none());
    }

    #[test]
    fn streak_queries_match_snapshot() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let history = HistoryAggregator::new(&repo, false, &clock);
        assert_eq!(history.current_streak().unwrap(), 2);
        assert_eq!(history.longest_streak().unwrap(), 2);

        // Two unwritten days break the streak.
        clock.advance(chrono::Duration::days(2));
        assert_eq!(history.current_streak().unwrap(), 0);
    }

    #[test]
    fn custom_retention_window() {
        let repo = repo();
        let clock = ManualClock::at_date(today());
        let history = HistoryAggregator::with_policy(&repo, false, &clock, HistoryPolicy::new(30));
        let snapshot = history.snapshot().unwrap();
        assert_eq!(snapshot.locked_count(), 2);
        assert_eq!(history.cutoff(), days_ago(30));
    }

    #[test]
    fn empty_history_snapshot() {
        let repo = MemoryRepository::new();
        let clock = ManualClock::at_date(today());
        let snapshot = HistoryAggregator::new(&repo, false, &clock).snapshot().unwrap();
        assert_eq!(snapshot.total_sessions, 0);
        assert_eq!(snapshot.current_streak, 0);
        assert_eq!(snapshot.longest_streak, 0);
        assert!(snapshot.sessions.is_empty());
    }
}
