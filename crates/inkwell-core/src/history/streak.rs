use std::collections::BTreeSet;

use chrono::NaiveDate;

/// Consecutive days with a completed session, counted back from `today`.
///
/// The run may start today or yesterday, so a streak survives a day that
/// has not been written yet. After the head every step must be exactly one
/// day back; there is no grace mid-streak.
pub fn current_streak(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> u32 {
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut streak = 0;
    let mut offset = None;
    for (i, date) in days.iter().rev().enumerate() {
        let diff = (today - *date).num_days();
        let head = *offset.get_or_insert(diff);
        if !(0..=1).contains(&head) || diff != head + i as i64 {
            break;
        }
        streak += 1;
    }
    streak
}

/// Longest run of consecutive completed days anywhere in history.
pub fn longest_streak(dates: impl IntoIterator<Item = NaiveDate>) -> u32 {
    let days: BTreeSet<NaiveDate> = dates.into_iter().collect();
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in days {
        run = match previous {
            Some(prev) if (date - prev).num_days() == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}
