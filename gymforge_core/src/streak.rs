//! Streak engine: attendance-streak continuity with rest-day forgiveness.
//!
//! A streak continues across a gap only when every calendar day strictly
//! between the last activity and the new one falls on a designated rest
//! weekday for the member. Same-day repeats are no-ops, which makes
//! `advance` idempotent per date.

use crate::StreakState;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::HashSet;

/// Multiplier growth per consecutive day
pub const MULTIPLIER_STEP: f64 = 0.1;

/// Cap on the streak multiplier (reached at day 11)
pub const MULTIPLIER_CAP: f64 = 2.0;

/// Streak multiplier for a given streak length
pub fn multiplier_for(streak: u32) -> f64 {
    if streak == 0 {
        return 1.0;
    }
    (1.0 + MULTIPLIER_STEP * (streak - 1) as f64).min(MULTIPLIER_CAP)
}

/// Advance the streak for a new activity date.
///
/// The returned multiplier applies to the member's *next* experience
/// award; past awards are never recomputed.
pub fn advance(
    state: &StreakState,
    activity_date: NaiveDate,
    rest_days: &HashSet<Weekday>,
) -> StreakState {
    let current = match state.last_activity {
        None => 1,
        Some(last) if activity_date == last => {
            // Duplicate same-day activity
            return state.clone();
        }
        Some(last) => {
            let gap = (activity_date - last).num_days();
            if gap == 1 || (gap > 1 && all_rest_days(last, activity_date, rest_days)) {
                state.current + 1
            } else {
                // Includes backwards dates: a regression is treated as a break
                1
            }
        }
    };

    let longest = state.longest.max(current);
    StreakState {
        current,
        longest,
        last_activity: Some(activity_date),
        multiplier: multiplier_for(current),
    }
}

/// True when every day strictly between `from` and `to` is a rest day
fn all_rest_days(from: NaiveDate, to: NaiveDate, rest_days: &HashSet<Weekday>) -> bool {
    let mut day = from + Duration::days(1);
    while day < to {
        if !rest_days.contains(&day.weekday()) {
            return false;
        }
        day += Duration::days(1);
    }
    true
}
