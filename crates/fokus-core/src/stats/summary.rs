//! Summary statistics over the whole session history.

use std::collections::BTreeSet;

use chrono::{Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use super::round_div;
use crate::session::SessionRecord;

/// Aggregate figures for the analytics dashboard. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_minutes: u64,
    pub session_count: u64,
    pub average_session_minutes: u64,
    /// Percentage (0 or 100). Every recorded session counts as completed.
    pub completion_rate: u32,
    pub daily_average_minutes: u64,
    pub longest_session_minutes: u32,
    pub current_streak_days: u32,
    pub total_saved_minutes: u64,
    /// Distinct calendar days with at least one session.
    pub active_days: u32,
    pub sessions_per_active_day: f64,
    /// Sessions ended early with whole minutes saved.
    pub partial_session_count: u64,
}

/// Compute the summary using the local time zone and today's local date.
pub fn compute_stats(history: &[SessionRecord]) -> StatsSummary {
    compute_stats_on(history, Local::now().date_naive(), &Local)
}

/// Compute the summary relative to `today`, bucketing records into
/// calendar days in `tz`.
pub fn compute_stats_on<Tz: TimeZone>(
    history: &[SessionRecord],
    today: NaiveDate,
    tz: &Tz,
) -> StatsSummary {
    let session_count = history.len() as u64;
    let total_minutes: u64 = history
        .iter()
        .map(|r| u64::from(r.duration_minutes()))
        .sum();
    let total_saved_minutes: u64 = history
        .iter()
        .map(|r| u64::from(r.saved_minutes()))
        .sum();
    let longest_session_minutes = history
        .iter()
        .map(SessionRecord::duration_minutes)
        .max()
        .unwrap_or(0);
    let partial_session_count = history.iter().filter(|r| r.is_partial()).count() as u64;

    let days: BTreeSet<NaiveDate> = history.iter().map(|r| r.local_date(tz)).collect();
    let active_days = days.len() as u64;
    // Divisor never drops below one so an empty history averages to zero.
    let day_divisor = active_days.max(1);

    StatsSummary {
        total_minutes,
        session_count,
        average_session_minutes: round_div(total_minutes, session_count),
        completion_rate: if session_count > 0 { 100 } else { 0 },
        daily_average_minutes: round_div(total_minutes, day_divisor),
        longest_session_minutes,
        current_streak_days: current_streak(&days, today),
        total_saved_minutes,
        active_days: u32::try_from(active_days).unwrap_or(u32::MAX),
        sessions_per_active_day: session_count as f64 / day_divisor as f64,
        partial_session_count,
    }
}

/// Consecutive days with a session, counted back from today, or from
/// yesterday when today has none yet.
fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let anchor = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    let mut day = Some(anchor);
    while let Some(d) = day.filter(|d| days.contains(d)) {
        streak += 1;
        day = d.pred_opt();
    }
    streak
}
