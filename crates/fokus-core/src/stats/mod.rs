//! Statistics module for Fokus
//!
//! Pure aggregations over the session history: a summary of totals,
//! averages and the current streak, and a trailing seven-day series
//! for charting. Both are recomputed from scratch on every history change.

mod summary;
mod weekly;

pub use summary::{compute_stats, compute_stats_on, StatsSummary};
pub use weekly::{compute_weekly_series, compute_weekly_series_on, WeeklyBucket, WeeklySeries};

/// Integer division rounded half away from zero.
fn round_div(numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    (2 * numerator + denominator) / (2 * denominator)
}
