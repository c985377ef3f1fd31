//! Trailing seven-day minutes series for the weekly chart.

use std::collections::HashMap;

use chrono::{Days, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::SessionRecord;

const DAYS_IN_SERIES: u64 = 7;

/// One day's aggregated minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyBucket {
    pub date: NaiveDate,
    /// Short English weekday name (`Mon` .. `Sun`).
    pub day_label: String,
    pub minutes: u64,
}

impl WeeklyBucket {
    /// Zero-minute buckets are drawn differently from active days.
    pub fn is_empty(&self) -> bool {
        self.minutes == 0
    }
}

/// Seven buckets, oldest first, ending today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySeries {
    pub buckets: Vec<WeeklyBucket>,
}

impl WeeklySeries {
    pub fn total_minutes(&self) -> u64 {
        self.buckets.iter().map(|b| b.minutes).sum()
    }

    /// Largest bucket, for scaling bars.
    pub fn max_minutes(&self) -> u64 {
        self.buckets.iter().map(|b| b.minutes).max().unwrap_or(0)
    }
}

pub fn compute_weekly_series(history: &[SessionRecord]) -> WeeklySeries {
    compute_weekly_series_on(history, Local::now().date_naive(), &Local)
}

pub fn compute_weekly_series_on<Tz: TimeZone>(
    history: &[SessionRecord],
    today: NaiveDate,
    tz: &Tz,
) -> WeeklySeries {
    let mut minutes_by_day: HashMap<NaiveDate, u64> = HashMap::new();
    for record in history {
        *minutes_by_day.entry(record.local_date(tz)).or_default() +=
            u64::from(record.duration_minutes());
    }

    let buckets = (0..DAYS_IN_SERIES)
        .rev()
        .map(|offset| {
            let date = today
                .checked_sub_days(Days::new(offset))
                .unwrap_or(NaiveDate::MIN);
            WeeklyBucket {
                date,
                day_label: date.format("%a").to_string(),
                minutes: minutes_by_day.get(&date).copied().unwrap_or(0),
            }
        })
        .collect();

    WeeklySeries { buckets }
}
