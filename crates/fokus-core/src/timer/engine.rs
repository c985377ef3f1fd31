//! Timer engine implementation.
//!
//! The timer engine is a tick-driven state machine. It does not use
//! internal threads or read the clock to count down - the caller is
//! responsible for calling `tick()` once per second while running.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |           |
//!            +-----+-----+
//!                  v
//!              Completed -> Idle (same planned duration, label cleared)
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(25);
//! engine.set_task_label("write report");
//! engine.start();
//! // Once per second:
//! if let Some(Event::SessionCompleted { record, .. }) = engine.tick() {
//!     history.append(record);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::events::Event;
use crate::session::SessionRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Transient: the engine passes through it while emitting a session
    /// record and immediately resets to `Idle`.
    Completed,
}

/// Core timer engine. One instance owns the single active countdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerEngine {
    planned_minutes: u32,
    /// Always within `0..=planned_minutes * 60`.
    remaining_secs: u64,
    task_label: String,
    state: TimerState,
    #[serde(default)]
    validation_error: bool,
}

impl TimerEngine {
    /// Create an idle engine with a full countdown and a blank label.
    pub fn new(planned_minutes: u32) -> Self {
        Self {
            planned_minutes,
            remaining_secs: minutes_to_secs(planned_minutes),
            task_label: String::new(),
            state: TimerState::Idle,
            validation_error: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn planned_minutes(&self) -> u32 {
        self.planned_minutes
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        minutes_to_secs(self.planned_minutes)
    }

    pub fn task_label(&self) -> &str {
        &self.task_label
    }

    pub fn validation_error(&self) -> bool {
        self.validation_error
    }

    /// 0.0 .. 1.0 progress through the planned duration.
    pub fn progress(&self) -> f64 {
        let total = self.total_secs();
        if total == 0 {
            return 0.0;
        }
        1.0 - (self.remaining_secs as f64 / total as f64)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            planned_minutes: self.planned_minutes,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs(),
            clock: format_clock(self.remaining_secs),
            task_label: self.task_label.clone(),
            validation_error: self.validation_error,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Select a new planned duration. Cancels any countdown in progress.
    pub fn set_planned_duration(&mut self, minutes: u32) -> Option<Event> {
        self.planned_minutes = minutes;
        self.remaining_secs = minutes_to_secs(minutes);
        self.state = TimerState::Idle;
        debug!(planned_minutes = minutes, "timer duration changed");
        Some(Event::DurationChanged {
            planned_minutes: minutes,
            at: Utc::now(),
        })
    }

    /// Store the raw label. Blank labels are only rejected at start time,
    /// but a non-blank label clears a pending validation error.
    pub fn set_task_label(&mut self, text: &str) {
        self.task_label = text.to_string();
        if !is_blank(text) {
            self.validation_error = false;
        }
    }

    /// Start the countdown, or pause it when already running.
    pub fn start(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Running => {
                self.state = TimerState::Paused;
                debug!(remaining_secs = self.remaining_secs, "timer paused");
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerState::Idle | TimerState::Paused | TimerState::Completed => {
                if is_blank(&self.task_label) {
                    self.validation_error = true;
                    debug!("start rejected: blank task label");
                    return Some(Event::ValidationFailed { at: Utc::now() });
                }
                self.validation_error = false;
                let resumed = self.state == TimerState::Paused;
                self.state = TimerState::Running;
                if resumed {
                    debug!(remaining_secs = self.remaining_secs, "timer resumed");
                    Some(Event::TimerResumed {
                        remaining_secs: self.remaining_secs,
                        at: Utc::now(),
                    })
                } else {
                    debug!(planned_minutes = self.planned_minutes, "timer started");
                    Some(Event::TimerStarted {
                        planned_minutes: self.planned_minutes,
                        task_label: self.task_label.clone(),
                        at: Utc::now(),
                    })
                }
            }
        }
    }

    /// Call once per second. Returns `Some(Event::SessionCompleted)` when
    /// the countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        self.tick_at(Utc::now())
    }

    pub fn tick_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        self.advance_by_at(1, now)
    }

    /// Apply up to `secs` ticks at once, stopping at completion.
    ///
    /// Lets a restarted driver recover the countdown from elapsed wall-clock time.
    pub fn advance_by(&mut self, secs: u64) -> Option<Event> {
        self.advance_by_at(secs, Utc::now())
    }

    pub fn advance_by_at(&mut self, secs: u64, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running || secs == 0 {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(secs);
        if self.remaining_secs == 0 {
            return self.on_natural_completion_at(now);
        }
        None
    }

    /// Record a full-length session once the countdown has hit zero.
    pub fn on_natural_completion(&mut self) -> Option<Event> {
        self.on_natural_completion_at(Utc::now())
    }

    pub fn on_natural_completion_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if self.state != TimerState::Running || self.remaining_secs != 0 {
            return None;
        }
        let record = SessionRecord::new(&self.task_label, self.planned_minutes, 0, now);
        Some(self.complete(record, false, now))
    }

    /// End the session before the countdown runs out.
    ///
    /// Worked time rounds partial minutes up; saved time counts whole minutes only.
    pub fn finish_early(&mut self) -> Option<Event> {
        self.finish_early_at(Utc::now())
    }

    pub fn finish_early_at(&mut self, now: DateTime<Utc>) -> Option<Event> {
        if is_blank(&self.task_label) {
            return None;
        }
        if !matches!(self.state, TimerState::Running | TimerState::Paused) {
            return None;
        }
        let elapsed_secs = self.total_secs().saturating_sub(self.remaining_secs);
        let worked_minutes = secs_to_minutes(elapsed_secs.div_ceil(60));
        let saved_minutes = secs_to_minutes(self.remaining_secs / 60);
        let record = SessionRecord::new(&self.task_label, worked_minutes, saved_minutes, now);
        Some(self.complete(record, true, now))
    }

    /// Cancel the countdown and restore the full planned duration. Keeps the label.
    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();
        debug!("timer reset");
        Some(Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, record: SessionRecord, early: bool, now: DateTime<Utc>) -> Event {
        self.state = TimerState::Completed;
        info!(
            task = record.task(),
            duration_minutes = record.duration_minutes(),
            saved_minutes = record.saved_minutes(),
            early,
            "session completed"
        );
        self.state = TimerState::Idle;
        self.remaining_secs = self.total_secs();
        self.task_label.clear();
        self.validation_error = false;
        Event::SessionCompleted {
            record,
            early,
            at: now,
        }
    }
}

/// Format seconds as `mm:ss`. Minutes are not wrapped into hours.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn minutes_to_secs(minutes: u32) -> u64 {
    u64::from(minutes) * 60
}

fn secs_to_minutes(minutes: u64) -> u32 {
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(minutes: u32, label: &str) -> TimerEngine {
        let mut engine = TimerEngine::new(minutes);
        engine.set_task_label(label);
        engine.start();
        engine
    }

    #[test]
    fn start_pause_resume() {
        let mut engine = TimerEngine::new(10);
        engine.set_task_label("write");
        assert_eq!(engine.state(), TimerState::Idle);

        assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
        assert_eq!(engine.state(), TimerState::Running);

        assert!(matches!(engine.start(), Some(Event::TimerPaused { .. })));
        assert_eq!(engine.state(), TimerState::Paused);

        assert!(matches!(engine.start(), Some(Event::TimerResumed { .. })));
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn blank_label_blocks_start() {
        let mut engine = TimerEngine::new(10);
        engine.set_task_label("   ");
        assert!(matches!(engine.start(), Some(Event::ValidationFailed { .. })));
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.validation_error());
    }

    #[test]
    fn non_blank_label_clears_validation_error() {
        let mut engine = TimerEngine::new(10);
        engine.start();
        assert!(engine.validation_error());
        engine.set_task_label("x");
        assert!(!engine.validation_error());
    }

    #[test]
    fn tick_only_counts_down_while_running() {
        let mut engine = TimerEngine::new(1);
        engine.set_task_label("x");
        assert!(engine.tick().is_none());
        assert_eq!(engine.remaining_secs(), 60);

        engine.start();
        engine.tick();
        assert_eq!(engine.remaining_secs(), 59);

        engine.start(); // pause
        engine.tick();
        assert_eq!(engine.remaining_secs(), 59);
    }

    #[test]
    fn natural_completion_records_full_duration() {
        let mut engine = running(1, "focus");
        let mut completed = None;
        for _ in 0..60 {
            if let Some(event) = engine.tick() {
                completed = Some(event);
            }
        }
        let event = completed.expect("session should complete");
        let record = event.completed_record().unwrap();
        assert_eq!(record.duration_minutes(), 1);
        assert_eq!(record.saved_minutes(), 0);
        assert_eq!(record.task(), "focus");

        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 60);
        assert_eq!(engine.planned_minutes(), 1);
        assert_eq!(engine.task_label(), "");
    }

    #[test]
    fn natural_completion_requires_zero_remaining() {
        let mut engine = running(1, "focus");
        assert!(engine.on_natural_completion().is_none());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn advance_by_clamps_at_zero() {
        let mut engine = running(1, "focus");
        let event = engine.advance_by(10_000);
        assert!(matches!(event, Some(Event::SessionCompleted { early: false, .. })));
        assert_eq!(engine.remaining_secs(), 60);
        assert!(engine.advance_by(5).is_none());
    }

    #[test]
    fn finish_early_rounds_work_up_and_savings_down() {
        let mut engine = running(10, "draft");
        engine.advance_by(241);
        assert_eq!(engine.remaining_secs(), 359);
        let event = engine.finish_early().unwrap();
        let record = event.completed_record().unwrap();
        assert_eq!(record.duration_minutes(), 5);
        assert_eq!(record.saved_minutes(), 5);
        assert!(matches!(event, Event::SessionCompleted { early: true, .. }));
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 600);
        assert_eq!(engine.task_label(), "");
    }

    #[test]
    fn finish_early_from_paused() {
        let mut engine = running(5, "draft");
        engine.advance_by(61);
        engine.start(); // pause
        let record = engine.finish_early().unwrap();
        let record = record.completed_record().unwrap();
        assert_eq!(record.duration_minutes(), 2);
        assert_eq!(record.saved_minutes(), 3);
    }

    #[test]
    fn finish_early_is_noop_when_idle_or_blank() {
        let mut engine = TimerEngine::new(10);
        engine.set_task_label("x");
        assert!(engine.finish_early().is_none());

        let mut engine = running(10, "x");
        engine.set_task_label("  ");
        assert!(engine.finish_early().is_none());
        assert_eq!(engine.state(), TimerState::Running);
    }

    #[test]
    fn set_planned_duration_cancels_countdown() {
        let mut engine = running(10, "x");
        engine.advance_by(30);
        engine.set_planned_duration(30);
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 1800);
        assert_eq!(engine.task_label(), "x");
    }

    #[test]
    fn reset_keeps_label() {
        let mut engine = running(5, "keep me");
        engine.advance_by(100);
        engine.reset();
        assert_eq!(engine.state(), TimerState::Idle);
        assert_eq!(engine.remaining_secs(), 300);
        assert_eq!(engine.task_label(), "keep me");
    }

    #[test]
    fn snapshot_returns_valid_event() {
        let engine = TimerEngine::new(25);
        match engine.snapshot() {
            Event::StateSnapshot {
                state,
                remaining_secs,
                clock,
                ..
            } => {
                assert_eq!(state, TimerState::Idle);
                assert_eq!(remaining_secs, 25 * 60);
                assert_eq!(clock, "25:00");
            }
            _ => panic!("Expected StateSnapshot"),
        }
    }

    #[test]
    fn format_clock_pads() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(65), "01:05");
        assert_eq!(format_clock(3600), "60:00");
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut engine = running(1, "x");
        assert_eq!(engine.progress(), 0.0);
        engine.advance_by(30);
        assert!((engine.progress() - 0.5).abs() < f64::EPSILON);
        assert_eq!(TimerEngine::new(0).progress(), 0.0);
    }

    #[test]
    fn engine_roundtrips_through_json() {
        let mut engine = running(10, "persist");
        engine.advance_by(42);
        let json = serde_json::to_string(&engine).unwrap();
        let restored: TimerEngine = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, engine);
    }
}
