//! Integration tests for the timer state machine driving the session history.

use chrono::{DateTime, Utc};
use fokus_core::{Database, Event, History, TimerEngine, TimerState};

fn drain_ticks(engine: &mut TimerEngine, ticks: u64) -> Vec<Event> {
    (0..ticks).filter_map(|_| engine.tick()).collect()
}

#[test]
fn test_run_to_completion_appends_full_session() {
    let mut engine = TimerEngine::new(10);
    let mut history = History::new();

    engine.set_task_label("Deep work");
    assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));

    let events = drain_ticks(&mut engine, 10 * 60);
    assert_eq!(events.len(), 1, "exactly one completion event");
    for event in &events {
        if let Some(record) = event.completed_record() {
            history.append(record.clone());
        }
    }

    assert_eq!(history.len(), 1);
    let record = &history.records()[0];
    assert_eq!(record.duration_minutes(), 10);
    assert_eq!(record.saved_minutes(), 0);
    assert_eq!(record.task(), "Deep work");

    // Ready for the next session with the same duration.
    assert_eq!(engine.state(), TimerState::Idle);
    assert_eq!(engine.planned_minutes(), 10);
    assert_eq!(engine.remaining_secs(), 600);
    assert_eq!(engine.task_label(), "");
}

#[test]
fn test_extra_ticks_after_completion_do_nothing() {
    let mut engine = TimerEngine::new(1);
    engine.set_task_label("short");
    engine.start();
    let events = drain_ticks(&mut engine, 500);
    assert_eq!(events.len(), 1);
    assert_eq!(engine.remaining_secs(), 60);
}

#[test]
fn test_finish_early_after_241_seconds() {
    let mut engine = TimerEngine::new(10);
    engine.set_task_label("Email");
    engine.start();
    assert!(drain_ticks(&mut engine, 241).is_empty());
    assert_eq!(engine.remaining_secs(), 359);

    let ended_at: DateTime<Utc> = "2024-05-01T09:04:01Z".parse().unwrap();
    let event = engine.finish_early_at(ended_at).expect("session recorded");
    let record = event.completed_record().unwrap();
    assert_eq!(record.duration_minutes(), 5);
    assert_eq!(record.saved_minutes(), 5);
    assert_eq!(record.timestamp(), ended_at);
}

#[test]
fn test_finish_early_with_blank_label_in_every_phase() {
    let mut engine = TimerEngine::new(5);
    assert!(engine.finish_early().is_none());
    assert_eq!(engine.state(), TimerState::Idle);

    engine.set_task_label("x");
    engine.start();
    engine.set_task_label("");
    assert!(engine.finish_early().is_none());
    assert_eq!(engine.state(), TimerState::Running);

    engine.start(); // pause
    assert!(engine.finish_early().is_none());
    assert_eq!(engine.state(), TimerState::Paused);
}

#[test]
fn test_validation_flag_then_successful_start() {
    let mut engine = TimerEngine::new(5);
    assert!(matches!(engine.start(), Some(Event::ValidationFailed { .. })));
    assert!(engine.validation_error());
    assert_eq!(engine.state(), TimerState::Idle);

    engine.set_task_label("x");
    assert!(matches!(engine.start(), Some(Event::TimerStarted { .. })));
    assert!(!engine.validation_error());
    assert_eq!(engine.state(), TimerState::Running);
}

#[test]
fn test_paused_timer_survives_persistence() {
    let db = Database::open_memory().unwrap();
    let mut timer = db.load_timer(30);
    timer.engine.set_task_label("Report");
    timer.engine.start();
    timer.engine.advance_by(90);
    timer.engine.start(); // pause
    db.save_timer(&timer).unwrap();

    let restored = db.load_timer(30);
    assert_eq!(restored.engine.state(), TimerState::Paused);
    assert_eq!(restored.engine.remaining_secs(), 30 * 60 - 90);
    assert_eq!(restored.engine.task_label(), "Report");
}
