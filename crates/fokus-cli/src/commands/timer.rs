use std::io::Write;
use std::time::Duration;

use chrono::Utc;
use clap::Subcommand;
use fokus_core::{format_clock, Config, Database, Event, History, PersistedTimer, TimerState};
use tracing::{debug, info};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print current timer state as JSON
    Status,
    /// Select a preset duration (cancels a running countdown)
    Duration {
        /// Minutes; must be one of the configured presets
        minutes: u32,
    },
    /// Set the task label
    Label {
        /// What you are working on
        text: String,
    },
    /// Start the countdown, or pause it when running
    Start,
    /// Advance a running countdown by whole seconds
    Tick {
        #[arg(long, default_value = "1")]
        count: u64,
    },
    /// Finish the session early and record the time worked
    Done,
    /// Restore the full planned duration
    Reset,
    /// Drive the countdown in the foreground until it completes (Ctrl-C pauses)
    Run,
}

impl TimerAction {
    fn targets_running_session(&self) -> bool {
        matches!(
            self,
            TimerAction::Start | TimerAction::Tick { .. } | TimerAction::Done | TimerAction::Run
        )
    }
}

/// The CLI as driver and persistence collaborator for one timer.
struct Driver {
    db: Database,
    timer: PersistedTimer,
}

impl Driver {
    fn open(config: &Config) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open()?;
        let timer = db.load_timer(config.timer.default_duration);
        Ok(Self { db, timer })
    }

    /// Apply the wall-clock seconds that passed since the last save.
    fn catch_up(&mut self) -> Option<Event> {
        if self.timer.engine.state() != TimerState::Running {
            return None;
        }
        let now = Utc::now();
        let elapsed = (now - self.timer.saved_at).num_seconds().max(0);
        let remaining = self.timer.engine.remaining_secs();
        let finished_at = if elapsed as u64 >= remaining {
            self.timer.saved_at + chrono::Duration::seconds(remaining as i64)
        } else {
            now
        };
        debug!(elapsed, remaining, "catching up timer");
        let event = self.timer.engine.advance_by_at(elapsed as u64, finished_at);
        // Keep sub-second remainders so repeated invocations do not drift.
        self.timer.saved_at += chrono::Duration::seconds(elapsed);
        event
    }

    /// Append a completed session to history and persist it.
    fn record(&self, event: &Event) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(record) = event.completed_record() {
            let mut history: History = self.db.load_history();
            history.append(record.clone());
            self.db.save_history(&history)?;
            info!(sessions = history.len(), "session appended to history");
        }
        Ok(())
    }

    fn mark_clock(&mut self) {
        self.timer.saved_at = Utc::now();
    }

    fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.db.save_timer(&self.timer)?;
        Ok(())
    }
}

fn print_event(event: &Event) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut driver = Driver::open(&config)?;

    // Stdout carries exactly one JSON document per invocation. A completion
    // found while catching up is logged; when the action targets the running
    // session, that completion is the result and the action is skipped.
    if let Some(event) = driver.catch_up() {
        driver.record(&event)?;
        info!("session completed while no driver was running");
        if action.targets_running_session() {
            print_event(&event)?;
            driver.save()?;
            return Ok(());
        }
    }

    match action {
        TimerAction::Status => {
            print_event(&driver.timer.engine.snapshot())?;
        }
        TimerAction::Duration { minutes } => {
            let minutes = config.check_preset(minutes)?;
            if let Some(event) = driver.timer.engine.set_planned_duration(minutes) {
                print_event(&event)?;
            }
        }
        TimerAction::Label { text } => {
            driver.timer.engine.set_task_label(&text);
            print_event(&driver.timer.engine.snapshot())?;
        }
        TimerAction::Start => {
            if let Some(event) = driver.timer.engine.start() {
                print_event(&event)?;
            }
            driver.mark_clock();
        }
        TimerAction::Tick { count } => {
            match driver.timer.engine.advance_by(count) {
                Some(event) => {
                    driver.record(&event)?;
                    print_event(&event)?;
                }
                None => print_event(&driver.timer.engine.snapshot())?,
            }
        }
        TimerAction::Done => match driver.timer.engine.finish_early() {
            Some(event) => {
                driver.record(&event)?;
                print_event(&event)?;
            }
            None => print_event(&driver.timer.engine.snapshot())?,
        },
        TimerAction::Reset => {
            if let Some(event) = driver.timer.engine.reset() {
                print_event(&event)?;
            }
        }
        TimerAction::Run => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(drive(&mut driver))?;
        }
    }

    driver.save()?;
    Ok(())
}

/// Foreground driver: one tick per second until the session completes.
async fn drive(driver: &mut Driver) -> Result<(), Box<dyn std::error::Error>> {
    if driver.timer.engine.state() != TimerState::Running {
        match driver.timer.engine.start() {
            Some(event @ Event::ValidationFailed { .. }) => {
                print_event(&event)?;
                return Err("task label is blank; set one with `timer label`".into());
            }
            Some(event) => print_event(&event)?,
            None => {}
        }
    }

    let mut interval = tokio::time::interval(Duration::from_secs(1));
    // The first tick fires immediately.
    interval.tick().await;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {
                driver.mark_clock();
                if let Some(event) = driver.timer.engine.tick() {
                    eprintln!();
                    driver.record(&event)?;
                    print_event(&event)?;
                    return Ok(());
                }
                let engine = &driver.timer.engine;
                eprint!("\r{}  {}", format_clock(engine.remaining_secs()), engine.task_label());
                std::io::stderr().flush()?;
                driver.save()?;
            }
            _ = &mut ctrl_c => {
                eprintln!();
                if let Some(event) = driver.timer.engine.start() {
                    print_event(&event)?;
                }
                info!("countdown paused by interrupt");
                return Ok(());
            }
        }
    }
}
