//! # Fokus Core Library
//!
//! This library provides the core logic for the Fokus focus timer: a user
//! names a task, runs a countdown, and the finished session is recorded with
//! the minutes actually worked and any whole minutes saved by finishing early.
//! All operations are available through the standalone CLI binary, which is a
//! thin driver over this crate.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine; the caller invokes `tick()`
//!   once per second and appends emitted session records to the history
//! - **History**: The newest-first session log
//! - **Stats**: Pure aggregations over the history (summary and weekly series)
//! - **Storage**: SQLite key-value persistence and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`History`]: Session log
//! - [`compute_stats`] / [`compute_weekly_series`]: Analytics
//! - [`Database`]: History and timer persistence
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod history;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::Event;
pub use history::History;
pub use session::{SessionRecord, UNTITLED_TASK};
pub use stats::{
    compute_stats, compute_stats_on, compute_weekly_series, compute_weekly_series_on,
    StatsSummary, WeeklyBucket, WeeklySeries,
};
pub use storage::{Config, Database, PersistedTimer, TimerConfig};
pub use timer::{format_clock, TimerEngine, TimerState};
