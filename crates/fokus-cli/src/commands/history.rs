use clap::Subcommand;
use fokus_core::Database;
use serde::Serialize;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// List recorded sessions, newest first
    List,
    /// Session count and total minutes
    Summary,
    /// Delete one session by its list index (0 is the newest)
    Remove { index: usize },
    /// Delete every recorded session
    Clear,
}

#[derive(Serialize)]
struct HistorySummary {
    sessions: usize,
    total_minutes: u64,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut history = db.load_history();

    match action {
        HistoryAction::List => {
            println!("{}", serde_json::to_string_pretty(&history)?);
        }
        HistoryAction::Summary => {
            let summary = HistorySummary {
                sessions: history.len(),
                total_minutes: history.total_minutes(),
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        HistoryAction::Remove { index } => {
            let removed = history.remove_at(index)?;
            db.save_history(&history)?;
            println!("{}", serde_json::to_string_pretty(&removed)?);
        }
        HistoryAction::Clear => {
            let count = history.len();
            history.clear();
            db.save_history(&history)?;
            println!("cleared {count} sessions");
        }
    }
    Ok(())
}
