use clap::Subcommand;
use fokus_core::{compute_stats, compute_weekly_series, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Totals, averages and the current streak
    Summary,
    /// Minutes per day for the last seven days, oldest first
    Weekly,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let history = db.load_history();

    match action {
        StatsAction::Summary => {
            let stats = compute_stats(history.records());
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::Weekly => {
            let series = compute_weekly_series(history.records());
            println!("{}", serde_json::to_string_pretty(&series)?);
        }
    }
    Ok(())
}
