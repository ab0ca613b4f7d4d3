use clap::Subcommand;
use pomotimer_core::{format_clock, Database};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's stats
    Today,
    /// All-time stats
    All,
    /// Most recently completed phases
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        StatsAction::Today => {
            let stats = db.stats_today()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::All => {
            let stats = db.stats_all()?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        StatsAction::History { limit } => {
            for record in db.recent_phases(limit)? {
                println!(
                    "{}  {:<4}  {}",
                    record
                        .completed_at
                        .with_timezone(&chrono::Local)
                        .format("%Y-%m-%d %H:%M"),
                    record.phase.as_str(),
                    format_clock(record.duration)
                );
            }
        }
    }
    Ok(())
}
