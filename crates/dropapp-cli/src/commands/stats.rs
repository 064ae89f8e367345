use clap::Subcommand;

use dropapp_core::storage::Database;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's drink stats
    Today,
    /// All-time drink stats
    All,
    /// Most recent drinks, newest first
    Recent {
        /// How many drinks to show
        #[arg(long, default_value = "10")]
        limit: u32,
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
        StatsAction::Recent { limit } => {
            let drinks = db.recent_drinks(limit)?;
            println!("{}", serde_json::to_string_pretty(&drinks)?);
        }
    }
    Ok(())
}
