use chrono::Local;
use clap::Subcommand;
use stillpoint_core::storage::Database;
use stillpoint_core::{level, PracticeData};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Print the aggregate statistics as JSON
    Show {
        /// Rebuild the streak from session history before printing
        #[arg(long)]
        recompute: bool,
    },
    /// Print recent session history as JSON
    History {
        /// Maximum number of entries to print
        #[arg(long, default_value = "15")]
        limit: usize,
    },
    /// Configure a level's practice goals
    Goal {
        /// Practice level id (see `level list`)
        level: u32,
        /// Per-session target in minutes
        #[arg(long)]
        target_minutes: Option<u32>,
        /// Enable or disable the per-session goal
        #[arg(long)]
        session: Option<bool>,
        /// Cumulative practice target in hours
        #[arg(long)]
        total_hours: Option<f64>,
        /// Enable or disable the cumulative goal
        #[arg(long)]
        total: Option<bool>,
    },
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let mut data = PracticeData::load(&db);
    let today = Local::now().date_naive();

    match action {
        StatsAction::Show { recompute } => {
            if recompute {
                data.recompute_streak(today, &Local);
                data.persist(&db);
            }
            println!("{}", serde_json::to_string_pretty(&data.summary(today))?);
        }
        StatsAction::History { limit } => {
            let recent: Vec<_> = data.history.iter().take(limit).collect();
            println!("{}", serde_json::to_string_pretty(&recent)?);
        }
        StatsAction::Goal {
            level,
            target_minutes,
            session,
            total_hours,
            total,
        } => {
            if level::by_id(level).is_none() {
                return Err(format!("unknown practice level: {level}").into());
            }
            data.set_goal(level, target_minutes, session, total_hours, total)?;
            data.persist(&db);
            println!("{}", serde_json::to_string_pretty(&data.goals[&level])?);
        }
    }
    Ok(())
}
