use std::path::PathBuf;

use chrono::{Local, Utc};
use clap::Subcommand;
use stillpoint_core::storage::Database;
use stillpoint_core::{snapshot, stats, PracticeData};

#[derive(Subcommand)]
pub enum DataAction {
    /// Write a snapshot of all practice data to a JSON file
    Export {
        /// Output path (defaults to stillpoint-YYYY-MM-DD.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace all practice data from a snapshot file
    Import { path: PathBuf },
    /// Delete all recorded practice data
    Reset,
}

pub fn run(action: DataAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        DataAction::Export { out } => {
            let data = PracticeData::load(&db);
            let json = snapshot::export(&data, Utc::now())?;
            let path =
                out.unwrap_or_else(|| PathBuf::from(snapshot::file_name(Local::now().date_naive())));
            std::fs::write(&path, json)?;
            println!("exported to {}", path.display());
        }
        DataAction::Import { path } => {
            let json = std::fs::read_to_string(&path)?;
            match snapshot::import(&json) {
                Ok(data) => {
                    data.persist(&db);
                    println!(
                        "imported {} sessions ({} seconds of practice)",
                        data.total_sessions, data.total_time
                    );
                }
                Err(e) => return Err(format!("import rejected: {e}").into()),
            }
        }
        DataAction::Reset => {
            db.kv_delete(stats::PRACTICE_DATA_KEY)?;
            println!("practice data reset");
        }
    }
    Ok(())
}
