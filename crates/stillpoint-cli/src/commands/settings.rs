use clap::Subcommand;
use stillpoint_core::storage::Database;
use stillpoint_core::Settings;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print a single setting value
    Get { key: String },
    /// Update a setting (duration, sound, auto_advance)
    Set { key: String, value: String },
    /// Print all settings as JSON
    List,
    /// Restore the default settings
    Reset,
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        SettingsAction::Get { key } => {
            let settings = Settings::load(&db);
            match settings.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown setting: {key}").into()),
            }
        }
        SettingsAction::Set { key, value } => {
            let mut settings = Settings::load(&db);
            settings.set(&key, &value)?;
            settings.persist(&db);
            println!("ok");
        }
        SettingsAction::List => {
            let settings = Settings::load(&db);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Reset => {
            Settings::default().persist(&db);
            println!("settings reset to defaults");
        }
    }
    Ok(())
}
