use clap::Subcommand;
use stillpoint_core::level;

#[derive(Subcommand)]
pub enum LevelAction {
    /// List the practice levels
    List,
    /// Show a level's guidance steps
    Show { id: u32 },
}

pub fn run(action: LevelAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        LevelAction::List => {
            for lvl in level::catalog() {
                println!("{}  {}", lvl.id, lvl.name);
            }
        }
        LevelAction::Show { id } => {
            let Some(lvl) = level::by_id(id) else {
                return Err(format!("unknown practice level: {id}").into());
            };
            println!("{}  {}", lvl.id, lvl.name);
            for (i, step) in lvl.steps.iter().enumerate() {
                println!("  {}. {step}", i + 1);
            }
        }
    }
    Ok(())
}
