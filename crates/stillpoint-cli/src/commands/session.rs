use chrono::{Local, Utc};
use clap::Subcommand;
use stillpoint_core::storage::Database;
use stillpoint_core::{level, Event, PracticeData, SessionTimer, Settings, TimerState};

const TIMER_KEY: &str = "session_timer";

#[derive(Subcommand)]
pub enum SessionAction {
    /// Begin a practice session
    Start {
        /// Practice level id (see `level list`)
        #[arg(long)]
        level: u32,
        /// Override the configured duration (minutes)
        #[arg(long)]
        duration: Option<u32>,
    },
    /// Pause the running session
    Pause,
    /// Resume a paused session
    Resume,
    /// Tick the timer and print the current state as JSON
    Status,
    /// End the session, recording it if it lasted long enough
    Finish,
    /// Abandon the session without recording anything
    Abort,
}

fn load_timer(db: &Database) -> Option<SessionTimer> {
    let json = db.kv_get(TIMER_KEY).ok()??;
    serde_json::from_str(&json).ok()
}

fn save_timer(db: &Database, timer: &SessionTimer) -> Result<(), Box<dyn std::error::Error>> {
    let json = serde_json::to_string(timer)?;
    db.kv_set(TIMER_KEY, &json)?;
    Ok(())
}

/// Terminal bell. Any write failure is ignored; the session proceeds
/// without sound.
fn ring_bell(settings: &Settings) {
    use std::io::Write;
    if !settings.sound_enabled {
        return;
    }
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let settings = Settings::load(&db);
    let now = Utc::now();

    match action {
        SessionAction::Start { level, duration } => {
            if level::by_id(level).is_none() {
                return Err(format!("unknown practice level: {level}").into());
            }
            if let Some(existing) = load_timer(&db) {
                if existing.state() != TimerState::Idle {
                    return Err("a session is already in progress; finish or abort it first".into());
                }
            }
            let minutes = duration.unwrap_or(settings.duration_min);
            if minutes == 0 {
                return Err("duration must be greater than zero".into());
            }
            let mut timer = SessionTimer::new(level, u64::from(minutes) * 60);
            if let Some(event) = timer.start(now) {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            save_timer(&db, &timer)?;
        }
        SessionAction::Pause => {
            let Some(mut timer) = load_timer(&db) else {
                return Err("no session in progress".into());
            };
            if let Some(event @ Event::OvertimeStarted { .. }) = timer.tick(now) {
                ring_bell(&settings);
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            match timer.pause(now) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&timer.snapshot(now, settings.auto_advance))?
                ),
            }
            save_timer(&db, &timer)?;
        }
        SessionAction::Resume => {
            let Some(mut timer) = load_timer(&db) else {
                return Err("no session in progress".into());
            };
            match timer.resume(now) {
                Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
                None => println!(
                    "{}",
                    serde_json::to_string_pretty(&timer.snapshot(now, settings.auto_advance))?
                ),
            }
            save_timer(&db, &timer)?;
        }
        SessionAction::Status => {
            let Some(mut timer) = load_timer(&db) else {
                println!("{{\"type\": \"no_session\"}}");
                return Ok(());
            };
            if let Some(event @ Event::OvertimeStarted { .. }) = timer.tick(now) {
                ring_bell(&settings);
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            println!(
                "{}",
                serde_json::to_string_pretty(&timer.snapshot(now, settings.auto_advance))?
            );
            save_timer(&db, &timer)?;
        }
        SessionAction::Finish => {
            let Some(mut timer) = load_timer(&db) else {
                return Err("no session in progress".into());
            };
            // Flush before finishing so a boundary crossed since the last
            // status still rings the completion tone.
            if let Some(event @ Event::OvertimeStarted { .. }) = timer.tick(now) {
                ring_bell(&settings);
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
            let Some(Event::SessionFinished {
                level,
                elapsed_secs,
                ..
            }) = timer.finish(now)
            else {
                db.kv_delete(TIMER_KEY)?;
                return Err("no session in progress".into());
            };

            let today = Local::now().date_naive();
            let mut data = PracticeData::load(&db);
            let recorded = data.record_session(level, elapsed_secs, now, today);
            if recorded {
                data.persist(&db);
            }
            db.kv_delete(TIMER_KEY)?;

            let outcome = serde_json::json!({
                "type": if recorded { "session_recorded" } else { "session_discarded" },
                "level": level,
                "elapsed_secs": elapsed_secs,
                "streak": data.current_streak(today),
                "goal_met": data.session_goal_met(level, elapsed_secs),
            });
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        SessionAction::Abort => {
            db.kv_delete(TIMER_KEY)?;
            println!("{{\"type\": \"session_aborted\"}}");
        }
    }

    Ok(())
}
