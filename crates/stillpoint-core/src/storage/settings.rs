//! User settings, persisted as individual scalar kv entries.

use serde::{Deserialize, Serialize};

use super::Database;
use crate::error::{CoreError, ValidationError};

const DURATION_KEY: &str = "duration_min";
const SOUND_KEY: &str = "sound";
const AUTO_ADVANCE_KEY: &str = "auto_advance";

/// Session settings. Loaded once at startup; persisted on every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Session duration in minutes. Always > 0.
    pub duration_min: u32,
    /// Ring the bell when the countdown completes.
    pub sound_enabled: bool,
    /// Auto-advance guidance steps during practice.
    pub auto_advance: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            duration_min: 5,
            sound_enabled: true,
            auto_advance: true,
        }
    }
}

impl Settings {
    pub fn duration_secs(&self) -> u64 {
        u64::from(self.duration_min) * 60
    }

    /// Load from the kv store. Missing or unparseable entries fall back to
    /// their defaults; a broken store never blocks startup.
    pub fn load(db: &Database) -> Self {
        let defaults = Self::default();
        let duration_min = read_key(db, DURATION_KEY)
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&d| d > 0)
            .unwrap_or(defaults.duration_min);
        let sound_enabled = read_key(db, SOUND_KEY)
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.sound_enabled);
        let auto_advance = read_key(db, AUTO_ADVANCE_KEY)
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.auto_advance);
        Self {
            duration_min,
            sound_enabled,
            auto_advance,
        }
    }

    /// Persist all settings. Write failures are logged and dropped.
    pub fn persist(&self, db: &Database) {
        let entries = [
            (DURATION_KEY, self.duration_min.to_string()),
            (SOUND_KEY, self.sound_enabled.to_string()),
            (AUTO_ADVANCE_KEY, self.auto_advance.to_string()),
        ];
        for (key, value) in entries {
            if let Err(e) = db.kv_set(key, &value) {
                tracing::warn!("failed to persist setting '{key}': {e}");
            }
        }
    }

    /// Get a setting as a string by its CLI key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "duration" => Some(self.duration_min.to_string()),
            "sound" => Some(self.sound_enabled.to_string()),
            "auto_advance" => Some(self.auto_advance.to_string()),
            _ => None,
        }
    }

    /// Set a setting by its CLI key. Returns an error for unknown keys or
    /// values that do not parse (duration must be a positive integer).
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        match key {
            "duration" => {
                let minutes: u32 = value.parse().map_err(|_| ValidationError::InvalidValue {
                    field: "duration".into(),
                    message: format!("'{value}' is not a positive integer"),
                })?;
                if minutes == 0 {
                    return Err(ValidationError::InvalidValue {
                        field: "duration".into(),
                        message: "duration must be greater than zero".into(),
                    }
                    .into());
                }
                self.duration_min = minutes;
            }
            "sound" => {
                self.sound_enabled =
                    value.parse().map_err(|_| ValidationError::InvalidValue {
                        field: "sound".into(),
                        message: format!("'{value}' is not true/false"),
                    })?;
            }
            "auto_advance" => {
                self.auto_advance =
                    value.parse().map_err(|_| ValidationError::InvalidValue {
                        field: "auto_advance".into(),
                        message: format!("'{value}' is not true/false"),
                    })?;
            }
            _ => {
                return Err(CoreError::Custom(format!("unknown setting: {key}")));
            }
        }
        Ok(())
    }
}

fn read_key(db: &Database, key: &str) -> Option<String> {
    match db.kv_get(key) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("failed to read setting '{key}': {e}");
            None
        }
    }
}
