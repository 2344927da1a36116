use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::audio::AlarmSound;

/// Charge alarm thresholds and notification preferences. Owned by the user,
/// read as a snapshot by the alarm loop each tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlarmSettings {
    pub enabled: bool,
    pub upper_limit: f64,
    pub lower_limit: f64,
    pub upper_sound: AlarmSound,
    pub lower_sound: AlarmSound,
    pub upper_loop: bool,
    pub lower_loop: bool,
}

impl Default for AlarmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            upper_limit: 80.0,
            lower_limit: 20.0,
            upper_sound: AlarmSound::Classic,
            lower_sound: AlarmSound::Classic,
            upper_loop: true,
            lower_loop: true,
        }
    }
}

impl AlarmSettings {
    /// Forces the limits into their allowed bands: upper 50..=100,
    /// lower 5..=50.
    pub fn clamped(mut self) -> Self {
        self.upper_limit = self.upper_limit.clamp(50.0, 100.0);
        self.lower_limit = self.lower_limit.clamp(5.0, 50.0);
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct UserSettings {
    alarm: AlarmSettings,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn alarm(&self) -> AlarmSettings {
        self.data.read().unwrap().alarm.clone()
    }

    pub fn update_alarm(&self, settings: AlarmSettings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.alarm = settings.clamped();
        self.persist(&guard)?;
        Ok(())
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
