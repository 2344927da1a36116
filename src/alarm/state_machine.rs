//! Threshold crossing detection with per-threshold trigger latches.
//!
//! The machine is pure and synchronous: one call per tick with the live
//! sample and a settings snapshot, producing the alert text to display and
//! at most one audio action. The latches exist so a non-looping tone fires
//! once per crossing instead of every tick while the condition persists.

use crate::audio::AlarmSound;
use crate::battery::BatterySample;
use crate::settings::AlarmSettings;

pub const UNPLUG_ALERT: &str = "⚠ UNPLUG CHARGER NOW";
pub const PLUG_IN_ALERT: &str = "⚠ LOW BATTERY - PLUG IN";

/// Audio action requested by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioAction {
    Play { sound: AlarmSound, looped: bool },
    Stop,
}

/// Result of evaluating one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// User-facing alert text; empty while no alarm condition holds.
    pub alert_text: String,
    pub action: Option<AudioAction>,
}

/// Per-threshold trigger latches. Fresh state per instance, so tests build
/// one per scenario and the app holds exactly one for its lifetime.
#[derive(Debug, Default)]
pub struct AlarmStateMachine {
    upper_triggered: bool,
    lower_triggered: bool,
}

impl AlarmStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates one tick. Rules in priority order:
    ///
    /// 1. Alarms disabled: clear text, stop, rearm both latches.
    /// 2. Plugged in at or above the upper limit: unplug alert; play the
    ///    upper tone if the upper latch is idle, latching only one-shots.
    /// 3. On battery at or below the lower limit: symmetric with the lower
    ///    threshold.
    /// 4. Normal band: clear text, stop, rearm both latches so either side
    ///    can fire again after the next crossing.
    pub fn evaluate(&mut self, sample: &BatterySample, settings: &AlarmSettings) -> TickOutcome {
        if !settings.enabled {
            self.upper_triggered = false;
            self.lower_triggered = false;
            return TickOutcome {
                alert_text: String::new(),
                action: Some(AudioAction::Stop),
            };
        }

        let level = f64::from(sample.level);

        if sample.plugged_in && level >= settings.upper_limit {
            let mut action = None;
            if !self.upper_triggered {
                action = Some(AudioAction::Play {
                    sound: settings.upper_sound,
                    looped: settings.upper_loop,
                });
                // A looping tone never latches: the dispatcher dedupes the
                // per-tick reissue, and crossing out rearms via rule 4.
                if !settings.upper_loop {
                    self.upper_triggered = true;
                }
            }
            return TickOutcome {
                alert_text: UNPLUG_ALERT.to_string(),
                action,
            };
        }

        if !sample.plugged_in && level <= settings.lower_limit {
            let mut action = None;
            if !self.lower_triggered {
                action = Some(AudioAction::Play {
                    sound: settings.lower_sound,
                    looped: settings.lower_loop,
                });
                if !settings.lower_loop {
                    self.lower_triggered = true;
                }
            }
            return TickOutcome {
                alert_text: PLUG_IN_ALERT.to_string(),
                action,
            };
        }

        self.upper_triggered = false;
        self.lower_triggered = false;
        TickOutcome {
            alert_text: String::new(),
            action: Some(AudioAction::Stop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(level: u8, plugged_in: bool) -> BatterySample {
        BatterySample { level, plugged_in }
    }

    fn settings() -> AlarmSettings {
        AlarmSettings {
            enabled: true,
            ..AlarmSettings::default()
        }
    }

    #[test]
    fn one_shot_upper_alarm_fires_exactly_once_per_crossing() {
        let mut machine = AlarmStateMachine::new();
        let cfg = AlarmSettings {
            upper_loop: false,
            ..settings()
        };

        let outcome = machine.evaluate(&sample(85, true), &cfg);
        assert_eq!(outcome.alert_text, UNPLUG_ALERT);
        assert_eq!(
            outcome.action,
            Some(AudioAction::Play {
                sound: AlarmSound::Classic,
                looped: false
            })
        );

        // Condition persists: latched, no replay.
        let outcome = machine.evaluate(&sample(86, true), &cfg);
        assert_eq!(outcome.alert_text, UNPLUG_ALERT);
        assert_eq!(outcome.action, None);

        // Back in the normal band: stop and rearm.
        let outcome = machine.evaluate(&sample(50, true), &cfg);
        assert!(outcome.alert_text.is_empty());
        assert_eq!(outcome.action, Some(AudioAction::Stop));

        // A new crossing fires again.
        let outcome = machine.evaluate(&sample(85, true), &cfg);
        assert!(matches!(outcome.action, Some(AudioAction::Play { .. })));
    }

    #[test]
    fn looping_lower_alarm_reissues_play_every_tick() {
        let mut machine = AlarmStateMachine::new();
        let cfg = AlarmSettings {
            lower_loop: true,
            lower_sound: AlarmSound::Pulse,
            ..settings()
        };

        for _ in 0..3 {
            let outcome = machine.evaluate(&sample(15, false), &cfg);
            assert_eq!(outcome.alert_text, PLUG_IN_ALERT);
            assert_eq!(
                outcome.action,
                Some(AudioAction::Play {
                    sound: AlarmSound::Pulse,
                    looped: true
                })
            );
        }
    }

    #[test]
    fn thresholds_only_apply_on_the_matching_power_source() {
        let mut machine = AlarmStateMachine::new();
        let cfg = settings();

        // Full but unplugged: not an upper alarm.
        let outcome = machine.evaluate(&sample(95, false), &cfg);
        assert!(outcome.alert_text.is_empty());

        // Low but plugged in: not a lower alarm.
        let outcome = machine.evaluate(&sample(10, true), &cfg);
        assert!(outcome.alert_text.is_empty());
    }

    #[test]
    fn disabling_clears_text_stops_audio_and_rearms() {
        let mut machine = AlarmStateMachine::new();
        let enabled = AlarmSettings {
            upper_loop: false,
            ..settings()
        };

        machine.evaluate(&sample(85, true), &enabled);
        assert!(machine.upper_triggered);

        let disabled = AlarmSettings {
            enabled: false,
            ..enabled.clone()
        };
        let outcome = machine.evaluate(&sample(85, true), &disabled);
        assert!(outcome.alert_text.is_empty());
        assert_eq!(outcome.action, Some(AudioAction::Stop));
        assert!(!machine.upper_triggered);

        // Re-enabled with the condition still holding: fires fresh.
        let outcome = machine.evaluate(&sample(85, true), &enabled);
        assert!(matches!(outcome.action, Some(AudioAction::Play { .. })));
    }

    #[test]
    fn normal_band_rearms_both_latches() {
        let mut machine = AlarmStateMachine::new();
        let cfg = AlarmSettings {
            upper_loop: false,
            lower_loop: false,
            ..settings()
        };

        machine.evaluate(&sample(85, true), &cfg);
        assert!(machine.upper_triggered);

        machine.evaluate(&sample(50, false), &cfg);
        assert!(!machine.upper_triggered);
        assert!(!machine.lower_triggered);

        machine.evaluate(&sample(15, false), &cfg);
        assert!(machine.lower_triggered);

        machine.evaluate(&sample(50, false), &cfg);
        assert!(!machine.lower_triggered);
    }

    #[test]
    fn boundary_levels_are_inclusive() {
        let mut machine = AlarmStateMachine::new();
        let cfg = settings();

        let outcome = machine.evaluate(&sample(80, true), &cfg);
        assert_eq!(outcome.alert_text, UNPLUG_ALERT);

        let mut machine = AlarmStateMachine::new();
        let outcome = machine.evaluate(&sample(20, false), &cfg);
        assert_eq!(outcome.alert_text, PLUG_IN_ALERT);
    }
}
