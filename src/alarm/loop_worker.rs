use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use std::sync::Arc;
use tauri::{AppHandle, Emitter};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::audio::AlarmAudioHandle;
use crate::battery::{self, BatterySample};
use crate::settings::SettingsStore;

use super::state_machine::{AlarmStateMachine, AudioAction};

const TICK_INTERVAL_SECS: u64 = 2;
const SAMPLE_TIMEOUT_SECS: u64 = 5;

#[derive(Serialize, Clone)]
struct BatteryStatusEvent {
    timestamp: DateTime<Utc>,
    level: u8,
    plugged_in: bool,
    alert_text: String,
}

/// Fixed-period alarm ticker. Each tick is one short synchronous evaluation
/// of the state machine; a tick that can't get a live sample is skipped
/// outright, leaving the trigger latches untouched. Overlapping ticks are
/// skipped, not queued.
pub async fn alarm_loop(
    app_handle: AppHandle,
    settings: Arc<SettingsStore>,
    audio: AlarmAudioHandle,
    cancel_token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(TICK_INTERVAL_SECS));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut machine = AlarmStateMachine::new();

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sample = match read_sample_with_timeout().await {
                    Ok(sample) => sample,
                    Err(err) => {
                        warn!("skipping alarm tick: {err}");
                        continue;
                    }
                };

                let outcome = machine.evaluate(&sample, &settings.alarm());

                match outcome.action {
                    Some(AudioAction::Play { sound, looped }) => {
                        if let Err(err) = audio.play(sound, looped) {
                            warn!("alarm play failed: {err}");
                        }
                    }
                    Some(AudioAction::Stop) => {
                        if let Err(err) = audio.stop() {
                            warn!("alarm stop failed: {err}");
                        }
                    }
                    None => {}
                }

                let payload = BatteryStatusEvent {
                    timestamp: Utc::now(),
                    level: sample.level,
                    plugged_in: sample.plugged_in,
                    alert_text: outcome.alert_text,
                };
                let _ = app_handle.emit("battery-status", payload);
            }
            _ = cancel_token.cancelled() => {
                info!("alarm loop shutting down");
                break;
            }
        }
    }
}

async fn read_sample_with_timeout() -> Result<BatterySample, String> {
    let probe = tokio::task::spawn_blocking(battery::read_sample);
    match tokio::time::timeout(Duration::from_secs(SAMPLE_TIMEOUT_SECS), probe).await {
        Ok(Ok(Ok(sample))) => Ok(sample),
        Ok(Ok(Err(err))) => Err(format!("live sample unavailable: {err}")),
        Ok(Err(err)) => Err(format!("sample probe worker join failed: {err}")),
        Err(_) => Err(format!("sample probe timeout (> {SAMPLE_TIMEOUT_SECS}s)")),
    }
}
