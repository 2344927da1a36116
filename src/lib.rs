mod alarm;
mod audio;
mod battery;
mod report;
mod settings;

use std::sync::Arc;

use alarm::AlarmMonitor;
use audio::{AlarmAudioHandle, AlarmSound};
use battery::BatterySample;
use log::warn;
use report::{FullReport, PowercfgSource, ReportSummary};
use settings::{AlarmSettings, SettingsStore};
use tauri::{Emitter, Manager, State};

pub(crate) struct AppState {
    audio: AlarmAudioHandle,
    pub(crate) settings: Arc<SettingsStore>,
    pub(crate) monitor: tokio::sync::Mutex<AlarmMonitor>,
    /// Single-flight gate for report generation: a second request while one
    /// is running is rejected instead of spawning another powercfg run.
    report_gate: Arc<tokio::sync::Mutex<()>>,
}

#[tauri::command]
fn get_alarm_settings(state: State<AppState>) -> Result<AlarmSettings, String> {
    Ok(state.settings.alarm())
}

#[tauri::command]
fn set_alarm_settings(
    settings: AlarmSettings,
    state: State<AppState>,
    app_handle: tauri::AppHandle,
) -> Result<(), String> {
    state
        .settings
        .update_alarm(settings)
        .map_err(|e| e.to_string())?;

    // Silence a ringing alarm right away instead of waiting for the next
    // tick to apply the disabled rule.
    if !state.settings.alarm().enabled {
        state.audio.stop()?;
    }

    app_handle
        .emit("alarm-settings-updated", state.settings.alarm())
        .map_err(|e| e.to_string())?;

    Ok(())
}

#[tauri::command]
async fn preview_alarm_sound(sound: AlarmSound, state: State<'_, AppState>) -> Result<(), String> {
    // Async so the preview expiry timer has a runtime to land on.
    state.audio.preview(sound)
}

#[tauri::command]
async fn stop_alarm_preview(state: State<'_, AppState>) -> Result<(), String> {
    state.audio.stop_preview()
}

#[tauri::command]
async fn get_battery_status() -> Result<BatterySample, String> {
    tauri::async_runtime::spawn_blocking(battery::read_sample)
        .await
        .map_err(|e| e.to_string())?
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_live_voltage() -> Result<String, String> {
    tauri::async_runtime::spawn_blocking(battery::live_voltage)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_battery_summary(state: State<'_, AppState>) -> Result<ReportSummary, String> {
    let gate = state.report_gate.clone();
    let Ok(_guard) = gate.try_lock_owned() else {
        return Err("a battery report is already being generated".into());
    };

    tauri::async_runtime::spawn_blocking(|| report::load_summary(&PowercfgSource))
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
async fn get_full_report(state: State<'_, AppState>) -> Result<FullReport, String> {
    let gate = state.report_gate.clone();
    let Ok(_guard) = gate.try_lock_owned() else {
        return Err("a battery report is already being generated".into());
    };

    tauri::async_runtime::spawn_blocking(|| report::load_full_report(&PowercfgSource))
        .await
        .map_err(|e| e.to_string())
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("CellSense starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_path = app_data_dir.join("settings.json");
                let settings = Arc::new(SettingsStore::new(settings_path)?);

                let audio = AlarmAudioHandle::new();

                // The alarm ticker runs for the whole process; the enabled
                // flag is re-read from settings on every tick.
                let mut monitor = AlarmMonitor::new();
                tauri::async_runtime::block_on(monitor.start(
                    app.handle().clone(),
                    settings.clone(),
                    audio.clone(),
                ))?;

                app.manage(AppState {
                    audio,
                    settings,
                    monitor: tokio::sync::Mutex::new(monitor),
                    report_gate: Arc::new(tokio::sync::Mutex::new(())),
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_alarm_settings,
            set_alarm_settings,
            preview_alarm_sound,
            stop_alarm_preview,
            get_battery_status,
            get_live_voltage,
            get_battery_summary,
            get_full_report,
        ])
        .build(tauri::generate_context!())
        .expect("error while running tauri application")
        .run(|app_handle, event| {
            if let tauri::RunEvent::Exit = event {
                let state = app_handle.state::<AppState>();
                tauri::async_runtime::block_on(async {
                    if let Err(err) = state.monitor.lock().await.stop().await {
                        warn!("failed to stop alarm monitor: {err:?}");
                    }
                });
            }
        });
}
