use anyhow::{bail, Context, Result};
use log::info;
use std::sync::Arc;
use tauri::AppHandle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::audio::AlarmAudioHandle;
use crate::settings::SettingsStore;

use super::loop_worker::alarm_loop;

/// Lifecycle wrapper around the alarm ticker task. Started once at app
/// launch and stopped when the process exits.
pub struct AlarmMonitor {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl AlarmMonitor {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub async fn start(
        &mut self,
        app_handle: AppHandle,
        settings: Arc<SettingsStore>,
        audio: AlarmAudioHandle,
    ) -> Result<()> {
        if self.handle.is_some() {
            bail!("alarm monitor already active");
        }

        info!("starting alarm monitor");

        let cancel_token = CancellationToken::new();
        let token_clone = cancel_token.clone();

        let handle = tokio::spawn(alarm_loop(app_handle, settings, audio, token_clone));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("alarm loop task failed to join")
                .map(|_| ())
        } else {
            Ok(())
        }
    }
}
