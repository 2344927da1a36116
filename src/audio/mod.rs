pub mod chime;
pub mod preview;
pub mod pulse;
pub mod siren;

use chime::ChimeTone;
use preview::PreviewGate;
use pulse::PulseTone;
use siren::SirenTone;

use log::debug;
use rodio::{OutputStream, Sink, Source};
use serde::{Deserialize, Serialize};
use std::sync::{
    mpsc::{self, Sender},
    Arc, Mutex,
};
use std::thread;
use std::time::Duration;

/// How long a user-requested preview plays (and locks out alarm commands).
const PREVIEW_DURATION: Duration = Duration::from_secs(5);
/// Length of a non-looping alarm clip.
const ONE_SHOT_DURATION: Duration = Duration::from_secs(4);

/// The alarm tones a user can pick per threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlarmSound {
    Classic,
    Chime,
    Pulse,
}

#[derive(Debug, PartialEq, Eq)]
enum AudioCommand {
    Play { sound: AlarmSound, looped: bool },
    Stop,
    Preview { sound: AlarmSound },
}

/// Handle to the alarm sound dispatcher.
///
/// Playback happens on a dedicated thread holding the non-Send rodio
/// objects; this handle owns the command channel and the preview interlock.
/// While a preview is active, `play` and `stop` from the alarm loop are
/// silently dropped until the preview expires or is explicitly stopped.
#[derive(Clone)]
pub struct AlarmAudioHandle {
    tx: Arc<Mutex<Option<Sender<AudioCommand>>>>,
    preview: Arc<PreviewGate>,
    preview_duration: Duration,
}

impl AlarmAudioHandle {
    pub fn new() -> Self {
        Self {
            tx: Arc::new(Mutex::new(None)),
            preview: Arc::new(PreviewGate::new()),
            preview_duration: PREVIEW_DURATION,
        }
    }

    #[cfg(test)]
    fn with_sender(tx: Sender<AudioCommand>, preview_duration: Duration) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            preview: Arc::new(PreviewGate::new()),
            preview_duration,
        }
    }

    fn ensure_thread(&self) -> Result<Sender<AudioCommand>, String> {
        if let Some(tx) = self.tx.lock().map_err(|e| e.to_string())?.as_ref() {
            return Ok(tx.clone());
        }

        let (tx, rx) = mpsc::channel::<AudioCommand>();

        // Spawn dedicated audio thread holding non-Send audio objects
        thread::Builder::new()
            .name("alarm-audio".to_string())
            .spawn(move || {
                let mut _stream: Option<OutputStream> = None;
                let mut sink: Option<Sink> = None;
                let mut current: Option<(AlarmSound, bool)> = None;

                fn ensure_sink(
                    stream: &mut Option<OutputStream>,
                    sink: &mut Option<Sink>,
                ) -> Result<(), String> {
                    if sink.is_none() {
                        let (s, handle) = OutputStream::try_default()
                            .map_err(|e| format!("Failed to create audio output stream: {}", e))?;
                        let new_sink = Sink::try_new(&handle)
                            .map_err(|e| format!("Failed to create audio sink: {}", e))?;
                        *stream = Some(s);
                        *sink = Some(new_sink);
                    }
                    Ok(())
                }

                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        AudioCommand::Play { sound, looped } => {
                            // A looping clip that is already playing stays
                            // untouched; the alarm loop reissues Play every
                            // tick while the threshold condition holds.
                            let already_looping = looped
                                && current == Some((sound, true))
                                && sink.as_ref().map(|s| !s.empty()).unwrap_or(false);
                            if already_looping {
                                continue;
                            }

                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            let _ = ensure_sink(&mut _stream, &mut sink);
                            if let Some(ref s) = sink {
                                append_tone(s, sound, looped);
                                current = Some((sound, looped));
                            }
                        }
                        AudioCommand::Stop => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            _stream = None;
                            current = None;
                        }
                        AudioCommand::Preview { sound } => {
                            if let Some(old) = sink.take() {
                                old.stop();
                            }
                            let _ = ensure_sink(&mut _stream, &mut sink);
                            if let Some(ref s) = sink {
                                append_tone_for(s, sound, PREVIEW_DURATION);
                            }
                            current = None;
                        }
                    }
                }
            })
            .map_err(|e| e.to_string())?;

        let tx_clone = tx.clone();
        *self.tx.lock().map_err(|e| e.to_string())? = Some(tx);
        Ok(tx_clone)
    }

    /// Start an alarm clip. Ignored while a preview is active.
    pub fn play(&self, sound: AlarmSound, looped: bool) -> Result<(), String> {
        if self.preview.is_active() {
            debug!("alarm play ignored: preview in progress");
            return Ok(());
        }
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Play { sound, looped })
            .map_err(|e| e.to_string())
    }

    /// Stop the current alarm clip. Ignored while a preview is active.
    pub fn stop(&self) -> Result<(), String> {
        if self.preview.is_active() {
            debug!("alarm stop ignored: preview in progress");
            return Ok(());
        }
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }

    /// Audition a tone for the fixed preview duration, locking out alarm
    /// commands until it expires.
    pub fn preview(&self, sound: AlarmSound) -> Result<(), String> {
        let tx = self.ensure_thread()?;
        tx.send(AudioCommand::Preview { sound })
            .map_err(|e| e.to_string())?;

        let expire_tx = tx.clone();
        self.preview.engage(self.preview_duration, move || {
            let _ = expire_tx.send(AudioCommand::Stop);
        });
        Ok(())
    }

    /// Dispatcher-level stop: ends any preview immediately and reopens the
    /// gate for alarm commands.
    pub fn stop_preview(&self) -> Result<(), String> {
        self.preview.release();
        if let Ok(Some(tx)) = self.tx.lock().map(|g| g.clone()) {
            let _ = tx.send(AudioCommand::Stop);
        }
        Ok(())
    }
}

fn append_tone(sink: &Sink, sound: AlarmSound, looped: bool) {
    if looped {
        match sound {
            AlarmSound::Classic => sink.append(SirenTone::new()),
            AlarmSound::Chime => sink.append(ChimeTone::new()),
            AlarmSound::Pulse => sink.append(PulseTone::new()),
        }
    } else {
        append_tone_for(sink, sound, ONE_SHOT_DURATION);
    }
}

fn append_tone_for(sink: &Sink, sound: AlarmSound, duration: Duration) {
    match sound {
        AlarmSound::Classic => sink.append(SirenTone::new().take_duration(duration)),
        AlarmSound::Chime => sink.append(ChimeTone::new().take_duration(duration)),
        AlarmSound::Pulse => sink.append(PulseTone::new().take_duration(duration)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Receiver;

    fn test_handle(preview_ms: u64) -> (AlarmAudioHandle, Receiver<AudioCommand>) {
        let (tx, rx) = mpsc::channel();
        (
            AlarmAudioHandle::with_sender(tx, Duration::from_millis(preview_ms)),
            rx,
        )
    }

    #[tokio::test]
    async fn preview_suppresses_alarm_commands_until_it_expires() {
        let (handle, rx) = test_handle(40);

        handle.preview(AlarmSound::Chime).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            AudioCommand::Preview {
                sound: AlarmSound::Chime
            }
        );

        // Both alarm-side commands are dropped while the preview is live.
        handle.play(AlarmSound::Classic, true).unwrap();
        handle.stop().unwrap();
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        // The expiry clears the gate and stops the preview clip.
        assert_eq!(rx.try_recv().unwrap(), AudioCommand::Stop);

        handle.play(AlarmSound::Classic, false).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            AudioCommand::Play {
                sound: AlarmSound::Classic,
                looped: false
            }
        );
    }

    #[tokio::test]
    async fn stop_preview_reopens_the_gate_immediately() {
        let (handle, rx) = test_handle(5_000);

        handle.preview(AlarmSound::Pulse).unwrap();
        rx.try_recv().unwrap();
        handle.play(AlarmSound::Pulse, true).unwrap();
        assert!(rx.try_recv().is_err());

        handle.stop_preview().unwrap();
        assert_eq!(rx.try_recv().unwrap(), AudioCommand::Stop);

        handle.play(AlarmSound::Pulse, true).unwrap();
        assert_eq!(
            rx.try_recv().unwrap(),
            AudioCommand::Play {
                sound: AlarmSound::Pulse,
                looped: true
            }
        );
    }
}
