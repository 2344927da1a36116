use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Single authoritative flag for an in-flight sound preview.
///
/// Only the dispatcher handle writes it; the alarm path just reads it to
/// decide whether its play/stop commands get through. The expiry is a
/// cancelable task so that a newer preview (or an explicit stop) never races
/// an older expiry into stopping the wrong sound.
pub struct PreviewGate {
    active: AtomicBool,
    expiry: Mutex<Option<CancellationToken>>,
}

impl PreviewGate {
    pub fn new() -> Self {
        Self {
            active: AtomicBool::new(false),
            expiry: Mutex::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Marks a preview active and schedules its expiry. A pending expiry
    /// from an earlier preview is cancelled first.
    pub fn engage(self: &Arc<Self>, duration: Duration, on_expire: impl FnOnce() + Send + 'static) {
        let token = CancellationToken::new();
        {
            let mut guard = self.expiry.lock().unwrap();
            if let Some(old) = guard.take() {
                old.cancel();
            }
            *guard = Some(token.clone());
        }
        self.active.store(true, Ordering::SeqCst);

        let gate = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(duration) => {
                    if !token.is_cancelled() {
                        gate.active.store(false, Ordering::SeqCst);
                        on_expire();
                    }
                }
                _ = token.cancelled() => {}
            }
        });
    }

    /// Clears the flag and cancels any pending expiry.
    pub fn release(&self) {
        if let Some(token) = self.expiry.lock().unwrap().take() {
            token.cancel();
        }
        self.active.store(false, Ordering::SeqCst);
    }
}
