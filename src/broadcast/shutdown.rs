use std::time::Duration;
use tokio::sync::watch;

/// Sending half of the shutdown signal
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Ask every running broadcast to stop at its next chunk boundary
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

/// Cancellation signal checked by broadcasts between chunks
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

/// Create a connected trigger/signal pair
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_, signal) = shutdown_channel();
        signal
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal fires
    ///
    /// Pends forever when the trigger was dropped without firing.
    pub async fn triggered(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` unless the signal fires first
    ///
    /// Returns `true` when the sleep was interrupted by shutdown.
    pub async fn sleep(&self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }

        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.triggered() => true,
        }
    }
}
