// src/engine/shutdown.rs

use tokio::sync::watch;

/// Create a linked trigger/signal pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownSignal) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownSignal { rx })
}

/// Requests shutdown of every [`ShutdownSignal`] cloned from the same pair.
///
/// Dropping the trigger without calling [`trigger`](Self::trigger) also
/// counts as a shutdown request.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Non-blocking check, usable from synchronous code.
    pub fn is_requested(&self) -> bool {
        let stop = *self.rx.borrow();
        stop || self.rx.has_changed().is_err()
    }

    /// Resolve once shutdown has been requested.
    pub async fn requested(&mut self) {
        // `wait_for` errs only when the trigger is gone, which is also a stop.
        let _ = self.rx.wait_for(|stop| *stop).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn trigger_wakes_waiters() {
        let (trigger, signal) = shutdown_channel();
        let mut waiter = signal.clone();
        assert!(!signal.is_requested());

        let handle = tokio::spawn(async move { waiter.requested().await });
        trigger.trigger();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("waiter was not woken")
            .unwrap();
        assert!(signal.is_requested());
    }

    #[tokio::test]
    async fn dropping_trigger_counts_as_shutdown() {
        let (trigger, mut signal) = shutdown_channel();
        drop(trigger);

        assert!(signal.is_requested());
        tokio::time::timeout(Duration::from_secs(5), signal.requested())
            .await
            .expect("dropped trigger did not resolve");
    }
}
