//! Shutdown signal handling

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;
use tracing::debug;

/// Shutdown request raised by SIGINT/SIGTERM (Ctrl+C elsewhere)
#[derive(Clone)]
pub struct ShutdownSignal {
    shutdown: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl ShutdownSignal {
    /// Create a new shutdown signal handler
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(AtomicBool::new(false)),
            notify: Arc::new(Notify::new()),
        }
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Mark shutdown as requested and wake every waiter
    pub fn trigger(&self) {
        self.shutdown.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Resolve once shutdown has been requested
    pub async fn wait(&self) {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        // Register before checking the flag so a trigger in between is not lost
        notified.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        notified.await;
    }

    /// Setup signal handler
    #[cfg(unix)]
    pub async fn setup(&self) -> Result<(), std::io::Error> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        let signal = self.clone();

        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => debug!("received SIGINT"),
                _ = sigterm.recv() => debug!("received SIGTERM"),
            }
            signal.trigger();
        });

        Ok(())
    }

    /// Setup signal handler
    #[cfg(not(unix))]
    pub async fn setup(&self) -> Result<(), std::io::Error> {
        let signal = self.clone();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("received Ctrl+C");
                signal.trigger();
            }
        });

        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
