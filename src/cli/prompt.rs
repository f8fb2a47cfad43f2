//! Line prompts on stdin that give way to Ctrl+C

use std::io::BufRead;

use tokio::sync::mpsc;

use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Shutdown was requested while waiting for input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

/// Lines typed on stdin, read on a detached thread so a pending read
/// never holds up shutdown
pub struct LineReader {
    rx: mpsc::UnboundedReceiver<String>,
    shutdown: ShutdownSignal,
}

impl LineReader {
    /// Start reading stdin
    pub fn spawn(shutdown: ShutdownSignal) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self::from_receiver(rx, shutdown)
    }

    /// Read lines from a channel instead of stdin
    pub fn from_receiver(rx: mpsc::UnboundedReceiver<String>, shutdown: ShutdownSignal) -> Self {
        Self { rx, shutdown }
    }

    pub fn shutdown(&self) -> &ShutdownSignal {
        &self.shutdown
    }

    /// Next line, None once stdin is closed
    pub async fn line(&mut self) -> Result<Option<String>, Interrupted> {
        if self.shutdown.is_shutdown() {
            return Err(Interrupted);
        }
        tokio::select! {
            biased;
            _ = self.shutdown.wait() => Err(Interrupted),
            line = self.rx.recv() => Ok(line),
        }
    }

    /// Ask a yes/no question. Enter takes the default, None means stdin closed.
    pub async fn confirm(
        &mut self,
        presenter: &Presenter,
        question: &str,
        default_yes: bool,
    ) -> Result<Option<bool>, Interrupted> {
        let hint = if default_yes { "[Y/n]" } else { "[y/N]" };
        presenter.prompt(&format!("{} {}", question, hint));
        let answer = self.line().await?.map(|answer| {
            match answer.trim().to_lowercase().as_str() {
                "" => default_yes,
                "y" | "yes" => true,
                _ => false,
            }
        });
        Ok(answer)
    }
}
