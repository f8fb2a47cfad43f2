//! Audio capture port interfaces

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::domain::audio::{AudioFrame, CaptureConstraints};
use crate::domain::sample::AudioData;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("No audio input device available")]
    NoInputDevice,

    #[error("Failed to acquire microphone: {0}")]
    AcquisitionFailed(String),

    #[error("{0} not found. Please install it first.")]
    ToolNotFound(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),
}

/// What a capture strategy hands back once stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutput {
    /// Frames were delivered through the sink at this rate; the caller encodes them
    Pcm { sample_rate: u32 },
    /// The strategy produced a finished container itself
    Container(AudioData),
}

/// Receiving half of a frame channel
pub type FrameReceiver = mpsc::UnboundedReceiver<AudioFrame>;

/// Gated sending half handed to capture strategies.
///
/// Once closed, pushes are dropped. Closing happens-before the controller
/// drains the receiver at stop, so nothing arrives after the final merge.
#[derive(Debug, Clone)]
pub struct FrameSink {
    tx: Arc<Mutex<Option<mpsc::UnboundedSender<AudioFrame>>>>,
}

impl FrameSink {
    /// Deliver a frame. Returns false when the sink is closed.
    pub fn push(&self, frame: AudioFrame) -> bool {
        let Ok(guard) = self.tx.lock() else {
            return false;
        };
        match guard.as_ref() {
            Some(tx) => tx.send(frame).is_ok(),
            None => false,
        }
    }

    /// Stop accepting frames
    pub fn close(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.lock().map(|g| g.is_none()).unwrap_or(true)
    }
}

/// Create a connected sink/receiver pair
pub fn frame_channel() -> (FrameSink, FrameReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        FrameSink {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        rx,
    )
}

/// Port for opening a microphone capture.
#[async_trait]
pub trait CaptureStrategy: Send + Sync {
    /// Acquire the input device and begin capturing.
    ///
    /// # Arguments
    /// * `constraints` - Requested rate, frame size and processing flags
    /// * `sink` - Where PCM frames are delivered while capturing
    ///
    /// # Returns
    /// A handle to the running capture, or an acquisition error
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveCapture>, CaptureError>;
}

/// Blanket implementation for boxed capture strategies
#[async_trait]
impl CaptureStrategy for Box<dyn CaptureStrategy> {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        self.as_ref().open(constraints, sink).await
    }
}

/// A running capture. Dropping it releases the device.
#[async_trait]
pub trait ActiveCapture: Send {
    /// Rate of the frames delivered to the sink
    fn sample_rate(&self) -> u32;

    /// Stop capturing and release the device
    async fn finish(self: Box<Self>) -> Result<CaptureOutput, CaptureError>;
}
