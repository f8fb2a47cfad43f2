//! Recording session controller use case

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::audio::{AudioFrame, CaptureConstraints};
use crate::domain::session::{InvalidStateTransition, Recording, RecordingSession, RecordingState};

use super::ports::{
    frame_channel, ActiveCapture, CaptureError, CaptureOutput, CaptureStrategy, Clock,
    FrameReceiver, FrameSink,
};

/// Errors from the recording controller
#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("{0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Could not access microphone: {0}")]
    CaptureAcquisition(CaptureError),

    #[error("Recording failed: {0}")]
    Capture(CaptureError),
}

struct ActiveRecording {
    handle: Box<dyn ActiveCapture>,
    sink: FrameSink,
    frames: FrameReceiver,
}

impl ActiveRecording {
    /// Close the gate, then move whatever is queued into the session
    fn close_and_drain(&mut self, session: &mut RecordingSession) -> usize {
        self.sink.close();
        drain(&mut self.frames, session)
    }
}

fn drain(frames: &mut FrameReceiver, session: &mut RecordingSession) -> usize {
    let mut kept = 0;
    while let Ok(frame) = frames.try_recv() {
        if session.on_frame(frame) {
            kept += 1;
        }
    }
    kept
}

/// Drives one recording session against a capture strategy.
///
/// Owns the session state machine and the capture handle; frames flow
/// from the strategy through a gated channel and are pulled in by `pump`.
pub struct RecordingController<C, K>
where
    C: CaptureStrategy,
    K: Clock,
{
    capture: C,
    clock: K,
    constraints: CaptureConstraints,
    session: RecordingSession,
    active: Option<ActiveRecording>,
}

impl<C, K> RecordingController<C, K>
where
    C: CaptureStrategy,
    K: Clock,
{
    /// Create a controller in the idle state
    pub fn new(capture: C, clock: K, constraints: CaptureConstraints) -> Self {
        Self {
            capture,
            clock,
            constraints,
            session: RecordingSession::new(),
            active: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.session.state()
    }

    pub fn constraints(&self) -> &CaptureConstraints {
        &self.constraints
    }

    /// Elapsed time of the current or last recording
    pub fn elapsed_ms(&self) -> u64 {
        self.session.elapsed_ms(self.clock.now_ms())
    }

    /// The finished recording, present only while stopped
    pub fn recording(&self) -> Option<&Recording> {
        self.session.recording()
    }

    /// Rate of the running capture, if any
    pub fn sample_rate(&self) -> Option<u32> {
        self.active.as_ref().map(|a| a.handle.sample_rate())
    }

    /// Acquire the microphone and enter RECORDING.
    ///
    /// On acquisition failure the session stays idle.
    pub async fn start(&mut self) -> Result<(), RecorderError> {
        if !self.session.is_idle() {
            return Err(InvalidStateTransition {
                current_state: self.session.state(),
                action: "start recording".to_string(),
            }
            .into());
        }

        let (sink, frames) = frame_channel();
        let handle = self
            .capture
            .open(&self.constraints, sink.clone())
            .await
            .map_err(|e| {
                warn!(error = %e, "capture acquisition failed");
                RecorderError::CaptureAcquisition(e)
            })?;

        self.session.start(self.clock.now_ms())?;
        info!(sample_rate = handle.sample_rate(), "recording started");
        self.active = Some(ActiveRecording {
            handle,
            sink,
            frames,
        });
        Ok(())
    }

    /// Move frames delivered so far into the session buffer.
    ///
    /// Returns how many were kept.
    pub fn pump(&mut self) -> usize {
        match self.active.as_mut() {
            Some(active) => drain(&mut active.frames, &mut self.session),
            None => 0,
        }
    }

    /// Buffer a frame directly. Dropped unless recording.
    pub fn on_frame(&mut self, frame: AudioFrame) -> bool {
        self.session.on_frame(frame)
    }

    /// Stop capturing, release the device, and produce the recording.
    pub async fn stop(&mut self) -> Result<&Recording, RecorderError> {
        if !self.session.is_recording() {
            return Err(InvalidStateTransition {
                current_state: self.session.state(),
                action: "stop recording".to_string(),
            }
            .into());
        }

        let stopped_at = self.clock.now_ms();
        let output = match self.active.take() {
            Some(mut active) => {
                let drained = active.close_and_drain(&mut self.session);
                debug!(drained, "frame sink closed");
                active.handle.finish().await
            }
            None => Err(CaptureError::CaptureFailed(
                "no active capture".to_string(),
            )),
        };

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                warn!(error = %e, "capture failed at stop");
                self.session.abort()?;
                return Err(RecorderError::Capture(e));
            }
        };

        let frames = self.session.frames().frame_count();
        let recording = match output {
            CaptureOutput::Pcm { sample_rate } => self.session.stop_pcm(stopped_at, sample_rate)?,
            CaptureOutput::Container(audio) => {
                self.session.stop_with_container(stopped_at, audio)?
            }
        };
        info!(
            frames,
            bytes = recording.audio().size_bytes(),
            duration_ms = recording.duration_ms(),
            "recording stopped"
        );
        Ok(recording)
    }

    /// Abandon a running recording without producing output
    pub async fn cancel(&mut self) -> Result<(), RecorderError> {
        if let Some(mut active) = self.active.take() {
            active.close_and_drain(&mut self.session);
            if let Err(e) = active.handle.finish().await {
                debug!(error = %e, "capture error ignored during cancel");
            }
        }
        self.session.abort()?;
        info!("recording cancelled");
        Ok(())
    }

    /// Release a finished recording and return to idle
    pub fn discard(&mut self) -> Result<(), RecorderError> {
        self.session.discard()?;
        Ok(())
    }
}
