//! Recording session state machine

use std::fmt;
use thiserror::Error;

use crate::domain::audio::{encode_wav, merge, AudioFrame, FrameBuffer};
use crate::domain::sample::AudioData;

/// Recording session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Stopped,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while {current_state}")]
pub struct InvalidStateTransition {
    pub current_state: RecordingState,
    pub action: String,
}

/// A finished recording: the encoded container and how long it ran
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recording {
    audio: AudioData,
    duration_ms: u64,
}

impl Recording {
    pub fn new(audio: AudioData, duration_ms: u64) -> Self {
        Self { audio, duration_ms }
    }

    pub fn audio(&self) -> &AudioData {
        &self.audio
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }
}

/// Recording session entity.
///
/// State machine:
///   IDLE -> RECORDING (start)
///   RECORDING -> STOPPED (stop_pcm / stop_with_container)
///   RECORDING -> IDLE (abort)
///   STOPPED -> IDLE (discard)
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: RecordingState,
    started_at_ms: Option<u64>,
    duration_ms: u64,
    frames: FrameBuffer,
    recording: Option<Recording>,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == RecordingState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecordingState::Recording
    }

    pub fn is_stopped(&self) -> bool {
        self.state == RecordingState::Stopped
    }

    /// Frames buffered for the current or last recording
    pub fn frames(&self) -> &FrameBuffer {
        &self.frames
    }

    /// The finished recording, present only while stopped
    pub fn recording(&self) -> Option<&Recording> {
        self.recording.as_ref()
    }

    /// Duration of the finished recording (0 unless stopped)
    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Elapsed time: live while recording, frozen once stopped
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.state, self.started_at_ms) {
            (RecordingState::Recording, Some(start)) => now_ms.saturating_sub(start),
            (RecordingState::Stopped, _) => self.duration_ms,
            _ => 0,
        }
    }

    /// Transition from IDLE to RECORDING, resetting the frame buffer
    pub fn start(&mut self, now_ms: u64) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingState::Idle, "start recording")?;
        self.frames.clear();
        self.recording = None;
        self.duration_ms = 0;
        self.started_at_ms = Some(now_ms);
        self.state = RecordingState::Recording;
        Ok(())
    }

    /// Buffer a frame. Frames arriving outside RECORDING are dropped.
    ///
    /// Returns whether the frame was kept.
    pub fn on_frame(&mut self, frame: AudioFrame) -> bool {
        if !self.is_recording() {
            return false;
        }
        self.frames.push(frame);
        true
    }

    /// Transition from RECORDING to STOPPED, merging the buffered frames
    /// and encoding them as WAV at the negotiated sample rate.
    pub fn stop_pcm(
        &mut self,
        now_ms: u64,
        sample_rate: u32,
    ) -> Result<&Recording, InvalidStateTransition> {
        self.expect(RecordingState::Recording, "stop recording")?;
        let samples = merge(self.frames.frames());
        let audio = AudioData::wav(encode_wav(&samples, sample_rate));
        Ok(self.finish(now_ms, audio))
    }

    /// Transition from RECORDING to STOPPED with a container produced
    /// directly by the capture strategy.
    pub fn stop_with_container(
        &mut self,
        now_ms: u64,
        audio: AudioData,
    ) -> Result<&Recording, InvalidStateTransition> {
        self.expect(RecordingState::Recording, "stop recording")?;
        Ok(self.finish(now_ms, audio))
    }

    /// Transition from RECORDING to IDLE without producing a recording
    pub fn abort(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingState::Recording, "abort recording")?;
        self.reset();
        Ok(())
    }

    /// Transition from STOPPED to IDLE, releasing the recording
    pub fn discard(&mut self) -> Result<(), InvalidStateTransition> {
        self.expect(RecordingState::Stopped, "discard recording")?;
        self.reset();
        Ok(())
    }

    fn finish(&mut self, now_ms: u64, audio: AudioData) -> &Recording {
        let start = self.started_at_ms.unwrap_or(now_ms);
        self.duration_ms = now_ms.saturating_sub(start);
        self.state = RecordingState::Stopped;
        self.recording.insert(Recording::new(audio, self.duration_ms))
    }

    fn reset(&mut self) {
        self.frames.clear();
        self.recording = None;
        self.duration_ms = 0;
        self.started_at_ms = None;
        self.state = RecordingState::Idle;
    }

    fn expect(&self, state: RecordingState, action: &str) -> Result<(), InvalidStateTransition> {
        if self.state != state {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        Ok(())
    }
}
