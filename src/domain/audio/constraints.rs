//! Capture constraints requested from the capture subsystem

/// Default target sample rate (speech models expect 16 kHz)
pub const DEFAULT_SAMPLE_RATE: u32 = 16000;

/// Default number of samples per delivered frame
pub const DEFAULT_FRAME_SIZE: usize = 4096;

/// Constraints passed to a capture strategy when opening the microphone.
///
/// These are advisory: the negotiated sample rate is read back from the
/// active capture before encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Samples per frame delivered to the frame buffer
    pub frame_size: usize,
    /// Request echo cancellation where the backend supports it
    pub echo_cancellation: bool,
    /// Request noise suppression where the backend supports it
    pub noise_suppression: bool,
}

impl CaptureConstraints {
    /// Always mono
    pub const CHANNELS: u16 = 1;
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            frame_size: DEFAULT_FRAME_SIZE,
            echo_cancellation: true,
            noise_suppression: true,
        }
    }
}
