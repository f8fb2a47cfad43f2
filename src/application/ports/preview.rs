//! Audio preview port for playing back a finished recording

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::sample::AudioData;

/// Errors that can occur during preview playback
#[derive(Error, Debug)]
pub enum PreviewError {
    /// Failed to decode or play the recording
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// No audio output device available
    #[error("Audio device not available: {0}")]
    DeviceNotAvailable(String),
}

/// Port trait for recording playback
#[async_trait]
pub trait AudioPreview: Send + Sync {
    /// Play the recording to completion
    async fn play(&self, audio: &AudioData) -> Result<(), PreviewError>;
}
