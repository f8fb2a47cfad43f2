//! Rodio-based recording playback

use std::io::Cursor;

use async_trait::async_trait;
use rodio::{Decoder, OutputStream, Sink};

use crate::application::ports::{AudioPreview, PreviewError};
use crate::domain::sample::AudioData;

/// Plays a finished recording on the default output device
pub struct RodioPreview;

impl RodioPreview {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RodioPreview {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPreview for RodioPreview {
    async fn play(&self, audio: &AudioData) -> Result<(), PreviewError> {
        let bytes = audio.data().to_vec();
        // Output streams are not Send; play on a blocking thread
        tokio::task::spawn_blocking(move || play_sync(bytes))
            .await
            .map_err(|e| PreviewError::PlaybackFailed(format!("Task join error: {}", e)))?
    }
}

fn play_sync(bytes: Vec<u8>) -> Result<(), PreviewError> {
    let (_stream, stream_handle) = OutputStream::try_default()
        .map_err(|e| PreviewError::DeviceNotAvailable(e.to_string()))?;

    let sink =
        Sink::try_new(&stream_handle).map_err(|e| PreviewError::PlaybackFailed(e.to_string()))?;

    let source =
        Decoder::new(Cursor::new(bytes)).map_err(|e| PreviewError::PlaybackFailed(e.to_string()))?;
    sink.append(source);
    sink.sleep_until_end();

    Ok(())
}
