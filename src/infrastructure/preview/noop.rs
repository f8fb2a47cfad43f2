//! Preview adapter used when playback is disabled

use async_trait::async_trait;

use crate::application::ports::{AudioPreview, PreviewError};
use crate::domain::sample::AudioData;

/// Skips playback
pub struct NoOpPreview;

impl NoOpPreview {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpPreview {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioPreview for NoOpPreview {
    async fn play(&self, _audio: &AudioData) -> Result<(), PreviewError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_returns_ok() {
        let preview = NoOpPreview::new();
        assert!(preview.play(&AudioData::wav(vec![0; 44])).await.is_ok());
    }
}
