//! Sample storage port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::sample::{AudioData, SampleRecord};

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Missing storage configuration: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("{status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Port for the blob storage and metadata table backing the sample corpus
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Upload an audio container.
    ///
    /// # Arguments
    /// * `audio` - The encoded container; its MIME type becomes the content type
    /// * `filename` - Object name inside the bucket
    ///
    /// # Returns
    /// The public URL of the stored object
    async fn upload_audio(&self, audio: &AudioData, filename: &str)
        -> Result<String, StorageError>;

    /// Persist the metadata row for an uploaded sample
    async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError>;
}

/// Blanket implementation for boxed store types
#[async_trait]
impl SampleStore for Box<dyn SampleStore> {
    async fn upload_audio(
        &self,
        audio: &AudioData,
        filename: &str,
    ) -> Result<String, StorageError> {
        self.as_ref().upload_audio(audio, filename).await
    }

    async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError> {
        self.as_ref().insert_sample(record).await
    }
}

#[async_trait]
impl<T: SampleStore + ?Sized> SampleStore for &T {
    async fn upload_audio(
        &self,
        audio: &AudioData,
        filename: &str,
    ) -> Result<String, StorageError> {
        (**self).upload_audio(audio, filename).await
    }

    async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError> {
        (**self).insert_sample(record).await
    }
}
