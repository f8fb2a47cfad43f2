//! Supabase storage and REST adapter

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::application::ports::{SampleStore, StorageError};
use crate::domain::config::{DEFAULT_BUCKET, DEFAULT_TABLE};
use crate::domain::sample::{AudioData, SampleRecord};

// Error body shared by the storage and PostgREST APIs

#[derive(Debug, Deserialize)]
struct ApiError {
    message: Option<String>,
    error: Option<String>,
}

/// Uploads audio to a Supabase storage bucket and rows to a PostgREST table
pub struct SupabaseStore {
    base_url: String,
    api_key: String,
    bucket: String,
    table: String,
    client: reqwest::Client,
}

impl SupabaseStore {
    /// Create a store for the project at `base_url` using the default bucket and table
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            bucket: DEFAULT_BUCKET.to_string(),
            table: DEFAULT_TABLE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn upload_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, filename
        )
    }

    /// Public URL for an object in the bucket
    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, filename
        )
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// Turn a non-success response into an error carrying the API's message
    async fn rejection(response: reqwest::Response) -> StorageError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiError>(&body)
            .ok()
            .and_then(|e| e.message.or(e.error))
            .unwrap_or_else(|| {
                if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body
                }
            });
        StorageError::Rejected { status, message }
    }
}

#[async_trait]
impl SampleStore for SupabaseStore {
    async fn upload_audio(
        &self,
        audio: &AudioData,
        filename: &str,
    ) -> Result<String, StorageError> {
        let url = self.upload_url(filename);
        debug!(%url, bytes = audio.size_bytes(), "uploading audio");

        let response = self
            .authorized(self.client.post(&url))
            .header(reqwest::header::CONTENT_TYPE, audio.mime_type().as_str())
            .header("x-upsert", "false")
            .body(audio.data().to_vec())
            .send()
            .await
            .map_err(|e| StorageError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        Ok(self.public_url(filename))
    }

    async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError> {
        let url = self.table_url();
        debug!(%url, filename = %record.audio_filename, "inserting sample metadata");

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await
            .map_err(|e| StorageError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        // Inserted rows echo back; only the shape is checked
        response
            .json::<Vec<serde_json::Value>>()
            .await
            .map_err(|e| StorageError::ParseError(e.to_string()))?;

        Ok(())
    }
}
