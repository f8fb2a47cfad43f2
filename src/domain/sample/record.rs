//! Metadata record persisted next to each uploaded sample

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::audio_data::AudioMimeType;
use super::form::SampleForm;

/// Build the storage filename for a sample: `sample_<unixMs>.<ext>`
pub fn sample_filename(timestamp_ms: u64, mime_type: AudioMimeType) -> String {
    format!("sample_{}.{}", timestamp_ms, mime_type.extension())
}

/// Format a unix millisecond timestamp as RFC 3339 UTC with millisecond precision
pub fn iso_timestamp(timestamp_ms: u64) -> String {
    let dt = i64::try_from(timestamp_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_default();
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Row inserted into the samples table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub transcript: String,
    pub audio_url: String,
    pub audio_filename: String,
    pub duration_ms: u64,
    pub speaker_name: Option<String>,
    pub language: String,
    pub tags: Vec<String>,
    pub created_at: String,
}

impl SampleRecord {
    /// Assemble the record for an uploaded recording
    pub fn new(
        form: &SampleForm,
        audio_url: impl Into<String>,
        audio_filename: impl Into<String>,
        duration_ms: u64,
        created_at_ms: u64,
    ) -> Self {
        Self {
            transcript: form.transcript().to_string(),
            audio_url: audio_url.into(),
            audio_filename: audio_filename.into(),
            duration_ms,
            speaker_name: form.speaker_name().map(str::to_string),
            language: form.language.trim().to_string(),
            tags: form.tags(),
            created_at: iso_timestamp(created_at_ms),
        }
    }
}
