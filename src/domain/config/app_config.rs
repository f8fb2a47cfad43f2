//! Application configuration value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::audio::{CaptureConstraints, DEFAULT_FRAME_SIZE, DEFAULT_SAMPLE_RATE};
use crate::domain::error::InvalidStrategyError;
use crate::domain::recording::Duration;

/// Default storage bucket for audio files
pub const DEFAULT_BUCKET: &str = "audio-samples";

/// Default table for sample metadata
pub const DEFAULT_TABLE: &str = "samples";

/// Default language code
pub const DEFAULT_LANGUAGE: &str = "en";

/// Which capture strategy records the sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureStrategyKind {
    /// Raw PCM frames from cpal, encoded to WAV in-process
    #[default]
    Cpal,
    /// Container recording by an ffmpeg child process
    Ffmpeg,
}

impl CaptureStrategyKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cpal => "cpal",
            Self::Ffmpeg => "ffmpeg",
        }
    }
}

impl fmt::Display for CaptureStrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CaptureStrategyKind {
    type Err = InvalidStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cpal" => Ok(Self::Cpal),
            "ffmpeg" => Ok(Self::Ffmpeg),
            _ => Err(InvalidStrategyError {
                input: s.to_string(),
            }),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub bucket: Option<String>,
    pub table: Option<String>,
}

/// Capture configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConfig {
    pub strategy: Option<String>,
    pub sample_rate: Option<u32>,
    pub frame_size: Option<usize>,
    pub echo_cancellation: Option<bool>,
    pub noise_suppression: Option<bool>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub language: Option<String>,
    pub speaker_name: Option<String>,
    pub max_duration: Option<String>,
    pub preview: Option<bool>,
    pub storage: Option<StorageConfig>,
    pub capture: Option<CaptureConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            language: Some(DEFAULT_LANGUAGE.to_string()),
            speaker_name: None,
            max_duration: Some(Duration::default_max_duration().to_string()),
            preview: Some(false),
            storage: Some(StorageConfig {
                url: None,
                api_key: None,
                bucket: Some(DEFAULT_BUCKET.to_string()),
                table: Some(DEFAULT_TABLE.to_string()),
            }),
            capture: Some(CaptureConfig {
                strategy: Some(CaptureStrategyKind::default().to_string()),
                sample_rate: Some(DEFAULT_SAMPLE_RATE),
                frame_size: Some(DEFAULT_FRAME_SIZE),
                echo_cancellation: Some(true),
                noise_suppression: Some(true),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            language: other.language.or(self.language),
            speaker_name: other.speaker_name.or(self.speaker_name),
            max_duration: other.max_duration.or(self.max_duration),
            preview: other.preview.or(self.preview),
            storage: Self::merge_storage(self.storage, other.storage),
            capture: Self::merge_capture(self.capture, other.capture),
        }
    }

    fn merge_storage(
        base: Option<StorageConfig>,
        other: Option<StorageConfig>,
    ) -> Option<StorageConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(StorageConfig {
                url: o.url.or(b.url),
                api_key: o.api_key.or(b.api_key),
                bucket: o.bucket.or(b.bucket),
                table: o.table.or(b.table),
            }),
        }
    }

    fn merge_capture(
        base: Option<CaptureConfig>,
        other: Option<CaptureConfig>,
    ) -> Option<CaptureConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CaptureConfig {
                strategy: o.strategy.or(b.strategy),
                sample_rate: o.sample_rate.or(b.sample_rate),
                frame_size: o.frame_size.or(b.frame_size),
                echo_cancellation: o.echo_cancellation.or(b.echo_cancellation),
                noise_suppression: o.noise_suppression.or(b.noise_suppression),
            }),
        }
    }

    /// Get language, or "en" if not set
    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        self.max_duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_max_duration)
    }

    /// Get preview setting, or false if not set
    pub fn preview_or_default(&self) -> bool {
        self.preview.unwrap_or(false)
    }

    /// Storage base URL, if configured
    pub fn storage_url(&self) -> Option<&str> {
        self.storage
            .as_ref()
            .and_then(|s| s.url.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Storage API key, if configured
    pub fn api_key(&self) -> Option<&str> {
        self.storage
            .as_ref()
            .and_then(|s| s.api_key.as_deref())
            .filter(|s| !s.is_empty())
    }

    /// Get bucket name, or "audio-samples" if not set
    pub fn bucket_or_default(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.bucket.as_deref())
            .unwrap_or(DEFAULT_BUCKET)
    }

    /// Get table name, or "samples" if not set
    pub fn table_or_default(&self) -> &str {
        self.storage
            .as_ref()
            .and_then(|s| s.table.as_deref())
            .unwrap_or(DEFAULT_TABLE)
    }

    /// Get capture strategy, or cpal if not set/invalid
    pub fn strategy_or_default(&self) -> CaptureStrategyKind {
        self.capture
            .as_ref()
            .and_then(|c| c.strategy.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Build capture constraints, falling back to defaults per field
    pub fn constraints(&self) -> CaptureConstraints {
        let defaults = CaptureConstraints::default();
        let Some(capture) = self.capture.as_ref() else {
            return defaults;
        };
        CaptureConstraints {
            sample_rate: capture
                .sample_rate
                .filter(|&r| r > 0)
                .unwrap_or(defaults.sample_rate),
            frame_size: capture
                .frame_size
                .filter(|&n| n > 0)
                .unwrap_or(defaults.frame_size),
            echo_cancellation: capture
                .echo_cancellation
                .unwrap_or(defaults.echo_cancellation),
            noise_suppression: capture
                .noise_suppression
                .unwrap_or(defaults.noise_suppression),
        }
    }
}
