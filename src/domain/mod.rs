//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod config;
pub mod error;
pub mod recording;
pub mod sample;
pub mod session;

// Re-export common types
pub use audio::{AudioFrame, CaptureConstraints, FrameBuffer};
pub use config::AppConfig;
pub use error::*;
pub use recording::Duration;
pub use sample::{AudioData, AudioMimeType, SampleForm, SampleRecord};
pub use session::{Recording, RecordingSession, RecordingState};
