//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capture;
pub mod clock;
pub mod config;
pub mod preview;
pub mod sample_store;
pub mod status;

// Re-export common types
pub use capture::{
    frame_channel, ActiveCapture, CaptureError, CaptureOutput, CaptureStrategy, FrameReceiver,
    FrameSink,
};
pub use clock::Clock;
pub use config::ConfigStore;
pub use preview::{AudioPreview, PreviewError};
pub use sample_store::{SampleStore, StorageError};
pub use status::{SilentReporter, StatusKind, StatusReporter};
