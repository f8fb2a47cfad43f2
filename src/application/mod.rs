//! Application layer - Use cases and port interfaces
//!
//! Contains the recording and submission workflows and the trait
//! definitions for everything they talk to.

pub mod ports;
pub mod recording;
pub mod submit;

// Re-export use cases
pub use recording::{RecorderError, RecordingController};
pub use submit::{SubmitError, SubmitOutput, SubmitSampleUseCase};
