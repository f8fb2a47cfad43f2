//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with cpal, FFmpeg, rodio, Supabase and the filesystem.

pub mod clock;
pub mod config;
pub mod preview;
pub mod recording;
pub mod storage;

// Re-export adapters
pub use clock::SystemClock;
pub use config::XdgConfigStore;
pub use preview::{create_preview, NoOpPreview, RodioPreview};
pub use recording::{create_capture, CpalCapture, FfmpegCapture};
pub use storage::SupabaseStore;
