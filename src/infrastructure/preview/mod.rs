//! Recording preview adapters

mod noop;
mod rodio;

pub use noop::NoOpPreview;
pub use self::rodio::RodioPreview;

use crate::application::ports::AudioPreview;

/// Create a preview adapter based on whether playback is enabled
pub fn create_preview(enabled: bool) -> Box<dyn AudioPreview> {
    if enabled {
        Box::new(RodioPreview::new())
    } else {
        Box::new(NoOpPreview::new())
    }
}
