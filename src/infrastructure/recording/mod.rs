//! Recording infrastructure module
//!
//! Two capture strategies: cpal delivers PCM frames that the controller
//! encodes, ffmpeg records a finished WAV file itself.

mod cpal_capture;
mod ffmpeg_capture;
mod resample;

pub use cpal_capture::CpalCapture;
pub use ffmpeg_capture::FfmpegCapture;
pub use resample::StreamResampler;

use crate::application::ports::CaptureStrategy;
use crate::domain::config::CaptureStrategyKind;

/// Create the capture strategy selected in configuration
pub fn create_capture(kind: CaptureStrategyKind) -> Box<dyn CaptureStrategy> {
    match kind {
        CaptureStrategyKind::Cpal => Box::new(CpalCapture::new()),
        CaptureStrategyKind::Ffmpeg => Box::new(FfmpegCapture::new()),
    }
}
