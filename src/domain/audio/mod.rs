//! Audio capture primitives: frames, merging and WAV encoding

mod constraints;
mod frame;
mod merger;
pub mod wav;

pub use constraints::{CaptureConstraints, DEFAULT_FRAME_SIZE, DEFAULT_SAMPLE_RATE};
pub use frame::{AudioFrame, FrameBuffer};
pub use merger::merge;
pub use wav::{encode_wav, sample_to_pcm16, WavInfo, WAV_HEADER_LEN};
