//! Audio frames and the per-session frame buffer

/// One capture callback's worth of mono `f32` samples.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    samples: Vec<f32>,
}

impl AudioFrame {
    /// Create a frame from owned samples
    pub fn new(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    /// Create a frame by copying a sample slice
    pub fn from_slice(samples: &[f32]) -> Self {
        Self {
            samples: samples.to_vec(),
        }
    }

    /// Get the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of samples in the frame
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if the frame holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

impl From<Vec<f32>> for AudioFrame {
    fn from(samples: Vec<f32>) -> Self {
        Self::new(samples)
    }
}

/// Append-only sequence of frames captured during one recording.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    frames: Vec<AudioFrame>,
    total_samples: usize,
}

impl FrameBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, taking ownership of it
    pub fn push(&mut self, frame: AudioFrame) {
        self.total_samples += frame.len();
        self.frames.push(frame);
    }

    /// Release all frames
    pub fn clear(&mut self) {
        self.frames.clear();
        self.frames.shrink_to_fit();
        self.total_samples = 0;
    }

    /// Frames in arrival order
    pub fn frames(&self) -> &[AudioFrame] {
        &self.frames
    }

    /// Number of buffered frames
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Sum of all frame lengths
    pub fn total_samples(&self) -> usize {
        self.total_samples
    }

    /// Check if no frame has been buffered
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
