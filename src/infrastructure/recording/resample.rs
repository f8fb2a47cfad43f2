//! Streaming sample-rate conversion to the capture target rate

use rubato::{FftFixedIn, Resampler};

use crate::application::ports::CaptureError;

/// Chunk size fed to the FFT resampler
const CHUNK_SIZE: usize = 1024;

/// Converts an unbounded mono stream from the device rate to the target rate.
///
/// Input arrives in arbitrary-sized callback buffers; whole resampler chunks
/// are processed as soon as they are available and the remainder waits for
/// the next call.
pub struct StreamResampler {
    resampler: FftFixedIn<f32>,
    pending: Vec<f32>,
}

impl StreamResampler {
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self, CaptureError> {
        let resampler = FftFixedIn::<f32>::new(
            source_rate as usize,
            target_rate as usize,
            CHUNK_SIZE,
            2, // Sub-chunks
            1, // Mono
        )
        .map_err(|e| CaptureError::AcquisitionFailed(format!("Resampler init failed: {}", e)))?;

        Ok(Self {
            resampler,
            pending: Vec::with_capacity(CHUNK_SIZE * 2),
        })
    }

    /// Feed device-rate samples, returning whatever target-rate output is ready
    pub fn process(&mut self, input: &[f32]) -> Result<Vec<f32>, CaptureError> {
        self.pending.extend_from_slice(input);

        let mut output = Vec::new();
        loop {
            let needed = self.resampler.input_frames_next();
            if self.pending.len() < needed {
                break;
            }
            let chunk = [&self.pending[..needed]];
            let resampled = self
                .resampler
                .process(&chunk, None)
                .map_err(|e| CaptureError::CaptureFailed(format!("Resampling failed: {}", e)))?;
            output.extend_from_slice(&resampled[0]);
            self.pending.drain(..needed);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downsamples_by_rate_ratio() {
        let mut resampler = StreamResampler::new(48000, 16000).unwrap();
        let block = vec![0.1f32; 480];

        let mut produced = 0;
        for _ in 0..100 {
            produced += resampler.process(&block).unwrap().len();
        }

        // One second in, minus what is still buffered or delayed
        assert!(produced <= 16000);
        assert!(produced > 12000, "only produced {}", produced);
    }

    #[test]
    fn small_inputs_are_held_until_a_chunk_is_full() {
        let mut resampler = StreamResampler::new(44100, 16000).unwrap();
        let out = resampler.process(&[0.0; 10]).unwrap();
        assert!(out.is_empty());
    }
}
