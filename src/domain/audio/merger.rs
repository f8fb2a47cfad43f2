//! PCM merger: concatenates buffered frames into one sample buffer

use super::frame::AudioFrame;

/// Concatenate frames in arrival order.
///
/// Frame `i` starts at the sum of the lengths of frames `0..i`, and the
/// output length is exactly the total input length.
pub fn merge(frames: &[AudioFrame]) -> Vec<f32> {
    let total: usize = frames.iter().map(AudioFrame::len).sum();
    let mut merged = Vec::with_capacity(total);
    for frame in frames {
        merged.extend_from_slice(frame.samples());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_empty_input() {
        assert!(merge(&[]).is_empty());
    }

    #[test]
    fn merge_preserves_arrival_order() {
        let frames = vec![
            AudioFrame::new(vec![0.1, 0.2]),
            AudioFrame::new(vec![]),
            AudioFrame::new(vec![0.3, 0.4, 0.5]),
        ];

        let merged = merge(&frames);
        assert_eq!(merged, vec![0.1, 0.2, 0.3, 0.4, 0.5]);
    }

    #[test]
    fn merge_length_is_sum_of_frames() {
        let frames = vec![
            AudioFrame::new(vec![0.0; 4096]),
            AudioFrame::new(vec![0.0; 4096]),
            AudioFrame::new(vec![0.0; 2048]),
        ];

        assert_eq!(merge(&frames).len(), 10240);
    }

    #[test]
    fn merge_offsets_follow_frame_lengths() {
        let frames: Vec<AudioFrame> = (0..5)
            .map(|i| AudioFrame::new(vec![i as f32; i + 1]))
            .collect();

        let merged = merge(&frames);
        let mut offset = 0;
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(merged[offset], i as f32);
            offset += frame.len();
        }
        assert_eq!(offset, merged.len());
    }
}
