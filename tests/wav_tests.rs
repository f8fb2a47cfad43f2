//! WAV output integration tests: decode what the encoder and the
//! recording controller produce with an independent reader

use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use voice_collector::application::ports::{
    ActiveCapture, CaptureError, CaptureOutput, CaptureStrategy, Clock, FrameSink,
};
use voice_collector::application::RecordingController;
use voice_collector::domain::audio::{encode_wav, merge, AudioFrame, CaptureConstraints};

fn decode(bytes: &[u8]) -> (hound::WavSpec, Vec<i16>) {
    let reader = hound::WavReader::new(Cursor::new(bytes)).expect("valid wav");
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .expect("readable samples");
    (spec, samples)
}

#[test]
fn encoded_wav_decodes_with_matching_spec() {
    let bytes = encode_wav(&[0.0, 0.5, -0.5, 1.0, -1.0], 22050);
    let (spec, samples) = decode(&bytes);

    assert_eq!(spec.channels, 1);
    assert_eq!(spec.sample_rate, 22050);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);
    assert_eq!(samples, vec![0, 16383, -16384, 32767, -32768]);
}

#[test]
fn decoded_samples_stay_within_one_step() {
    let input: Vec<f32> = (0..1000)
        .map(|i| (i as f32 * 0.05).sin() * 0.9)
        .collect();
    let (_, samples) = decode(&encode_wav(&input, 16000));

    assert_eq!(samples.len(), input.len());
    for (original, decoded) in input.iter().zip(&samples) {
        let scale = if *decoded < 0 { 32768.0 } else { 32767.0 };
        let back = *decoded as f32 / scale;
        assert!(
            (original - back).abs() <= 1.0 / 32767.0,
            "{} decoded as {}",
            original,
            back
        );
    }
}

#[test]
fn merged_frames_decode_in_arrival_order() {
    let frames = vec![
        AudioFrame::new(vec![0.25; 3]),
        AudioFrame::new(vec![-0.25; 2]),
    ];
    let (_, samples) = decode(&encode_wav(&merge(&frames), 16000));
    assert_eq!(samples, vec![8191, 8191, 8191, -8192, -8192]);
}

#[test]
fn empty_recording_is_header_only() {
    let bytes = encode_wav(&[], 16000);
    assert_eq!(bytes.len(), 44);
    let (_, samples) = decode(&bytes);
    assert!(samples.is_empty());
}

struct StepClock(AtomicU64);

impl Clock for StepClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Emits a ramp split into fixed-size frames
struct RampCapture {
    frames: usize,
    frame_size: usize,
}

struct RampActive {
    rate: u32,
}

#[async_trait]
impl CaptureStrategy for RampCapture {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        let total = self.frames * self.frame_size;
        let ramp: Vec<f32> = (0..total)
            .map(|i| i as f32 / total as f32 * 2.0 - 1.0)
            .collect();
        for chunk in ramp.chunks(self.frame_size) {
            sink.push(AudioFrame::from_slice(chunk));
        }
        Ok(Box::new(RampActive {
            rate: constraints.sample_rate,
        }))
    }
}

#[async_trait]
impl ActiveCapture for RampActive {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    async fn finish(self: Box<Self>) -> Result<CaptureOutput, CaptureError> {
        Ok(CaptureOutput::Pcm {
            sample_rate: self.rate,
        })
    }
}

#[tokio::test]
async fn controller_recording_decodes_end_to_end() {
    let clock = Arc::new(StepClock(AtomicU64::new(10_000)));
    let constraints = CaptureConstraints {
        sample_rate: 8000,
        frame_size: 256,
        ..Default::default()
    };
    let mut controller = RecordingController::new(
        RampCapture {
            frames: 4,
            frame_size: 256,
        },
        Arc::clone(&clock),
        constraints,
    );

    controller.start().await.unwrap();
    clock.0.store(10_128, Ordering::SeqCst);
    let recording = controller.stop().await.unwrap();

    assert_eq!(recording.duration_ms(), 128);
    let (spec, samples) = decode(recording.audio().data());
    assert_eq!(spec.sample_rate, 8000);
    assert_eq!(samples.len(), 1024);
    assert_eq!(samples[0], i16::MIN);
    assert!(samples.windows(2).all(|w| w[0] <= w[1]));
}
