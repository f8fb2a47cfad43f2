//! Microphone capture using cpal
//!
//! Delivers mono f32 frames at the target rate:
//! - the device is opened at the target rate when it supports it
//! - otherwise audio is resampled with rubato
//! - callback buffers are regrouped into fixed-size frames

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SampleRate, StreamConfig};
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::resample::StreamResampler;
use crate::application::ports::{
    ActiveCapture, CaptureError, CaptureOutput, CaptureStrategy, FrameSink,
};
use crate::domain::audio::{AudioFrame, CaptureConstraints};

/// How often the capture thread checks the stop flag
const POLL_INTERVAL: StdDuration = StdDuration::from_millis(100);

/// Capture strategy backed by the default cpal input device.
///
/// The stream lives on its own thread because `cpal::Stream` is not Send.
#[derive(Debug, Default, Clone, Copy)]
pub struct CpalCapture;

impl CpalCapture {
    pub fn new() -> Self {
        Self
    }

    /// Get the default input device
    fn input_device() -> Result<cpal::Device, CaptureError> {
        let host = cpal::default_host();
        host.default_input_device()
            .ok_or(CaptureError::NoInputDevice)
    }

    /// Pick an input configuration, preferring mono and the target rate
    fn input_config(
        device: &cpal::Device,
        target_rate: u32,
    ) -> Result<(StreamConfig, SampleFormat), CaptureError> {
        let supported_configs = device.supported_input_configs().map_err(|e| {
            CaptureError::AcquisitionFailed(format!("Failed to get configs: {}", e))
        })?;

        let includes_target = |config: &cpal::SupportedStreamConfigRange| {
            config.min_sample_rate().0 <= target_rate && config.max_sample_rate().0 >= target_rate
        };

        let mut best_config: Option<cpal::SupportedStreamConfigRange> = None;

        for config in supported_configs {
            // Only consider i16 or f32 formats
            if config.sample_format() != SampleFormat::I16
                && config.sample_format() != SampleFormat::F32
            {
                continue;
            }

            let is_better = match &best_config {
                None => true,
                Some(current) => {
                    let fewer_channels = config.channels() < current.channels();
                    let better_rate = includes_target(&config) && !includes_target(current);
                    let same_rate_fit = includes_target(&config) == includes_target(current);
                    better_rate || (fewer_channels && same_rate_fit)
                }
            };
            if is_better {
                best_config = Some(config);
            }
        }

        let config_range = best_config.ok_or_else(|| {
            CaptureError::AcquisitionFailed("No suitable input config found".into())
        })?;

        let sample_rate = if includes_target(&config_range) {
            SampleRate(target_rate)
        } else {
            // Closest rate to 48 kHz the device allows; rubato handles the rest
            config_range
                .max_sample_rate()
                .min(SampleRate(48000))
                .max(config_range.min_sample_rate())
        };

        let sample_format = config_range.sample_format();
        let config = StreamConfig {
            channels: config_range.channels(),
            sample_rate,
            buffer_size: cpal::BufferSize::Default,
        };

        Ok((config, sample_format))
    }

    /// Build and start the input stream; callback buffers go out as mono f32
    fn start_stream(
        device: &cpal::Device,
        config: &StreamConfig,
        sample_format: SampleFormat,
        tx: mpsc::Sender<Vec<f32>>,
    ) -> Result<cpal::Stream, CaptureError> {
        let channels = config.channels;
        let on_error = |err: cpal::StreamError| warn!(error = %err, "audio stream error");

        let stream = match sample_format {
            SampleFormat::I16 => device.build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let floats: Vec<f32> = data.iter().map(|&s| s as f32 / 32768.0).collect();
                    let _ = tx.send(downmix(&floats, channels));
                },
                on_error,
                None,
            ),
            SampleFormat::F32 => device.build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let _ = tx.send(downmix(data, channels));
                },
                on_error,
                None,
            ),
            other => {
                return Err(CaptureError::AcquisitionFailed(format!(
                    "Unsupported sample format: {:?}",
                    other
                )))
            }
        }
        .map_err(|e| CaptureError::AcquisitionFailed(e.to_string()))?;

        stream
            .play()
            .map_err(|e| CaptureError::AcquisitionFailed(e.to_string()))?;

        Ok(stream)
    }

    /// Body of the capture thread
    fn run(
        constraints: CaptureConstraints,
        sink: FrameSink,
        stop: Arc<AtomicBool>,
        ready: oneshot::Sender<Result<(), CaptureError>>,
    ) {
        let (tx, rx) = mpsc::channel::<Vec<f32>>();

        let opened = Self::input_device().and_then(|device| {
            let (config, sample_format) = Self::input_config(&device, constraints.sample_rate)?;
            let device_rate = config.sample_rate.0;
            let resampler = if device_rate == constraints.sample_rate {
                None
            } else {
                Some(StreamResampler::new(device_rate, constraints.sample_rate)?)
            };
            let stream = Self::start_stream(&device, &config, sample_format, tx)?;
            info!(
                device_rate,
                target_rate = constraints.sample_rate,
                channels = config.channels,
                format = ?sample_format,
                "input stream opened"
            );
            Ok((stream, resampler))
        });

        let (stream, mut resampler) = match opened {
            Ok(opened) => opened,
            Err(e) => {
                let _ = ready.send(Err(e));
                return;
            }
        };

        if constraints.echo_cancellation || constraints.noise_suppression {
            debug!("echo cancellation and noise suppression are not available through cpal");
        }

        if ready.send(Ok(())).is_err() {
            return;
        }

        let mut assembler = FrameAssembler::new(constraints.frame_size);
        while !stop.load(Ordering::SeqCst) {
            let chunk = match rx.recv_timeout(POLL_INTERVAL) {
                Ok(chunk) => chunk,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            };

            let samples = match resampler.as_mut() {
                Some(r) => match r.process(&chunk) {
                    Ok(samples) => samples,
                    Err(e) => {
                        warn!(error = %e, "dropping audio chunk");
                        continue;
                    }
                },
                None => chunk,
            };

            for frame in assembler.push(&samples) {
                sink.push(frame);
            }
        }

        drop(stream);
        debug!("input stream released");
    }
}

#[async_trait]
impl CaptureStrategy for CpalCapture {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        sink: FrameSink,
    ) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        let constraints = *constraints;
        let stop = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread_stop = Arc::clone(&stop);
        let worker = std::thread::Builder::new()
            .name("cpal-capture".into())
            .spawn(move || Self::run(constraints, sink, thread_stop, ready_tx))
            .map_err(|e| CaptureError::AcquisitionFailed(e.to_string()))?;

        match ready_rx.await {
            Ok(Ok(())) => Ok(Box::new(CpalActiveCapture {
                stop,
                worker: Some(worker),
                sample_rate: constraints.sample_rate,
            })),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CaptureError::AcquisitionFailed(
                "capture thread exited before the stream opened".into(),
            )),
        }
    }
}

/// Handle to a running cpal capture thread
struct CpalActiveCapture {
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    sample_rate: u32,
}

#[async_trait]
impl ActiveCapture for CpalActiveCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn finish(self: Box<Self>) -> Result<CaptureOutput, CaptureError> {
        let mut this = self;
        this.stop.store(true, Ordering::SeqCst);

        if let Some(worker) = this.worker.take() {
            tokio::task::spawn_blocking(move || worker.join())
                .await
                .map_err(|e| CaptureError::CaptureFailed(format!("Task join error: {}", e)))?
                .map_err(|_| CaptureError::CaptureFailed("capture thread panicked".into()))?;
        }

        Ok(CaptureOutput::Pcm {
            sample_rate: this.sample_rate,
        })
    }
}

impl Drop for CpalActiveCapture {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Average interleaved channels down to mono
fn downmix(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|chunk| chunk.iter().sum::<f32>() / chunk.len() as f32)
        .collect()
}

/// Regroups a sample stream into frames of a fixed length
struct FrameAssembler {
    frame_size: usize,
    pending: Vec<f32>,
}

impl FrameAssembler {
    fn new(frame_size: usize) -> Self {
        let frame_size = frame_size.max(1);
        Self {
            frame_size,
            pending: Vec::with_capacity(frame_size),
        }
    }

    fn push(&mut self, samples: &[f32]) -> Vec<AudioFrame> {
        self.pending.extend_from_slice(samples);

        let complete = self.pending.len() / self.frame_size * self.frame_size;
        let frames = self.pending[..complete]
            .chunks_exact(self.frame_size)
            .map(AudioFrame::from_slice)
            .collect();
        self.pending.drain(..complete);
        frames
    }
}
