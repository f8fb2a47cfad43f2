//! FFmpeg-based capture adapter
//!
//! Records straight into a 16-bit PCM WAV container through PulseAudio.
//! No frames are delivered; the finished file is the recording.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::application::ports::{
    ActiveCapture, CaptureError, CaptureOutput, CaptureStrategy, FrameSink,
};
use crate::domain::audio::CaptureConstraints;
use crate::domain::sample::AudioData;

/// How long ffmpeg gets to flush the file after an interrupt
const FINISH_GRACE: std::time::Duration = std::time::Duration::from_secs(3);

/// Temp file for the recording, removed on drop
struct TempAudioFile {
    path: PathBuf,
}

impl TempAudioFile {
    fn new() -> Self {
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);

        let path = std::env::temp_dir().join(format!(
            "voice-collector-{}-{}.wav",
            std::process::id(),
            timestamp
        ));
        Self { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempAudioFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Capture strategy that shells out to `ffmpeg`
#[derive(Debug, Clone)]
pub struct FfmpegCapture {
    input_format: String,
    input_device: String,
}

impl FfmpegCapture {
    /// Record from the default PulseAudio source
    pub fn new() -> Self {
        Self {
            input_format: "pulse".to_string(),
            input_device: "default".to_string(),
        }
    }

    /// Build FFmpeg args for recording
    fn build_args(&self, constraints: &CaptureConstraints, output_path: &Path) -> Vec<String> {
        let mut args = vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            self.input_format.clone(),
            "-i".to_string(),
            self.input_device.clone(),
        ];

        if constraints.noise_suppression {
            args.extend(["-af".to_string(), "afftdn".to_string()]);
        }

        args.extend([
            "-ar".to_string(),
            constraints.sample_rate.to_string(),
            "-ac".to_string(),
            CaptureConstraints::CHANNELS.to_string(),
            "-c:a".to_string(),
            "pcm_s16le".to_string(),
            // Plain 44-byte header, no LIST/INFO chunk
            "-bitexact".to_string(),
            "-map_metadata".to_string(),
            "-1".to_string(),
            "-f".to_string(),
            "wav".to_string(),
            "-y".to_string(),
            output_path.to_string_lossy().to_string(),
        ]);

        args
    }

    /// Spawn FFmpeg process
    fn spawn(args: &[String]) -> Result<Child, CaptureError> {
        Command::new("ffmpeg")
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CaptureError::ToolNotFound("ffmpeg".to_string())
                } else {
                    CaptureError::AcquisitionFailed(e.to_string())
                }
            })
    }

    /// Last line ffmpeg wrote to stderr
    async fn stderr_tail(child: &mut Child) -> String {
        let mut buf = Vec::new();
        if let Some(mut stderr) = child.stderr.take() {
            let _ = stderr.read_to_end(&mut buf).await;
        }
        String::from_utf8_lossy(&buf)
            .lines()
            .last()
            .unwrap_or("unknown error")
            .to_string()
    }
}

impl Default for FfmpegCapture {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CaptureStrategy for FfmpegCapture {
    async fn open(
        &self,
        constraints: &CaptureConstraints,
        _sink: FrameSink,
    ) -> Result<Box<dyn ActiveCapture>, CaptureError> {
        let output = TempAudioFile::new();
        let args = self.build_args(constraints, output.path());
        debug!(?args, "spawning ffmpeg");

        let mut child = Self::spawn(&args)?;

        // Device errors make ffmpeg exit right away
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        if let Ok(Some(status)) = child.try_wait() {
            let reason = Self::stderr_tail(&mut child).await;
            return Err(CaptureError::AcquisitionFailed(format!(
                "ffmpeg exited with {}: {}",
                status, reason
            )));
        }

        info!(sample_rate = constraints.sample_rate, "ffmpeg capture started");
        Ok(Box::new(FfmpegActiveCapture {
            child,
            output,
            sample_rate: constraints.sample_rate,
        }))
    }
}

/// A running ffmpeg child writing to a temp file
struct FfmpegActiveCapture {
    child: Child,
    output: TempAudioFile,
    sample_rate: u32,
}

impl FfmpegActiveCapture {
    /// Ask ffmpeg to finish the file and exit
    #[cfg(unix)]
    fn interrupt(&mut self) -> Result<(), CaptureError> {
        use nix::sys::signal::{self, Signal};
        use nix::unistd::Pid;

        if let Some(id) = self.child.id() {
            signal::kill(Pid::from_raw(id as i32), Signal::SIGINT)
                .map_err(|e| CaptureError::CaptureFailed(format!("Signal failed: {}", e)))?;
        }
        Ok(())
    }

    /// No SIGINT here, so the child is killed outright
    #[cfg(not(unix))]
    fn interrupt(&mut self) -> Result<(), CaptureError> {
        self.child
            .start_kill()
            .map_err(|e| CaptureError::CaptureFailed(format!("Failed to stop ffmpeg: {}", e)))
    }

    /// Wait for the child, killing it if it ignores the interrupt
    async fn wait_for_exit(&mut self) -> Result<std::process::ExitStatus, CaptureError> {
        let failed = |e: std::io::Error| CaptureError::CaptureFailed(format!("FFmpeg failed: {}", e));

        match tokio::time::timeout(FINISH_GRACE, self.child.wait()).await {
            Ok(status) => status.map_err(failed),
            Err(_) => {
                warn!("ffmpeg ignored interrupt, killing");
                self.child.start_kill().map_err(failed)?;
                self.child.wait().await.map_err(failed)
            }
        }
    }
}

#[async_trait]
impl ActiveCapture for FfmpegActiveCapture {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    async fn finish(self: Box<Self>) -> Result<CaptureOutput, CaptureError> {
        let mut this = *self;
        this.interrupt()?;

        let status = this.wait_for_exit().await?;
        debug!(%status, "ffmpeg exited");

        // ffmpeg exits non-zero on SIGINT; the file is what matters
        let data = fs::read(this.output.path()).await.map_err(|e| {
            CaptureError::CaptureFailed(format!("Failed to read recording: {}", e))
        })?;

        if data.is_empty() {
            let reason = FfmpegCapture::stderr_tail(&mut this.child).await;
            return Err(CaptureError::CaptureFailed(format!(
                "Recording file is empty: {}",
                reason
            )));
        }

        Ok(CaptureOutput::Container(AudioData::wav(data)))
    }
}
