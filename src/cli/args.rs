//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::domain::config::CaptureStrategyKind;
use crate::domain::recording::Duration;

/// VoiceCollector - record transcribed voice samples for speech training data
#[derive(Parser, Debug)]
#[command(name = "voice-collector")]
#[command(version)]
#[command(about = "Record a voice sample, attach its transcript, and upload it to the sample store")]
#[command(long_about = None)]
pub struct Cli {
    /// Capture strategy
    #[arg(short = 's', long, value_name = "STRATEGY")]
    pub strategy: Option<StrategyArg>,

    /// Target sample rate in Hz
    #[arg(long, value_name = "HZ", value_parser = clap::value_parser!(u32).range(8000..=192000))]
    pub sample_rate: Option<u32>,

    /// Stop automatically after this long (e.g., 30s, 1m, 2m30s)
    #[arg(short = 'm', long, value_name = "TIME")]
    pub max_duration: Option<String>,

    /// What is said in the recording (prompted for when omitted)
    #[arg(short = 't', long, value_name = "TEXT")]
    pub transcript: Option<String>,

    /// Speaker name
    #[arg(long, value_name = "NAME")]
    pub speaker: Option<String>,

    /// Language code of the recording
    #[arg(short = 'l', long, value_name = "CODE")]
    pub language: Option<String>,

    /// Comma-separated tags
    #[arg(long, value_name = "TAGS")]
    pub tags: Option<String>,

    /// Confirm consent to the sample being collected
    #[arg(long)]
    pub consent: bool,

    /// Play the recording back before submitting
    #[arg(short = 'p', long)]
    pub preview: bool,

    /// Also write the recording to this WAV file
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Increase diagnostic output (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Config subcommand
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Capture strategy argument for clap ValueEnum
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Cpal,
    Ffmpeg,
}

impl From<StrategyArg> for CaptureStrategyKind {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Cpal => CaptureStrategyKind::Cpal,
            StrategyArg::Ffmpeg => CaptureStrategyKind::Ffmpeg,
        }
    }
}

/// Parsed options for a recording session
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub max_duration: Duration,
    pub transcript: Option<String>,
    pub speaker_name: Option<String>,
    pub language: String,
    pub tags: Option<String>,
    pub consent: bool,
    pub preview: bool,
    pub output: Option<PathBuf>,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "storage.url",
    "storage.api_key",
    "storage.bucket",
    "storage.table",
    "capture.strategy",
    "capture.sample_rate",
    "capture.frame_size",
    "capture.echo_cancellation",
    "capture.noise_suppression",
    "max_duration",
    "language",
    "speaker_name",
    "preview",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
