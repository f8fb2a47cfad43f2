//! VoiceCollector - voice sample collection for speech training data
//!
//! This crate records audio from the microphone, packages it as a
//! 16-bit mono WAV file and submits it, together with its transcript and
//! speaker metadata, to a Supabase storage bucket and table.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Frames, PCM merging, WAV encoding, the recording session and sample form
//! - **Application**: Recording controller, submit use case and port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (cpal, FFmpeg, Supabase, rodio, config file)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
