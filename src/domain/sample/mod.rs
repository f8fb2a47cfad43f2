//! Sample domain module: encoded audio, metadata form and record

mod audio_data;
mod form;
mod record;

pub use audio_data::{AudioData, AudioMimeType};
pub use form::{parse_tags, SampleForm, SubmissionBlocked};
pub use record::{iso_timestamp, sample_filename, SampleRecord};
