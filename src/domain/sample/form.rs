//! Sample metadata form supplied by the user

use thiserror::Error;

/// Reasons a sample cannot be submitted yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmissionBlocked {
    #[error("Please record audio before submitting.")]
    NoRecording,

    #[error("Please enter a transcript.")]
    EmptyTranscript,

    #[error("Consent is required to submit a sample.")]
    ConsentMissing,
}

/// Metadata fields entered alongside a recording
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SampleForm {
    /// What was said in the recording
    pub transcript: String,
    /// Optional speaker name
    pub speaker_name: String,
    /// Language code, e.g. "en"
    pub language: String,
    /// Comma-separated tags, as typed
    pub tags: String,
    /// Whether the speaker agreed to the sample being collected
    pub consent: bool,
}

impl SampleForm {
    /// Trimmed transcript
    pub fn transcript(&self) -> &str {
        self.transcript.trim()
    }

    /// Trimmed speaker name, or `None` when blank
    pub fn speaker_name(&self) -> Option<&str> {
        let name = self.speaker_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Parsed tag set
    pub fn tags(&self) -> Vec<String> {
        parse_tags(&self.tags)
    }

    /// Check whether the form together with a recording may be submitted.
    pub fn readiness(&self, has_recording: bool) -> Result<(), SubmissionBlocked> {
        if !has_recording {
            return Err(SubmissionBlocked::NoRecording);
        }
        if self.transcript().is_empty() {
            return Err(SubmissionBlocked::EmptyTranscript);
        }
        if !self.consent {
            return Err(SubmissionBlocked::ConsentMissing);
        }
        Ok(())
    }

    /// Clear the per-sample fields after a successful upload.
    /// Language and consent carry over to the next sample.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.speaker_name.clear();
        self.tags.clear();
    }
}

/// Split a comma-separated tag field into trimmed, non-empty, unique tags.
/// First occurrence wins, so input order is preserved.
pub fn parse_tags(input: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for tag in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|existing| existing == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
