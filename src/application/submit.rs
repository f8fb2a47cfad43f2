//! Submit sample use case

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::sample::{sample_filename, SampleForm, SampleRecord, SubmissionBlocked};
use crate::domain::session::Recording;

use super::ports::{Clock, SampleStore, StatusKind, StatusReporter, StorageError};

/// Errors from the submit use case
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("{0}")]
    NotReady(#[from] SubmissionBlocked),

    #[error("Upload failed: {0}")]
    StorageUpload(StorageError),

    #[error("Database insert failed: {0}")]
    MetadataInsert(StorageError),
}

/// Output from a successful submission
#[derive(Debug, Clone)]
pub struct SubmitOutput {
    /// Public URL of the uploaded audio
    pub audio_url: String,
    /// Object name inside the bucket
    pub filename: String,
    /// The metadata row that was inserted
    pub record: SampleRecord,
}

/// Uploads a finished recording and records its metadata.
///
/// A single attempt: failures are reported and returned, and the caller
/// keeps the recording so the user can try again.
pub struct SubmitSampleUseCase<S, K, R>
where
    S: SampleStore,
    K: Clock,
    R: StatusReporter,
{
    store: S,
    clock: K,
    reporter: R,
}

impl<S, K, R> SubmitSampleUseCase<S, K, R>
where
    S: SampleStore,
    K: Clock,
    R: StatusReporter,
{
    /// Create a new use case instance
    pub fn new(store: S, clock: K, reporter: R) -> Self {
        Self {
            store,
            clock,
            reporter,
        }
    }

    /// Execute the submission workflow
    pub async fn execute(
        &self,
        recording: Option<&Recording>,
        form: &SampleForm,
    ) -> Result<SubmitOutput, SubmitError> {
        let result = self.submit(recording, form).await;
        match &result {
            Ok(output) => {
                info!(filename = %output.filename, "sample submitted");
                self.reporter
                    .report(StatusKind::Success, "Sample uploaded successfully!");
            }
            Err(e) => {
                warn!(error = %e, "submission failed");
                self.reporter
                    .report(StatusKind::Error, &format!("Error: {}", e));
            }
        }
        result
    }

    async fn submit(
        &self,
        recording: Option<&Recording>,
        form: &SampleForm,
    ) -> Result<SubmitOutput, SubmitError> {
        form.readiness(recording.is_some())?;
        let recording = recording.ok_or(SubmissionBlocked::NoRecording)?;

        self.reporter.report(StatusKind::Loading, "Uploading...");

        let audio = recording.audio();
        let filename = sample_filename(self.clock.now_ms(), audio.mime_type());
        let audio_url = self
            .store
            .upload_audio(audio, &filename)
            .await
            .map_err(SubmitError::StorageUpload)?;

        let record = SampleRecord::new(
            form,
            audio_url.clone(),
            filename.clone(),
            recording.duration_ms(),
            self.clock.now_ms(),
        );
        self.store
            .insert_sample(&record)
            .await
            .map_err(SubmitError::MetadataInsert)?;

        Ok(SubmitOutput {
            audio_url,
            filename,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::encode_wav;
    use crate::domain::sample::AudioData;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    #[derive(Default)]
    struct MockStore {
        fail_upload: bool,
        fail_insert: bool,
        uploads: Mutex<Vec<(String, usize)>>,
        inserts: Mutex<Vec<SampleRecord>>,
    }

    #[async_trait]
    impl SampleStore for MockStore {
        async fn upload_audio(
            &self,
            audio: &AudioData,
            filename: &str,
        ) -> Result<String, StorageError> {
            if self.fail_upload {
                return Err(StorageError::Rejected {
                    status: 409,
                    message: "The resource already exists".into(),
                });
            }
            self.uploads
                .lock()
                .unwrap()
                .push((filename.to_string(), audio.size_bytes()));
            Ok(format!("https://cdn.test/{}", filename))
        }

        async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError> {
            if self.fail_insert {
                return Err(StorageError::RequestFailed("connection reset".into()));
            }
            self.inserts.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingReporter(Mutex<Vec<(StatusKind, String)>>);

    impl StatusReporter for RecordingReporter {
        fn report(&self, kind: StatusKind, message: &str) {
            self.0.lock().unwrap().push((kind, message.to_string()));
        }
    }

    fn recording() -> Recording {
        Recording::new(AudioData::wav(encode_wav(&[0.0; 100], 16000)), 2340)
    }

    fn form() -> SampleForm {
        SampleForm {
            transcript: "  hello world ".into(),
            speaker_name: "".into(),
            language: "en".into(),
            tags: "read, quiet, read".into(),
            consent: true,
        }
    }

    #[tokio::test]
    async fn uploads_then_inserts_metadata() {
        let store = MockStore::default();
        let reporter = RecordingReporter::default();
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(1_700_000_000_123), &reporter);

        let rec = recording();
        let output = use_case.execute(Some(&rec), &form()).await.unwrap();

        assert_eq!(output.filename, "sample_1700000000123.wav");
        assert_eq!(output.audio_url, "https://cdn.test/sample_1700000000123.wav");
        assert_eq!(store.uploads.lock().unwrap()[0].1, 244);

        let inserted = store.inserts.lock().unwrap();
        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].transcript, "hello world");
        assert_eq!(inserted[0].duration_ms, 2340);
        assert_eq!(inserted[0].speaker_name, None);
        assert_eq!(inserted[0].tags, vec!["read", "quiet"]);
        assert_eq!(inserted[0].created_at, "2023-11-14T22:13:20.123Z");

        let statuses = reporter.0.lock().unwrap();
        assert_eq!(statuses[0], (StatusKind::Loading, "Uploading...".to_string()));
        assert_eq!(statuses.last().unwrap().0, StatusKind::Success);
    }

    #[tokio::test]
    async fn missing_recording_is_rejected_before_upload() {
        let store = MockStore::default();
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(1), RecordingReporter::default());

        let err = use_case.execute(None, &form()).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotReady(SubmissionBlocked::NoRecording)));
        assert!(store.uploads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_consent_is_rejected() {
        let store = MockStore::default();
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(1), RecordingReporter::default());
        let mut form = form();
        form.consent = false;

        let rec = recording();
        let err = use_case.execute(Some(&rec), &form).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotReady(SubmissionBlocked::ConsentMissing)));
    }

    #[tokio::test]
    async fn upload_failure_is_reported_verbatim() {
        let store = MockStore {
            fail_upload: true,
            ..Default::default()
        };
        let reporter = RecordingReporter::default();
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(1), &reporter);

        let rec = recording();
        let err = use_case.execute(Some(&rec), &form()).await.unwrap_err();
        assert!(matches!(err, SubmitError::StorageUpload(_)));
        assert!(store.inserts.lock().unwrap().is_empty());

        let statuses = reporter.0.lock().unwrap();
        let (kind, message) = statuses.last().unwrap();
        assert_eq!(*kind, StatusKind::Error);
        assert_eq!(
            message,
            "Error: Upload failed: 409: The resource already exists"
        );
    }

    #[tokio::test]
    async fn insert_failure_is_distinguished() {
        let store = MockStore {
            fail_insert: true,
            ..Default::default()
        };
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(1), RecordingReporter::default());

        let rec = recording();
        let err = use_case.execute(Some(&rec), &form()).await.unwrap_err();
        assert!(matches!(err, SubmitError::MetadataInsert(_)));
        assert!(err.to_string().starts_with("Database insert failed:"));
        assert_eq!(store.uploads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn incomplete_form_leaves_recording_for_a_later_attempt() {
        let store = MockStore::default();
        let use_case = SubmitSampleUseCase::new(&store, FixedClock(5), RecordingReporter::default());
        let rec = recording();
        let mut form = form();
        form.transcript = "  ".into();

        let err = use_case.execute(Some(&rec), &form).await.unwrap_err();
        assert!(matches!(err, SubmitError::NotReady(SubmissionBlocked::EmptyTranscript)));
        assert!(store.uploads.lock().unwrap().is_empty());

        form.transcript = "second try".into();
        let output = use_case.execute(Some(&rec), &form).await.unwrap();
        assert_eq!(output.record.transcript, "second try");
        assert_eq!(store.uploads.lock().unwrap()[0].1, rec.audio().size_bytes());
    }
}
