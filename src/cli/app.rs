//! Main app runner: record, review, submit

use std::env;
use std::process::ExitCode;
use std::time::Duration as StdDuration;

use tracing::{debug, warn};

use crate::application::ports::{
    AudioPreview, CaptureStrategy, Clock, ConfigStore, SampleStore, StatusReporter, StorageError,
};
use crate::application::{
    RecorderError, RecordingController, SubmitError, SubmitOutput, SubmitSampleUseCase,
};
use crate::domain::config::{AppConfig, StorageConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::{format_length, Duration};
use crate::domain::sample::{SampleForm, SubmissionBlocked};
use crate::domain::session::Recording;
use crate::infrastructure::{
    create_capture, create_preview, SupabaseStore, SystemClock, XdgConfigStore,
};

use super::args::RecordOptions;
use super::presenter::Presenter;
use super::prompt::{Interrupted, LineReader};
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;
pub const EXIT_CANCELLED: u8 = 130;

/// Environment variables read during config merge
pub const ENV_STORAGE_URL: &str = "VOICE_COLLECTOR_STORAGE_URL";
pub const ENV_API_KEY: &str = "VOICE_COLLECTOR_API_KEY";

/// Timer refresh and frame pump interval
const TICK: StdDuration = StdDuration::from_millis(100);

const CONSENT_QUESTION: &str = "Do you consent to this recording being used as training data?";

/// How a recording attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecordOutcome {
    Stopped { auto: bool },
    Cancelled,
}

/// How a recording left the submit loop
#[derive(Debug)]
enum SubmitOutcome {
    Submitted(SubmitOutput),
    Discarded,
}

/// Run interactive sample collection until the user is done
pub async fn run_record(config: AppConfig, options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let store = match create_store(&config) {
        Ok(store) => store,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let shutdown = ShutdownSignal::new();
    if let Err(e) = shutdown.setup().await {
        presenter.error(&format!("Failed to setup signal handler: {}", e));
        return ExitCode::from(EXIT_ERROR);
    }

    let capture = create_capture(config.strategy_or_default());
    let mut controller = RecordingController::new(capture, SystemClock, config.constraints());
    let preview = create_preview(options.preview);
    let mut input = LineReader::spawn(shutdown.clone());

    let mut form = SampleForm {
        transcript: options.transcript.clone().unwrap_or_default(),
        speaker_name: options.speaker_name.clone().unwrap_or_default(),
        language: options.language.clone(),
        tags: options.tags.clone().unwrap_or_default(),
        consent: options.consent,
    };

    loop {
        match record(
            &mut controller,
            &mut presenter,
            &shutdown,
            &mut input,
            options.max_duration,
        )
        .await
        {
            Ok(RecordOutcome::Stopped { auto }) => {
                if auto {
                    presenter.warn(&format!(
                        "Maximum duration of {} reached, recording stopped",
                        options.max_duration
                    ));
                }
            }
            Ok(RecordOutcome::Cancelled) => {
                presenter.warn("Recording cancelled");
                return ExitCode::from(EXIT_CANCELLED);
            }
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
        }

        let Some(recording) = controller.recording() else {
            presenter.error("No recording available");
            return ExitCode::from(EXIT_ERROR);
        };

        let use_case = SubmitSampleUseCase::new(&store, SystemClock, &presenter);
        let outcome = match review(recording, &presenter, &options, preview.as_ref(), &shutdown).await
        {
            Ok(()) => submit_sample(&use_case, recording, &mut form, &presenter, &mut input).await,
            Err(interrupted) => Err(interrupted),
        };
        release(&mut controller);

        match outcome {
            Ok(SubmitOutcome::Submitted(output)) => presenter.output(&output.audio_url),
            Ok(SubmitOutcome::Discarded) => {
                presenter.warn("Recording discarded");
                return ExitCode::from(EXIT_ERROR);
            }
            Err(Interrupted) => {
                presenter.warn("Cancelled, recording discarded");
                return ExitCode::from(EXIT_CANCELLED);
            }
        }

        match input
            .confirm(&presenter, "Record another sample?", false)
            .await
        {
            Ok(Some(true)) => {}
            Ok(_) => return ExitCode::from(EXIT_SUCCESS),
            Err(Interrupted) => return ExitCode::from(EXIT_CANCELLED),
        }
    }
}

/// Drop the finished recording so the next take can start
fn release<C: CaptureStrategy, K: Clock>(controller: &mut RecordingController<C, K>) {
    if let Err(e) = controller.discard() {
        debug!(error = %e, "nothing to discard");
    }
}

/// Wait for Enter, record until Enter / max duration / shutdown
async fn record<C: CaptureStrategy, K: Clock>(
    controller: &mut RecordingController<C, K>,
    presenter: &mut Presenter,
    shutdown: &ShutdownSignal,
    input: &mut LineReader,
    max_duration: Duration,
) -> Result<RecordOutcome, RecorderError> {
    presenter.prompt("Press Enter to start recording");
    let mut interactive = match input.line().await {
        Ok(line) => line.is_some(),
        Err(Interrupted) => return Ok(RecordOutcome::Cancelled),
    };
    if !interactive {
        eprintln!();
        presenter.info(&format!("stdin closed, recording for up to {}", max_duration));
    }

    controller.start().await?;
    let max_ms = max_duration.as_millis();
    let timer = presenter.format_timer(0, max_ms);
    presenter.start_spinner(&timer);

    let mut ticker = tokio::time::interval(TICK);
    let stop = loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.pump();
                let elapsed = controller.elapsed_ms();
                presenter.update_recording_timer(elapsed, max_ms);
                if elapsed >= max_ms {
                    break Some(true);
                }
            }
            line = input.line(), if interactive => {
                match line {
                    Ok(Some(_)) => break Some(false),
                    Ok(None) => interactive = false,
                    Err(Interrupted) => break None,
                }
            }
            _ = shutdown.wait() => break None,
        }
    };

    let Some(auto) = stop else {
        presenter.stop_spinner();
        controller.cancel().await?;
        return Ok(RecordOutcome::Cancelled);
    };

    match controller.stop().await {
        Ok(recording) => {
            let length = recording.duration_ms();
            presenter.spinner_success(&format!(
                "Recording complete ({})",
                format_length(length)
            ));
            Ok(RecordOutcome::Stopped { auto })
        }
        Err(e) => {
            presenter.spinner_fail("Recording failed");
            Err(e)
        }
    }
}

/// Show the summary, save a copy, and play it back if asked
async fn review(
    recording: &Recording,
    presenter: &Presenter,
    options: &RecordOptions,
    preview: &dyn AudioPreview,
    shutdown: &ShutdownSignal,
) -> Result<(), Interrupted> {
    let audio = recording.audio();
    let sample_rate = audio.wav_info().map(|info| info.sample_rate);
    presenter.info(&presenter.format_summary(
        &audio.human_readable_size(),
        sample_rate,
        recording.duration_ms(),
    ));

    if let Some(path) = options.output.as_ref() {
        match tokio::fs::write(path, audio.data()).await {
            Ok(()) => presenter.success(&format!("Saved to {}", path.display())),
            Err(e) => presenter.warn(&format!("Could not save {}: {}", path.display(), e)),
        }
    }

    if options.preview {
        presenter.info("Playing back recording...");
        let played = tokio::select! {
            played = preview.play(audio) => played,
            _ = shutdown.wait() => return Err(Interrupted),
        };
        if let Err(e) = played {
            warn!(error = %e, "preview failed");
            presenter.warn(&format!("Preview failed: {}", e));
        }
    }
    Ok(())
}

/// Prompt for missing fields and submit, offering a retry after failures.
///
/// The recording is only given up on an explicit discard or closed stdin.
/// The form is reset after a successful submit.
async fn submit_sample<S, K, R>(
    use_case: &SubmitSampleUseCase<S, K, R>,
    recording: &Recording,
    form: &mut SampleForm,
    presenter: &Presenter,
    input: &mut LineReader,
) -> Result<SubmitOutcome, Interrupted>
where
    S: SampleStore,
    K: Clock,
    R: StatusReporter,
{
    loop {
        match form.readiness(true) {
            Err(SubmissionBlocked::EmptyTranscript) => {
                presenter.prompt("Transcript:");
                match input.line().await? {
                    Some(line) => form.transcript = line.trim().to_string(),
                    None => return Ok(SubmitOutcome::Discarded),
                }
                continue;
            }
            Err(SubmissionBlocked::ConsentMissing) => {
                match input.confirm(presenter, CONSENT_QUESTION, false).await? {
                    Some(true) => form.consent = true,
                    Some(false) => {
                        presenter.warn(&SubmissionBlocked::ConsentMissing.to_string());
                        let discard = input
                            .confirm(presenter, "Discard this recording?", false)
                            .await?;
                        if discard != Some(false) {
                            return Ok(SubmitOutcome::Discarded);
                        }
                    }
                    None => return Ok(SubmitOutcome::Discarded),
                }
                continue;
            }
            Err(SubmissionBlocked::NoRecording) | Ok(()) => {}
        }

        let shutdown = input.shutdown();
        if shutdown.is_shutdown() {
            return Err(Interrupted);
        }
        let result = tokio::select! {
            result = use_case.execute(Some(recording), form) => result,
            _ = shutdown.wait() => return Err(Interrupted),
        };

        match result {
            Ok(output) => {
                form.reset();
                return Ok(SubmitOutcome::Submitted(output));
            }
            Err(SubmitError::NotReady(blocked)) => {
                debug!(%blocked, "form incomplete, prompting again");
            }
            Err(_) => {
                let retry = input
                    .confirm(presenter, "Retry upload? (no discards the recording)", true)
                    .await?;
                if retry != Some(true) {
                    return Ok(SubmitOutcome::Discarded);
                }
            }
        }
    }
}

/// Build the sample store from merged config
pub fn create_store(config: &AppConfig) -> Result<SupabaseStore, StorageError> {
    let url = config.storage_url().ok_or_else(|| {
        StorageError::NotConfigured(format!(
            "storage.url. Set {} or run 'voice-collector config set storage.url <url>'",
            ENV_STORAGE_URL
        ))
    })?;
    let api_key = config.api_key().ok_or_else(|| {
        StorageError::NotConfigured(format!(
            "storage.api_key. Set {} or run 'voice-collector config set storage.api_key <key>'",
            ENV_API_KEY
        ))
    })?;

    Ok(SupabaseStore::new(url, api_key)
        .with_bucket(config.bucket_or_default())
        .with_table(config.table_or_default()))
}

/// Storage settings taken from the environment
fn env_config() -> AppConfig {
    let url = env::var(ENV_STORAGE_URL).ok().filter(|s| !s.is_empty());
    let api_key = env::var(ENV_API_KEY).ok().filter(|s| !s.is_empty());
    if url.is_none() && api_key.is_none() {
        return AppConfig::empty();
    }

    AppConfig {
        storage: Some(StorageConfig {
            url,
            api_key,
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> Result<AppConfig, ConfigError> {
    let store = XdgConfigStore::new();
    let file_config = store.load().await?;

    // Merge: defaults < file < env < cli
    Ok(AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        ActiveCapture, CaptureError, CaptureOutput, FrameSink, SilentReporter,
    };
    use crate::cli::prompt::tests::scripted;
    use crate::domain::audio::{encode_wav, CaptureConstraints};
    use crate::domain::sample::{AudioData, SampleRecord};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[test]
    fn store_requires_url_then_key() {
        let err = create_store(&AppConfig::defaults()).err().unwrap();
        assert!(err.to_string().contains("storage.url"));

        let config = AppConfig::defaults().merge(AppConfig {
            storage: Some(StorageConfig {
                url: Some("http://localhost:54321".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let err = create_store(&config).err().unwrap();
        assert!(err.to_string().contains("storage.api_key"));
    }

    #[test]
    fn store_builds_with_configured_settings() {
        let config = AppConfig::defaults().merge(AppConfig {
            storage: Some(StorageConfig {
                url: Some("http://localhost:54321".into()),
                api_key: Some("anon".into()),
                bucket: Some("clips".into()),
                ..Default::default()
            }),
            ..Default::default()
        });
        let store = create_store(&config).unwrap();
        assert_eq!(
            store.public_url("a.wav"),
            "http://localhost:54321/storage/v1/object/public/clips/a.wav"
        );
    }

    struct StubCapture;

    struct StubActive(u32);

    #[async_trait]
    impl CaptureStrategy for StubCapture {
        async fn open(
            &self,
            constraints: &CaptureConstraints,
            _sink: FrameSink,
        ) -> Result<Box<dyn ActiveCapture>, CaptureError> {
            Ok(Box::new(StubActive(constraints.sample_rate)))
        }
    }

    #[async_trait]
    impl ActiveCapture for StubActive {
        fn sample_rate(&self) -> u32 {
            self.0
        }

        async fn finish(self: Box<Self>) -> Result<CaptureOutput, CaptureError> {
            Ok(CaptureOutput::Pcm { sample_rate: self.0 })
        }
    }

    /// Store whose first `failures` uploads are rejected
    #[derive(Default)]
    struct FlakyStore {
        failures: AtomicUsize,
        attempts: AtomicUsize,
        inserts: Mutex<Vec<SampleRecord>>,
    }

    impl FlakyStore {
        fn failing(failures: usize) -> Self {
            Self {
                failures: AtomicUsize::new(failures),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl SampleStore for FlakyStore {
        async fn upload_audio(
            &self,
            _audio: &AudioData,
            filename: &str,
        ) -> Result<String, StorageError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failures.store(remaining - 1, Ordering::SeqCst);
                return Err(StorageError::RequestFailed("connection reset".into()));
            }
            Ok(format!("https://cdn.test/{}", filename))
        }

        async fn insert_sample(&self, record: &SampleRecord) -> Result<(), StorageError> {
            self.inserts.lock().unwrap().push(record.clone());
            Ok(())
        }
    }

    fn take() -> Recording {
        Recording::new(AudioData::wav(encode_wav(&[0.0; 100], 16000)), 1000)
    }

    fn filled_form() -> SampleForm {
        SampleForm {
            transcript: "the quick brown fox".into(),
            speaker_name: "Ada".into(),
            language: "de".into(),
            tags: "read".into(),
            consent: true,
        }
    }

    async fn submit_with(
        store: &FlakyStore,
        form: &mut SampleForm,
        lines: &[&str],
        shutdown: &ShutdownSignal,
    ) -> Result<SubmitOutcome, Interrupted> {
        let (mut input, tx) = scripted(lines, shutdown);
        drop(tx);
        let use_case = SubmitSampleUseCase::new(store, SystemClock, SilentReporter);
        submit_sample(&use_case, &take(), form, &Presenter::new(), &mut input).await
    }

    #[tokio::test]
    async fn retry_after_failed_upload_submits_and_resets_form() {
        let store = FlakyStore::failing(1);
        let mut form = filled_form();

        let outcome = submit_with(&store, &mut form, &["y"], &ShutdownSignal::new()).await;

        assert!(matches!(outcome, Ok(SubmitOutcome::Submitted(_))));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(store.inserts.lock().unwrap().len(), 1);

        assert_eq!(form.transcript, "");
        assert_eq!(form.speaker_name, "");
        assert_eq!(form.tags, "");
        assert_eq!(form.language, "de");
        assert!(form.consent);
    }

    #[tokio::test]
    async fn declining_retry_discards_without_insert() {
        let store = FlakyStore::failing(5);
        let mut form = filled_form();

        let outcome = submit_with(&store, &mut form, &["n"], &ShutdownSignal::new()).await;

        assert!(matches!(outcome, Ok(SubmitOutcome::Discarded)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
        assert!(store.inserts.lock().unwrap().is_empty());
        assert_eq!(form.transcript, "the quick brown fox");
    }

    #[tokio::test]
    async fn closed_stdin_at_retry_discards() {
        let store = FlakyStore::failing(5);
        let mut form = filled_form();

        let outcome = submit_with(&store, &mut form, &[], &ShutdownSignal::new()).await;

        assert!(matches!(outcome, Ok(SubmitOutcome::Discarded)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_transcript_is_prompted_for() {
        let store = FlakyStore::default();
        let mut form = SampleForm {
            transcript: "   ".into(),
            ..filled_form()
        };

        let outcome = submit_with(&store, &mut form, &["  hello there "], &ShutdownSignal::new())
            .await;

        assert!(matches!(outcome, Ok(SubmitOutcome::Submitted(_))));
        assert_eq!(store.inserts.lock().unwrap()[0].transcript, "hello there");
    }

    #[tokio::test]
    async fn declined_consent_keeps_the_take_until_discarded() {
        let store = FlakyStore::default();
        let mut form = SampleForm {
            consent: false,
            ..filled_form()
        };

        // no consent, keep it, then consent
        let outcome = submit_with(&store, &mut form, &["n", "n", "y"], &ShutdownSignal::new())
            .await;
        assert!(matches!(outcome, Ok(SubmitOutcome::Submitted(_))));
        assert!(form.consent);
        assert_eq!(store.inserts.lock().unwrap().len(), 1);

        let store = FlakyStore::default();
        let mut form = SampleForm {
            consent: false,
            ..filled_form()
        };
        let outcome = submit_with(&store, &mut form, &["n", "y"], &ShutdownSignal::new()).await;
        assert!(matches!(outcome, Ok(SubmitOutcome::Discarded)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shutdown_stops_submit_before_upload() {
        let store = FlakyStore::default();
        let mut form = filled_form();
        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let outcome = submit_with(&store, &mut form, &[], &shutdown).await;

        assert!(matches!(outcome, Err(Interrupted)));
        assert_eq!(store.attempts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn shutdown_at_transcript_prompt_is_interrupted() {
        let store = FlakyStore::default();
        let mut form = SampleForm {
            transcript: String::new(),
            ..filled_form()
        };
        let shutdown = ShutdownSignal::new();
        let (mut input, _tx) = scripted(&[], &shutdown);
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(20)).await;
            trigger.trigger();
        });

        let use_case = SubmitSampleUseCase::new(&store, SystemClock, SilentReporter);
        let outcome = tokio::time::timeout(
            StdDuration::from_secs(1),
            submit_sample(&use_case, &take(), &mut form, &Presenter::new(), &mut input),
        )
        .await
        .expect("prompt should give way to shutdown");
        assert!(matches!(outcome, Err(Interrupted)));
    }

    fn controller() -> RecordingController<StubCapture, SystemClock> {
        RecordingController::new(StubCapture, SystemClock, CaptureConstraints::default())
    }

    async fn record_with(
        controller: &mut RecordingController<StubCapture, SystemClock>,
        input: &mut LineReader,
        shutdown: &ShutdownSignal,
        max: Duration,
    ) -> RecordOutcome {
        let mut presenter = Presenter::new();
        tokio::time::timeout(
            StdDuration::from_secs(5),
            record(controller, &mut presenter, shutdown, input, max),
        )
        .await
        .expect("record should finish")
        .unwrap()
    }

    #[tokio::test]
    async fn recording_stops_on_second_enter() {
        let shutdown = ShutdownSignal::new();
        let (mut input, _tx) = scripted(&["", ""], &shutdown);
        let mut controller = controller();

        let outcome = record_with(&mut controller, &mut input, &shutdown, Duration::from_secs(60))
            .await;

        assert_eq!(outcome, RecordOutcome::Stopped { auto: false });
        assert!(controller.recording().is_some());
    }

    #[tokio::test]
    async fn recording_auto_stops_at_max_duration() {
        let shutdown = ShutdownSignal::new();
        let (mut input, _tx) = scripted(&[""], &shutdown);
        let mut controller = controller();

        let outcome =
            record_with(&mut controller, &mut input, &shutdown, Duration::from_millis(300)).await;

        assert_eq!(outcome, RecordOutcome::Stopped { auto: true });
        assert!(controller.recording().unwrap().duration_ms() >= 300);
    }

    #[tokio::test]
    async fn closed_stdin_records_until_max_duration() {
        let shutdown = ShutdownSignal::new();
        let (mut input, tx) = scripted(&[], &shutdown);
        drop(tx);
        let mut controller = controller();

        let outcome =
            record_with(&mut controller, &mut input, &shutdown, Duration::from_millis(200)).await;

        assert_eq!(outcome, RecordOutcome::Stopped { auto: true });
    }

    #[tokio::test]
    async fn shutdown_cancels_a_running_recording() {
        let shutdown = ShutdownSignal::new();
        let (mut input, _tx) = scripted(&[""], &shutdown);
        let mut controller = controller();
        let trigger = shutdown.clone();
        tokio::spawn(async move {
            tokio::time::sleep(StdDuration::from_millis(150)).await;
            trigger.trigger();
        });

        let outcome = record_with(&mut controller, &mut input, &shutdown, Duration::from_secs(60))
            .await;

        assert_eq!(outcome, RecordOutcome::Cancelled);
        assert!(controller.recording().is_none());
        assert!(controller.start().await.is_ok());
    }

    #[tokio::test]
    async fn released_take_allows_the_next_recording() {
        let shutdown = ShutdownSignal::new();
        let (mut input, _tx) = scripted(&["", "", "", ""], &shutdown);
        let mut controller = controller();

        record_with(&mut controller, &mut input, &shutdown, Duration::from_secs(60)).await;
        release(&mut controller);
        assert!(controller.recording().is_none());

        let outcome = record_with(&mut controller, &mut input, &shutdown, Duration::from_secs(60))
            .await;
        assert_eq!(outcome, RecordOutcome::Stopped { auto: false });

        // releasing twice only logs
        release(&mut controller);
        release(&mut controller);
    }
}
