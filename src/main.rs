//! VoiceCollector CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;

use voice_collector::cli::{
    app::{load_merged_config, run_record, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
    RecordOptions,
};
use voice_collector::domain::config::{AppConfig, CaptureConfig, CaptureStrategyKind};
use voice_collector::domain::recording::Duration;
use voice_collector::infrastructure::XdgConfigStore;

/// Diagnostics go to stderr; -v for info, -vv for debug
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        _ => Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let presenter = Presenter::new();

    // Handle subcommands
    if let Some(Commands::Config { action }) = cli.command {
        let store = XdgConfigStore::new();
        if let Err(e) = handle_config_command(action, &store, &presenter).await {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
        return ExitCode::SUCCESS;
    }

    // Build CLI config from args
    let capture = (cli.strategy.is_some() || cli.sample_rate.is_some()).then(|| CaptureConfig {
        strategy: cli
            .strategy
            .map(|s| CaptureStrategyKind::from(s).to_string()),
        sample_rate: cli.sample_rate,
        ..Default::default()
    });
    let cli_config = AppConfig {
        language: cli.language.clone(),
        speaker_name: cli.speaker.clone(),
        max_duration: cli.max_duration.clone(),
        preview: if cli.preview { Some(true) } else { None },
        storage: None, // storage settings come from env/file only
        capture,
    };

    // Merge config
    let config = match load_merged_config(cli_config).await {
        Ok(config) => config,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let max_duration = match config.max_duration.as_ref() {
        Some(s) => match s.parse::<Duration>() {
            Ok(d) => d,
            Err(e) => {
                presenter.error(&format!("Invalid max-duration: {}", e));
                return ExitCode::from(EXIT_USAGE_ERROR);
            }
        },
        None => Duration::default_max_duration(),
    };

    let options = RecordOptions {
        max_duration,
        transcript: cli.transcript,
        speaker_name: config.speaker_name.clone(),
        language: config.language_or_default().to_string(),
        tags: cli.tags,
        consent: cli.consent,
        preview: config.preview_or_default(),
        output: cli.output,
    };

    run_record(config, options).await
}
