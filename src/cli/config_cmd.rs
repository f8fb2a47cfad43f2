//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::{AppConfig, CaptureConfig, CaptureStrategyKind, StorageConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    presenter.info("Set storage.url and storage.api_key before submitting samples");
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let mut config = store.load().await?;
    set_value(&mut config, key, value)?;
    store.save(&config).await?;

    let shown = display_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
    presenter.success(&format!("{} = {}", key, shown));
    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match display_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }
    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in VALID_CONFIG_KEYS {
        let value = display_value(&config, key).unwrap_or_else(|| NOT_SET.to_string());
        presenter.key_value(key, &value);
    }
    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(invalid(
        key,
        format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    ))
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

/// Value of a key as shown to the user; the API key is masked
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    let storage = config.storage.as_ref();
    let capture = config.capture.as_ref();
    match key {
        "storage.url" => storage.and_then(|s| s.url.clone()),
        "storage.api_key" => storage.and_then(|s| s.api_key.as_deref()).map(mask_api_key),
        "storage.bucket" => storage.and_then(|s| s.bucket.clone()),
        "storage.table" => storage.and_then(|s| s.table.clone()),
        "capture.strategy" => capture.and_then(|c| c.strategy.clone()),
        "capture.sample_rate" => capture.and_then(|c| c.sample_rate).map(|v| v.to_string()),
        "capture.frame_size" => capture.and_then(|c| c.frame_size).map(|v| v.to_string()),
        "capture.echo_cancellation" => capture
            .and_then(|c| c.echo_cancellation)
            .map(|b| b.to_string()),
        "capture.noise_suppression" => capture
            .and_then(|c| c.noise_suppression)
            .map(|b| b.to_string()),
        "max_duration" => config.max_duration.clone(),
        "language" => config.language.clone(),
        "speaker_name" => config.speaker_name.clone(),
        "preview" => config.preview.map(|b| b.to_string()),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in the config
fn set_value(config: &mut AppConfig, key: &str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    match key {
        "storage.url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(invalid(key, "Value must be an http:// or https:// URL"));
            }
            storage(config).url = Some(value.trim_end_matches('/').to_string());
        }
        "storage.api_key" => storage(config).api_key = Some(non_empty(key, value)?),
        "storage.bucket" => storage(config).bucket = Some(non_empty(key, value)?),
        "storage.table" => storage(config).table = Some(non_empty(key, value)?),
        "capture.strategy" => {
            let kind = value
                .parse::<CaptureStrategyKind>()
                .map_err(|e| invalid(key, e.to_string()))?;
            capture(config).strategy = Some(kind.to_string());
        }
        "capture.sample_rate" => {
            let rate = value
                .parse::<u32>()
                .ok()
                .filter(|r| (8000..=192000).contains(r))
                .ok_or_else(|| invalid(key, "Value must be a rate between 8000 and 192000"))?;
            capture(config).sample_rate = Some(rate);
        }
        "capture.frame_size" => {
            let size = value
                .parse::<usize>()
                .ok()
                .filter(|n| (256..=16384).contains(n))
                .ok_or_else(|| invalid(key, "Value must be between 256 and 16384"))?;
            capture(config).frame_size = Some(size);
        }
        "capture.echo_cancellation" => {
            capture(config).echo_cancellation = Some(parse_bool(key, value)?)
        }
        "capture.noise_suppression" => {
            capture(config).noise_suppression = Some(parse_bool(key, value)?)
        }
        "max_duration" => {
            let duration = value
                .parse::<Duration>()
                .map_err(|e| invalid(key, e.to_string()))?;
            config.max_duration = Some(duration.to_string());
        }
        "language" => {
            if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
                return Err(invalid(key, "Value must be a language code such as 'en' or 'pt-BR'"));
            }
            config.language = Some(value.to_string());
        }
        "speaker_name" => config.speaker_name = Some(value.to_string()).filter(|s| !s.is_empty()),
        "preview" => config.preview = Some(parse_bool(key, value)?),
        _ => return Err(invalid(key, "Unknown key")),
    }
    Ok(())
}

fn storage(config: &mut AppConfig) -> &mut StorageConfig {
    config.storage.get_or_insert_with(StorageConfig::default)
}

fn capture(config: &mut AppConfig) -> &mut CaptureConfig {
    config.capture.get_or_insert_with(CaptureConfig::default)
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    if value.is_empty() {
        return Err(invalid(key, "Value must not be empty"));
    }
    Ok(value.to_string())
}

/// Parse a boolean value
fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(invalid(key, "Value must be 'true' or 'false'")),
    }
}

/// Mask API key for display (show first 4 and last 4 chars)
fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bool_values() {
        assert!(parse_bool("preview", "true").unwrap());
        assert!(parse_bool("preview", "yes").unwrap());
        assert!(!parse_bool("preview", "0").unwrap());
        assert!(parse_bool("preview", "maybe").is_err());
    }

    #[test]
    fn mask_api_key_long() {
        assert_eq!(mask_api_key("abcdefghijklmnop"), "abcd...mnop");
    }

    #[test]
    fn mask_api_key_short() {
        assert_eq!(mask_api_key("short"), "*****");
    }

    #[test]
    fn set_creates_sections_on_demand() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "storage.url", "https://abc.supabase.co/").unwrap();
        set_value(&mut config, "capture.sample_rate", "22050").unwrap();

        assert_eq!(config.storage_url(), Some("https://abc.supabase.co"));
        assert_eq!(config.constraints().sample_rate, 22050);
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut config = AppConfig::empty();
        assert!(set_value(&mut config, "storage.url", "ftp://x").is_err());
        assert!(set_value(&mut config, "capture.strategy", "alsa").is_err());
        assert!(set_value(&mut config, "capture.sample_rate", "12").is_err());
        assert!(set_value(&mut config, "capture.frame_size", "lots").is_err());
        assert!(set_value(&mut config, "max_duration", "forever").is_err());
        assert!(set_value(&mut config, "language", "e n").is_err());
        assert!(set_value(&mut config, "storage.bucket", " ").is_err());
        assert_eq!(config, AppConfig::empty());
    }

    #[test]
    fn set_normalizes_values() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "capture.strategy", "FFmpeg").unwrap();
        set_value(&mut config, "max_duration", "90s").unwrap();

        assert_eq!(display_value(&config, "capture.strategy").as_deref(), Some("ffmpeg"));
        assert_eq!(config.max_duration.as_deref(), Some("1m30s"));
    }

    #[test]
    fn display_masks_api_key() {
        let mut config = AppConfig::empty();
        set_value(&mut config, "storage.api_key", "eyJhbGciOiJIUzI1NiJ9").unwrap();
        assert_eq!(
            display_value(&config, "storage.api_key").as_deref(),
            Some("eyJh...NiJ9")
        );
    }

    #[test]
    fn every_listed_key_is_settable() {
        let samples = [
            ("storage.url", "http://localhost:54321"),
            ("storage.api_key", "key"),
            ("storage.bucket", "clips"),
            ("storage.table", "voice"),
            ("capture.strategy", "cpal"),
            ("capture.sample_rate", "16000"),
            ("capture.frame_size", "4096"),
            ("capture.echo_cancellation", "false"),
            ("capture.noise_suppression", "true"),
            ("max_duration", "5m"),
            ("language", "en"),
            ("speaker_name", "Ada"),
            ("preview", "true"),
        ];
        assert_eq!(samples.len(), VALID_CONFIG_KEYS.len());

        let mut config = AppConfig::empty();
        for (key, value) in samples {
            set_value(&mut config, key, value).unwrap();
            assert!(display_value(&config, key).is_some(), "{} not readable", key);
        }
    }
}
