//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, CaptureConfig, CaptureStrategyKind, StorageConfig, DEFAULT_BUCKET,
    DEFAULT_LANGUAGE, DEFAULT_TABLE,
};
