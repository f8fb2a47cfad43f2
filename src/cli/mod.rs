//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, stdin prompts,
//! signal handling, and the interactive recording runner.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;
pub mod prompt;
pub mod signals;

// Re-export commonly used types
pub use app::{run_record, EXIT_CANCELLED, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, RecordOptions};
pub use presenter::Presenter;
