//! Command-line interface components
//!
//! This module contains CLI-specific code for yt-grabber, including argument
//! parsing, command handlers, and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{
    Cli, Commands, ConfigAction, ConfigArgs, DownloadArgs, ExtractArgs, GlobalArgs, StatusArgs,
};
pub use commands::{handle_config, handle_download, handle_extract, handle_status};
pub use progress::{ProgressConfig, ProgressDisplay};
