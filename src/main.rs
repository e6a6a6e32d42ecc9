//! yt-grabber CLI application
//!
//! Works through a playlist file of video URLs with yt-dlp, and expands
//! playlists and channels into playlist files.

use std::path::PathBuf;
use std::process;

use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

use yt_grabber::cli::{
    handle_config, handle_download, handle_extract, handle_status, Cli, Commands,
};
use yt_grabber::config::AppConfig;
use yt_grabber::constants::logging::DEFAULT_LOG_LEVEL;
use yt_grabber::errors::Result;

#[tokio::main]
async fn main() {
    // Initialize program
    let result = run().await;

    // Handle any errors that occurred
    if let Err(e) = result {
        if e.is_interrupted() {
            eprintln!("\n🛑 {}", e);
        } else {
            eprintln!("Error: {}", e);
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                eprintln!("  Caused by: {}", cause);
                source = cause.source();
            }
        }
        process::exit(e.exit_code());
    }
}

/// Main application logic
async fn run() -> Result<()> {
    // Load environment variables from .env file if it exists
    dotenv::dotenv().ok(); // Ignore errors if file doesn't exist

    // Parse command line arguments
    let cli = Cli::parse_args();
    let requested_level = cli.log_level();
    let Cli { global, command } = cli;

    // Execute the appropriate command
    match command {
        Commands::Download(args) => {
            let config = prepare(global.config, requested_level, global.very_verbose).await?;
            info!("Executing download command");
            handle_download(args, &config, global.quiet).await
        }
        Commands::Extract(args) => {
            let config = prepare(global.config, requested_level, global.very_verbose).await?;
            info!("Executing extract command");
            handle_extract(args, &config, global.quiet).await
        }
        Commands::Status(args) => {
            let config = prepare(global.config, requested_level, global.very_verbose).await?;
            info!("Executing status command");
            handle_status(args, &config).await
        }
        Commands::Config(args) => {
            // Config management must work even when the current file is broken
            init_logging(&level_name(requested_level, DEFAULT_LOG_LEVEL), global.very_verbose);
            handle_config(args, global.config).await
        }
    }
}

/// Load configuration and initialize logging from it
async fn prepare(
    config_path: Option<PathBuf>,
    requested_level: Option<Level>,
    very_verbose: bool,
) -> Result<AppConfig> {
    let config = AppConfig::load(config_path).await?;
    init_logging(
        &level_name(requested_level, &config.logging.level),
        very_verbose,
    );
    info!("yt-grabber v{} starting", env!("CARGO_PKG_VERSION"));
    Ok(config)
}

/// Level requested on the command line, else the configured one
fn level_name(requested: Option<Level>, configured: &str) -> String {
    requested
        .map(|level| level.to_string().to_lowercase())
        .unwrap_or_else(|| configured.to_string())
}

/// Initialize logging for the crate at `level`, honouring `RUST_LOG`
fn init_logging(level: &str, show_levels: bool) {
    let directive = format!("yt_grabber={}", level);
    let (filter, invalid) = match directive.parse() {
        Ok(directive) => (EnvFilter::from_default_env().add_directive(directive), false),
        Err(_) => (EnvFilter::from_default_env(), true),
    };

    // Initialize subscriber
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(show_levels) // Show levels only in very verbose mode
        .with_writer(std::io::stderr)
        .init();

    if invalid {
        warn!("Ignoring invalid log level '{}'", level);
    }
}
