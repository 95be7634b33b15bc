//! Artist lookup CLI library
//!
//! Looks up a music artist on Spotify by name, fetches the artist's profile
//! and lists their studio albums.
//!
//! # Modules
//!
//! - `cli` - Command-line front ends (one-shot search and interactive loop)
//! - `config` - Configuration management and environment variables
//! - `error` - Error taxonomy shared by every layer
//! - `logging` - `tracing` subscriber setup
//! - `management` - Credential handling and the search orchestrator
//! - `spotify` - Spotify Web API client implementation
//! - `types` - Data structures and type definitions
//! - `utils` - Text formatting helpers
//!
//! # Example
//!
//! ```
//! use artistfolio::{config, management::SearchOrchestrator, spotify::SpotifyClient};
//!
//! #[tokio::main]
//! async fn main() -> artistfolio::error::Result<()> {
//!     let settings = config::Settings::from_env()?;
//!     let mut orchestrator = SearchOrchestrator::new(SpotifyClient::new(settings)?);
//!     orchestrator.start().await?;
//!     orchestrator.search("Radiohead").await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod management;
pub mod spotify;
pub mod types;
pub mod utils;

/// Prints a status line prefixed with a blue `o`.
///
/// ```
/// info!("Searching for {}...", query);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a confirmation line prefixed with a green `✓`.
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a red `!` line to stderr and exits with status 1.
///
/// Reserved for failures the CLI cannot continue from, such as missing
/// credentials at startup. Search failures are never routed through here.
///
/// ```
/// error!("Cannot load configuration. Err: {}", e);
/// // unreachable
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    eprintln!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a user notice prefixed with a yellow `!`.
///
/// Used for the "empty query" and "no albums" notices as well as recoverable
/// search failures.
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
