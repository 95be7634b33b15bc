//! Configuration management for artistfolio.
//!
//! Values come from environment variables, optionally seeded from `.env` files.
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the current working directory
//! 3. `.env` in the local data directory (`artistfolio/.env`)
//! 4. Application defaults (where applicable)

use std::{env, fmt, path::PathBuf, time::Duration};

use crate::error::{Result, SearchError};

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_MARKET: &str = "US";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Loads environment variables from `.env` files.
///
/// Missing files are skipped; variables already set in the process
/// environment are never overridden. The per-user file lives at:
/// - Linux: `~/.local/share/artistfolio/.env`
/// - macOS: `~/Library/Application Support/artistfolio/.env`
/// - Windows: `%LOCALAPPDATA%/artistfolio/.env`
///
/// # Errors
///
/// Returns an error if an existing `.env` file cannot be read or parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    for path in [PathBuf::from(".env"), env_path()] {
        let exists = async_fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if exists {
            dotenv::from_path(&path).map_err(|e| format!("{}: {}", path.display(), e))?;
        }
    }
    Ok(())
}

pub fn env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("artistfolio/.env");
    path
}

/// Returns the Spotify API client ID.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_ID`.
pub fn spotify_client_id() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_ID")
}

/// Returns the Spotify API client secret.
///
/// Reads `SPOTIFY_API_AUTH_CLIENT_SECRET`. The value must never be logged.
pub fn spotify_client_secret() -> Result<String> {
    required("SPOTIFY_API_AUTH_CLIENT_SECRET")
}

/// Returns the Spotify Web API base URL (`SPOTIFY_API_URL`).
pub fn spotify_apiurl() -> String {
    optional("SPOTIFY_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

/// Returns the token exchange URL (`SPOTIFY_API_TOKEN_URL`).
pub fn spotify_apitoken_url() -> String {
    optional("SPOTIFY_API_TOKEN_URL").unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string())
}

/// Returns the market album listings are restricted to (`SPOTIFY_MARKET`).
pub fn spotify_market() -> String {
    optional("SPOTIFY_MARKET").unwrap_or_else(|| DEFAULT_MARKET.to_string())
}

/// Returns the per-request timeout (`ARTISTFOLIO_REQUEST_TIMEOUT_SECS`).
pub fn request_timeout() -> Result<Duration> {
    match optional("ARTISTFOLIO_REQUEST_TIMEOUT_SECS") {
        None => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        Some(raw) => match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
            _ => Err(SearchError::Config(format!(
                "ARTISTFOLIO_REQUEST_TIMEOUT_SECS must be a positive number of seconds, got \"{raw}\""
            ))),
        },
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).ok_or_else(|| SearchError::Config(format!("{key} must be set")))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Everything needed to talk to Spotify.
#[derive(Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub api_url: String,
    pub token_url: String,
    pub market: String,
    pub timeout: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            client_id: spotify_client_id()?,
            client_secret: spotify_client_secret()?,
            api_url: spotify_apiurl(),
            token_url: spotify_apitoken_url(),
            market: spotify_market(),
            timeout: request_timeout()?,
        })
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("token_url", &self.token_url)
            .field("market", &self.market)
            .field("timeout", &self.timeout)
            .finish()
    }
}
