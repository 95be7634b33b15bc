//! Error types for artist lookups.

use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Coarse classification of a [`SearchError`], used by the presentation layer
/// to decide between a notice and an error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Auth,
    NotFound,
    Network,
    PartialData,
    Config,
}

/// Main error type for every lookup operation.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The query was empty or whitespace only.
    #[error("Please enter something in the box. Anything.")]
    EmptyQuery,

    /// No usable bearer token is held.
    #[error("Not authenticated with Spotify: {0}")]
    Unauthenticated(String),

    /// The artist search returned no items.
    #[error("No artist found for \"{0}\"")]
    ArtistNotFound(String),

    /// Transport failure (connect, TLS, timeout, body read).
    #[error("Request error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request did not complete within the configured timeout.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The remote side answered with a non-success status.
    #[error("Spotify answered {status}: {message}")]
    Http { status: StatusCode, message: String },

    /// The response body did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The artist was resolved but its albums could not be fetched.
    #[error("Album fetch error: {0}")]
    AlbumFetch(#[source] Box<SearchError>),

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Classifies the error for presentation.
    ///
    /// # Returns
    ///
    /// - `Validation` - empty query, shown as a notice
    /// - `Auth` - no usable token; searches are refused until a retry succeeds
    /// - `NotFound` - the search had no match, shown as a notice
    /// - `Network` - transport, timeout, non-success status or malformed body
    /// - `PartialData` - the artist resolved but the album listing failed
    /// - `Config` - missing or invalid settings at startup
    pub fn kind(&self) -> ErrorKind {
        match self {
            SearchError::EmptyQuery => ErrorKind::Validation,
            SearchError::Unauthenticated(_) => ErrorKind::Auth,
            SearchError::ArtistNotFound(_) => ErrorKind::NotFound,
            SearchError::Network(_)
            | SearchError::Timeout(_)
            | SearchError::Http { .. }
            | SearchError::Parse(_) => ErrorKind::Network,
            SearchError::AlbumFetch(_) => ErrorKind::PartialData,
            SearchError::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether the error should be shown as a plain notice rather than an error state.
    pub fn is_notice(&self) -> bool {
        matches!(self.kind(), ErrorKind::Validation | ErrorKind::NotFound)
    }

    /// Whether the error, or the album failure it wraps, was caused by a deadline.
    ///
    /// Covers both the orchestrator deadline and reqwest's own client timeout.
    pub fn timed_out(&self) -> bool {
        match self {
            SearchError::Timeout(_) => true,
            SearchError::Network(e) => e.is_timeout(),
            SearchError::AlbumFetch(inner) => inner.timed_out(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(err: serde_json::Error) -> Self {
        SearchError::Parse(err.to_string())
    }
}

/// Result type alias for lookup operations.
pub type Result<T> = std::result::Result<T, SearchError>;
