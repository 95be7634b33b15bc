//! # Spotify Integration Module
//!
//! The HTTP layer between artistfolio and the Spotify Web API. Only three
//! endpoints are used:
//!
//! - `POST /api/token` - client-credentials token exchange ([`auth`])
//! - `GET /search?type=artist` - free-text artist search ([`artists`])
//! - `GET /artists/{id}/albums` - studio album listing ([`releases`])
//!
//! ```text
//! SearchOrchestrator (management)
//!          ↓
//!     SpotifyApi trait  ←  fakes in tests
//!          ↓
//!     SpotifyClient (reqwest)
//!          ↓
//!     Spotify Web API
//! ```
//!
//! Every request goes through one shared [`reqwest::Client`] built with the
//! configured timeout, so a hung request surfaces as a network error instead
//! of leaving a search in flight forever. Nothing is retried.

pub mod artists;
pub mod auth;
pub mod releases;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::{
    config::Settings,
    error::{Result, SearchError},
    types::{AlbumRecord, ApiErrorResponse, ArtistRecord, Credential},
};

/// The remote operations the orchestrator depends on.
///
/// [`SpotifyClient`] talks to Spotify; tests provide their own implementations.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Performs the client-credentials exchange.
    async fn request_token(&self) -> Result<Credential>;

    /// Returns the ranked artist matches for `query`.
    async fn search_artists(&self, query: &str, token: &Credential) -> Result<Vec<ArtistRecord>>;

    /// Returns the first page of the artist's studio albums.
    async fn artist_albums(&self, artist_id: &str, token: &Credential)
    -> Result<Vec<AlbumRecord>>;
}

/// reqwest-backed Spotify client.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    settings: Settings,
}

impl SpotifyClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn token_request(&self) -> RequestBuilder {
        auth::token_request(&self.http, &self.settings)
    }

    pub fn search_request(&self, query: &str, token: &Credential) -> Result<RequestBuilder> {
        artists::search_request(&self.http, &self.settings.api_url, query, token)
    }

    pub fn albums_request(&self, artist_id: &str, token: &Credential) -> Result<RequestBuilder> {
        releases::albums_request(
            &self.http,
            &self.settings.api_url,
            &self.settings.market,
            artist_id,
            token,
        )
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn request_token(&self) -> Result<Credential> {
        let response = send("token", self.token_request()).await?;
        auth::read_token_response(response).await
    }

    async fn search_artists(&self, query: &str, token: &Credential) -> Result<Vec<ArtistRecord>> {
        let response = send("search", self.search_request(query, token)?).await?;
        artists::read_search_response(response).await
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        token: &Credential,
    ) -> Result<Vec<AlbumRecord>> {
        let response = send("albums", self.albums_request(artist_id, token)?).await?;
        releases::read_albums_response(response).await
    }
}

/// Refuses to build a request with an unusable bearer token.
pub(crate) fn require_token(token: &Credential) -> Result<&str> {
    let value = token.access_token.trim();
    if value.is_empty() {
        return Err(SearchError::Unauthenticated(
            "refusing to send a request with an empty bearer token".to_string(),
        ));
    }
    Ok(value)
}

/// Sends a request and turns non-success statuses into [`SearchError::Http`].
async fn send(operation: &str, request: RequestBuilder) -> Result<Response> {
    let response = match request.send().await {
        Ok(resp) => resp,
        Err(err) => {
            warn!(operation, error = %err, "request failed");
            return Err(err.into());
        }
    };

    let status = response.status();
    debug!(operation, %status, "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorResponse>(&body)
        .map(|e| e.message())
        .unwrap_or_else(|_| {
            let snippet: String = body.chars().take(200).collect();
            if snippet.is_empty() {
                status.canonical_reason().unwrap_or("Unknown").to_string()
            } else {
                snippet
            }
        });
    warn!(operation, %status, %message, "request rejected");

    Err(SearchError::Http { status, message })
}
