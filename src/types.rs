use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Bearer credential issued by the client-credentials exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

impl Credential {
    /// Seconds before the real expiry at which the credential is treated as stale.
    pub const EXPIRY_MARGIN_SECS: u64 = 240;

    /// Whether the credential must be renewed at `now` (Unix seconds).
    ///
    /// Both sides saturate, so an absurd `expires_in` from the token endpoint
    /// reads as "never expires" instead of overflowing.
    ///
    /// # Example
    ///
    /// ```
    /// let token = Credential { access_token: "BQD".into(), expires_in: 3600, obtained_at: 0 };
    /// assert!(!token.is_expired(3000));
    /// assert!(token.is_expired(3360));
    /// ```
    pub fn is_expired(&self, now: u64) -> bool {
        now.saturating_add(Self::EXPIRY_MARGIN_SECS)
            >= self.obtained_at.saturating_add(self.expires_in)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[derive(Clone, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Clone, Deserialize)]
pub struct Image {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    #[serde(default)]
    pub spotify: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub artists: ArtistsPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArtistsPage {
    #[serde(default)]
    pub items: Vec<Artist>,
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Nominally 0..=100; clamped when converted into an [`ArtistRecord`].
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumResponse {
    #[serde(default)]
    pub items: Vec<Album>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub release_date: String,
    #[serde(default)]
    pub release_date_precision: DatePrecision,
    #[serde(default = "default_total_tracks")]
    pub total_tracks: u32,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub images: Vec<Image>,
}

fn default_total_tracks() -> u32 {
    1
}

/// Granularity of an album's `release_date`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePrecision {
    Year,
    Month,
    #[default]
    Day,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
    pub error_description: Option<String>,
}

/// Spotify reports Web API errors as an object and token endpoint errors as a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorBody {
    Detailed { status: u16, message: String },
    Code(String),
}

impl ApiErrorResponse {
    pub fn message(&self) -> String {
        match (&self.error, &self.error_description) {
            (ApiErrorBody::Detailed { message, .. }, _) => message.clone(),
            (ApiErrorBody::Code(code), Some(description)) => format!("{code} ({description})"),
            (ApiErrorBody::Code(code), None) => code.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistRecord {
    pub id: String,
    pub name: String,
    pub genres: Vec<String>,
    pub popularity: u8,
    pub follower_count: u64,
    pub image_url: Option<String>,
}

impl From<Artist> for ArtistRecord {
    fn from(artist: Artist) -> Self {
        Self {
            image_url: artist.images.into_iter().next().map(|i| i.url),
            id: artist.id,
            name: artist.name,
            genres: artist.genres,
            popularity: artist.popularity.min(100) as u8,
            follower_count: artist.followers.total,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumRecord {
    pub id: String,
    pub name: String,
    pub release_date: String,
    pub release_date_precision: DatePrecision,
    pub total_tracks: u32,
    pub external_url: String,
    pub cover_image_url: Option<String>,
}

impl From<Album> for AlbumRecord {
    fn from(album: Album) -> Self {
        Self {
            cover_image_url: album.images.into_iter().next().map(|i| i.url),
            id: album.id,
            name: album.name,
            release_date: album.release_date,
            release_date_precision: album.release_date_precision,
            total_tracks: album.total_tracks.max(1),
            external_url: album.external_urls.spotify,
        }
    }
}

/// The artist currently on display, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "artist", rename_all = "snake_case")]
pub enum ArtistSelection {
    #[default]
    NoArtist,
    Artist(ArtistRecord),
}

impl ArtistSelection {
    pub fn artist(&self) -> Option<&ArtistRecord> {
        match self {
            ArtistSelection::NoArtist => None,
            ArtistSelection::Artist(artist) => Some(artist),
        }
    }
}

#[derive(Tabled)]
pub struct AlbumTableRow {
    pub name: String,
    pub released: String,
    pub tracks: String,
    pub link: String,
}
