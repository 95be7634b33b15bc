use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::{
    error::{Result, SearchError},
    spotify::{SpotifyApi, require_token},
    types::{AlbumRecord, AlbumResponse, Credential},
};

/// Only full-length studio albums; singles, compilations and appears-on are excluded.
pub const INCLUDE_GROUPS: &str = "album";

/// Upper bound of the single page that is fetched.
pub const PAGE_LIMIT: u32 = 50;

/// Builds the album listing request for an artist.
///
/// Uses Spotify's `/artists/{id}/albums` endpoint with:
/// - `include_groups=album`
/// - `market` - the configured region code
/// - `limit=50`
///
/// Only the first page is requested. Artists with more than [`PAGE_LIMIT`]
/// albums are truncated.
pub fn albums_request(
    client: &Client,
    api_url: &str,
    market: &str,
    artist_id: &str,
    token: &Credential,
) -> Result<RequestBuilder> {
    let bearer = require_token(token)?;
    if artist_id.trim().is_empty() {
        return Err(SearchError::Parse(
            "artist id is empty, cannot list albums".to_string(),
        ));
    }

    let limit = PAGE_LIMIT.to_string();
    Ok(client
        .get(format!(
            "{uri}/artists/{id}/albums",
            uri = api_url.trim_end_matches('/'),
            id = artist_id
        ))
        .query(&[
            ("include_groups", INCLUDE_GROUPS),
            ("market", market),
            ("limit", limit.as_str()),
        ])
        .bearer_auth(bearer))
}

/// Reads the album page from a successful listing response.
pub async fn read_albums_response(response: Response) -> Result<Vec<AlbumRecord>> {
    let body = response.text().await?;
    parse_albums(&body)
}

/// Parses an album page, keeping the provider's order.
///
/// Duplicate ids are kept as returned.
pub fn parse_albums(body: &str) -> Result<Vec<AlbumRecord>> {
    let json: AlbumResponse = serde_json::from_str(body)?;
    Ok(json.items.into_iter().map(AlbumRecord::from).collect())
}

/// Lists the studio albums of an already resolved artist.
///
/// An artist without qualifying releases yields an empty list, not an error.
pub async fn list_albums<A: SpotifyApi + ?Sized>(
    api: &A,
    artist_id: &str,
    token: &Credential,
) -> Result<Vec<AlbumRecord>> {
    require_token(token)?;

    let albums = api.artist_albums(artist_id, token).await?;
    debug!(artist_id, count = albums.len(), "albums listed");
    Ok(albums)
}
