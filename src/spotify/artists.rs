use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::{
    error::{Result, SearchError},
    spotify::{SpotifyApi, require_token},
    types::{ArtistRecord, Credential, SearchResponse},
};

/// Builds the artist search request.
///
/// The raw query is passed through as `q` (reqwest handles the URL encoding)
/// with the search scoped to `type=artist`.
pub fn search_request(
    client: &Client,
    api_url: &str,
    query: &str,
    token: &Credential,
) -> Result<RequestBuilder> {
    let bearer = require_token(token)?;
    Ok(client
        .get(format!("{uri}/search", uri = api_url.trim_end_matches('/')))
        .query(&[("q", query), ("type", "artist")])
        .bearer_auth(bearer))
}

/// Reads the ranked artist list from a search response.
pub async fn read_search_response(response: Response) -> Result<Vec<ArtistRecord>> {
    let body = response.text().await?;
    parse_search(&body)
}

/// Parses a search response body into artist records, keeping the ranking.
///
/// # Arguments
///
/// * `body` - Raw JSON of a `GET /search?type=artist` response
///
/// # Returns
///
/// Returns a `Result` containing:
/// - `Ok(Vec<ArtistRecord>)` - Matches in ranked order, possibly empty
/// - `Err(SearchError::Parse)` - The body is not a search response
pub fn parse_search(body: &str) -> Result<Vec<ArtistRecord>> {
    let res: SearchResponse = serde_json::from_str(body)?;
    debug!(
        returned = res.artists.items.len(),
        total = res.artists.total.unwrap_or(0),
        "artist search parsed"
    );
    Ok(res.artists.items.into_iter().map(ArtistRecord::from).collect())
}

/// Rejects queries that are empty after trimming.
pub fn validate_query(query: &str) -> Result<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::EmptyQuery);
    }
    Ok(trimmed)
}

/// Resolves a free-text query to a single artist.
///
/// The first ranked match is taken as-is; there is no relevance threshold or
/// disambiguation. An empty result list is reported as
/// [`SearchError::ArtistNotFound`], distinct from transport failures.
///
/// # Example
///
/// ```
/// let artist = resolve_artist(&client, "Radiohead", &token).await?;
/// println!("{} ({})", artist.name, artist.id);
/// ```
pub async fn resolve_artist<A: SpotifyApi + ?Sized>(
    api: &A,
    query: &str,
    token: &Credential,
) -> Result<ArtistRecord> {
    let query = validate_query(query)?;
    require_token(token)?;

    let artists = api.search_artists(query, token).await?;
    match artists.into_iter().next() {
        Some(artist) => {
            debug!(query, artist_id = %artist.id, "artist resolved");
            Ok(artist)
        }
        None => Err(SearchError::ArtistNotFound(query.to_string())),
    }
}
