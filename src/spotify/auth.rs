use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use tracing::debug;

use crate::{
    config::Settings,
    error::{Result, SearchError},
    types::{Credential, TokenResponse},
};

/// Builds the client-credentials token exchange request.
///
/// The client ID and secret are sent as `application/x-www-form-urlencoded`
/// form fields together with `grant_type=client_credentials`.
///
/// # Example
///
/// ```
/// let request = token_request(&client, &settings).build()?;
/// assert_eq!(request.method(), reqwest::Method::POST);
/// ```
pub fn token_request(client: &Client, settings: &Settings) -> RequestBuilder {
    client.post(&settings.token_url).form(&[
        ("grant_type", "client_credentials"),
        ("client_id", settings.client_id.as_str()),
        ("client_secret", settings.client_secret.as_str()),
    ])
}

/// Reads a successful token response into a [`Credential`].
pub async fn read_token_response(response: Response) -> Result<Credential> {
    let body = response.text().await?;
    parse_token(&body, Utc::now().timestamp() as u64)
}

/// Parses the token endpoint body.
///
/// A success response without an `access_token` is rejected rather than
/// turned into an empty credential.
pub fn parse_token(body: &str, obtained_at: u64) -> Result<Credential> {
    let json: TokenResponse = serde_json::from_str(body)?;
    if json.access_token.trim().is_empty() {
        return Err(SearchError::Unauthenticated(
            "token response did not contain an access_token".to_string(),
        ));
    }

    debug!(expires_in = json.expires_in, "access token issued");
    Ok(Credential {
        access_token: json.access_token,
        expires_in: json.expires_in,
        obtained_at,
    })
}
