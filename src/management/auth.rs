use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    error::{Result, SearchError},
    spotify::SpotifyApi,
    types::Credential,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenState {
    Missing,
    Valid(Credential),
    Failed(String),
}

/// Holds the bearer credential for the lifetime of the process.
///
/// The first [`ensure_token`](Self::ensure_token) performs the exchange;
/// later calls return the cached credential until it expires. A failed
/// exchange leaves the provider unauthenticated: every call fails with
/// [`SearchError::Unauthenticated`] without touching the network until
/// [`retry`](Self::retry) is called.
#[derive(Debug)]
pub struct CredentialProvider {
    state: TokenState,
    exchanges: u32,
}

impl Default for CredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider {
    pub fn new() -> Self {
        CredentialProvider {
            state: TokenState::Missing,
            exchanges: 0,
        }
    }

    /// Returns a valid credential, exchanging for one if none is cached or
    /// the cached one expired.
    ///
    /// # Arguments
    ///
    /// * `api` - Performs the exchange when one is needed
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(Credential)` - The cached or freshly issued credential
    /// - `Err(SearchError::Unauthenticated)` - This or an earlier exchange failed
    ///
    /// # Example
    ///
    /// ```
    /// let mut provider = CredentialProvider::new();
    /// let token = provider.ensure_token(&client).await?;
    /// let again = provider.ensure_token(&client).await?; // no second exchange
    /// ```
    pub async fn ensure_token<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Credential> {
        self.ensure_token_at(api, Utc::now().timestamp() as u64).await
    }

    /// [`ensure_token`](Self::ensure_token) with an explicit clock, in Unix seconds.
    pub async fn ensure_token_at<A: SpotifyApi + ?Sized>(
        &mut self,
        api: &A,
        now: u64,
    ) -> Result<Credential> {
        match &self.state {
            TokenState::Valid(token) if !token.is_expired(now) => return Ok(token.clone()),
            TokenState::Valid(_) => debug!("cached token expired, renewing"),
            TokenState::Failed(reason) => {
                return Err(SearchError::Unauthenticated(reason.clone()));
            }
            TokenState::Missing => {}
        }

        self.exchange(api).await
    }

    /// Forgets a previous failure and performs a fresh exchange.
    pub async fn retry<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Credential> {
        self.state = TokenState::Missing;
        self.ensure_token(api).await
    }

    async fn exchange<A: SpotifyApi + ?Sized>(&mut self, api: &A) -> Result<Credential> {
        self.exchanges += 1;
        let issued = api.request_token().await.and_then(|token| {
            if token.access_token.trim().is_empty() {
                Err(SearchError::Unauthenticated(
                    "token exchange returned an empty access token".to_string(),
                ))
            } else {
                Ok(token)
            }
        });

        match issued {
            Ok(token) => {
                self.state = TokenState::Valid(token.clone());
                Ok(token)
            }
            Err(e) => {
                let reason = match e {
                    SearchError::Unauthenticated(reason) => reason,
                    other => format!("token exchange failed: {other}"),
                };
                warn!(%reason, "token exchange failed");
                self.state = TokenState::Failed(reason.clone());
                Err(SearchError::Unauthenticated(reason))
            }
        }
    }

    /// The cached credential, if an exchange has succeeded.
    pub fn current(&self) -> Option<&Credential> {
        match &self.state {
            TokenState::Valid(token) => Some(token),
            _ => None,
        }
    }

    /// The reason of the last failed exchange, until a retry succeeds.
    pub fn failure(&self) -> Option<&str> {
        match &self.state {
            TokenState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    /// Number of token exchanges attempted so far.
    pub fn exchange_count(&self) -> u32 {
        self.exchanges
    }
}
