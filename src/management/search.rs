use std::{fmt, future::Future, sync::Arc, time::Duration};

use tracing::{debug, info, warn};

use crate::{
    config::DEFAULT_TIMEOUT_SECS,
    error::{Result, SearchError},
    management::CredentialProvider,
    spotify::{SpotifyApi, artists, releases},
    types::{AlbumRecord, ArtistRecord, ArtistSelection, Credential},
};

/// Side-effect notifications raised by the orchestrator for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    EmptyQuery,
    NoAlbums { artist: String },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::EmptyQuery => write!(f, "Please enter something in the box. Anything."),
            Notice::NoAlbums { artist } => write!(f, "No albums found for {artist}."),
        }
    }
}

#[derive(Debug)]
pub enum SearchState {
    Idle,
    TokenPending,
    Ready,
    /// The token exchange failed; searches are refused until a retry succeeds.
    Unauthenticated { reason: String },
    Searching { generation: u64, query: String },
    Resolved {
        artist: ArtistRecord,
        albums: Vec<AlbumRecord>,
    },
    /// `artist` is kept when only the album listing failed.
    Failed {
        error: SearchError,
        artist: ArtistSelection,
    },
}

impl SearchState {
    /// The artist on display; also set when only the album listing failed.
    pub fn artist(&self) -> Option<&ArtistRecord> {
        match self {
            SearchState::Resolved { artist, .. } => Some(artist),
            SearchState::Failed { artist, .. } => artist.artist(),
            _ => None,
        }
    }

    /// The albums on display, empty unless the search fully resolved.
    pub fn albums(&self) -> &[AlbumRecord] {
        match self {
            SearchState::Resolved { albums, .. } => albums,
            _ => &[],
        }
    }
}

/// A search that has been accepted and is waiting to be executed.
#[derive(Debug, Clone)]
pub struct SearchTicket {
    pub generation: u64,
    pub query: String,
    credential: Credential,
}

#[derive(Debug)]
pub enum SearchResult {
    Found {
        artist: ArtistRecord,
        albums: Vec<AlbumRecord>,
    },
    Failed {
        error: SearchError,
        artist: ArtistSelection,
    },
}

/// The result of executing a [`SearchTicket`], tagged with its generation.
#[derive(Debug)]
pub struct SearchOutcome {
    pub generation: u64,
    pub query: String,
    pub result: SearchResult,
}

/// Sequences token acquisition, artist resolution and album listing, and owns
/// the artist/albums currently on display.
///
/// Each accepted query bumps a generation counter; an outcome is only applied
/// when its generation is still the current one, so a slow superseded search
/// can never overwrite a newer result.
pub struct SearchOrchestrator<A: SpotifyApi> {
    api: Arc<A>,
    credentials: CredentialProvider,
    state: SearchState,
    generation: u64,
    notices: Vec<Notice>,
    timeout: Duration,
}

impl<A: SpotifyApi> SearchOrchestrator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            credentials: CredentialProvider::new(),
            state: SearchState::Idle,
            generation: 0,
            notices: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Sets the deadline applied to each remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Borrows the API implementation the orchestrator was built with.
    pub fn api(&self) -> &A {
        &self.api
    }

    /// Returns a shared handle to the API, for running
    /// [`execute`](Self::execute) off the orchestrator (e.g. in a spawned task).
    pub fn api_handle(&self) -> Arc<A> {
        Arc::clone(&self.api)
    }

    /// The state currently on display.
    pub fn state(&self) -> &SearchState {
        &self.state
    }

    /// The credential provider, for inspecting the held token or last failure.
    pub fn credentials(&self) -> &CredentialProvider {
        &self.credentials
    }

    /// The deadline applied to each remote call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The generation of the most recently accepted query, `0` before any.
    ///
    /// Only outcomes carrying this generation are applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drains the notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Acquires the bearer token: `Idle → TokenPending → Ready | Unauthenticated`.
    pub async fn start(&mut self) -> Result<()> {
        self.state = SearchState::TokenPending;
        let outcome = with_deadline(self.timeout, self.credentials.ensure_token(&*self.api)).await;
        self.settle_auth(outcome)
    }

    /// Retries a failed token exchange.
    pub async fn retry_auth(&mut self) -> Result<()> {
        self.state = SearchState::TokenPending;
        let outcome = with_deadline(self.timeout, self.credentials.retry(&*self.api)).await;
        self.settle_auth(outcome)
    }

    fn settle_auth(&mut self, outcome: Result<Credential>) -> Result<()> {
        match outcome {
            Ok(_) => {
                info!("authenticated with Spotify");
                self.state = SearchState::Ready;
                Ok(())
            }
            Err(e) => Err(self.mark_unauthenticated(e)),
        }
    }

    fn mark_unauthenticated(&mut self, error: SearchError) -> SearchError {
        let reason = match &error {
            SearchError::Unauthenticated(reason) => reason.clone(),
            other => other.to_string(),
        };
        self.state = SearchState::Unauthenticated { reason };
        error
    }

    /// Accepts a query and moves to `Searching`.
    ///
    /// Empty queries raise [`Notice::EmptyQuery`] and leave the state untouched.
    /// Without a usable token the query is refused with
    /// [`SearchError::Unauthenticated`] before any request is built. Accepting
    /// a query drops the previously displayed artist and albums together.
    pub async fn submit(&mut self, query: &str) -> Result<SearchTicket> {
        let query = match artists::validate_query(query) {
            Ok(q) => q.to_string(),
            Err(e) => {
                self.notices.push(Notice::EmptyQuery);
                return Err(e);
            }
        };

        if let SearchState::Unauthenticated { reason } = &self.state {
            return Err(SearchError::Unauthenticated(reason.clone()));
        }

        let credential =
            match with_deadline(self.timeout, self.credentials.ensure_token(&*self.api)).await {
                Ok(token) => token,
                Err(e) => return Err(self.mark_unauthenticated(e)),
            };

        self.generation += 1;
        debug!(generation = self.generation, %query, "search submitted");
        self.state = SearchState::Searching {
            generation: self.generation,
            query: query.clone(),
        };

        Ok(SearchTicket {
            generation: self.generation,
            query,
            credential,
        })
    }

    /// Runs the remote part of a search: resolve the artist, then list its albums.
    ///
    /// The album listing is only issued once the artist id is known. This does
    /// not touch the orchestrator, so it can run while further queries are
    /// submitted; its outcome is handed back through [`apply`](Self::apply).
    ///
    /// # Arguments
    ///
    /// * `api` - Shared API handle, see [`api_handle`](Self::api_handle)
    /// * `ticket` - The accepted query returned by [`submit`](Self::submit)
    /// * `timeout` - Deadline applied to each of the two remote calls
    ///
    /// # Example
    ///
    /// ```
    /// let ticket = orchestrator.submit("Radiohead").await?;
    /// let api = orchestrator.api_handle();
    /// let timeout = orchestrator.timeout();
    /// let task = tokio::spawn(SearchOrchestrator::execute(api, ticket, timeout));
    /// let applied = orchestrator.apply(task.await?);
    /// ```
    pub async fn execute(api: Arc<A>, ticket: SearchTicket, timeout: Duration) -> SearchOutcome {
        let SearchTicket {
            generation,
            query,
            credential,
        } = ticket;

        let result = match with_deadline(
            timeout,
            artists::resolve_artist(&*api, &query, &credential),
        )
        .await
        {
            Err(error) => SearchResult::Failed {
                error,
                artist: ArtistSelection::NoArtist,
            },
            Ok(artist) => {
                match with_deadline(timeout, releases::list_albums(&*api, &artist.id, &credential))
                    .await
                {
                    Ok(albums) => SearchResult::Found { artist, albums },
                    Err(error) => SearchResult::Failed {
                        error: SearchError::AlbumFetch(Box::new(error)),
                        artist: ArtistSelection::Artist(artist),
                    },
                }
            }
        };

        SearchOutcome {
            generation,
            query,
            result,
        }
    }

    /// Installs an outcome if it belongs to the current generation.
    ///
    /// Returns `false` when the outcome was stale and discarded.
    pub fn apply(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                query = %outcome.query,
                "discarding superseded search result"
            );
            return false;
        }

        self.state = match outcome.result {
            SearchResult::Found { artist, albums } => {
                if albums.is_empty() {
                    self.notices.push(Notice::NoAlbums {
                        artist: artist.name.clone(),
                    });
                }
                SearchState::Resolved { artist, albums }
            }
            SearchResult::Failed { error, artist } => {
                warn!(query = %outcome.query, error = %error, "search failed");
                SearchState::Failed { error, artist }
            }
        };
        true
    }

    /// Submits, executes and applies a query in one go.
    ///
    /// Validation and authentication problems are returned as errors; remote
    /// failures end up in [`SearchState::Failed`].
    pub async fn search(&mut self, query: &str) -> Result<&SearchState> {
        let ticket = self.submit(query).await?;
        let outcome = Self::execute(self.api_handle(), ticket, self.timeout).await;
        self.apply(outcome);
        Ok(&self.state)
    }
}

async fn with_deadline<T>(timeout: Duration, fut: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(SearchError::Timeout(timeout)),
    }
}
