use std::{collections::HashMap, sync::Mutex, time::Duration};

use artistfolio::cli::{SessionSummary, run_session};
use artistfolio::error::{ErrorKind, SearchError};
use artistfolio::management::{CredentialProvider, Notice, SearchOrchestrator, SearchState};
use artistfolio::spotify::SpotifyApi;
use artistfolio::types::{AlbumRecord, ArtistRecord, ArtistSelection, Credential, DatePrecision};
use artistfolio::utils;
use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::io::BufReader;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Token,
    Search { query: String, bearer: String },
    Albums { artist_id: String, bearer: String },
}

/// In-memory stand-in for Spotify that records every call it receives.
struct FakeSpotify {
    token: Mutex<Option<String>>,
    artists: HashMap<String, Vec<ArtistRecord>>,
    albums: HashMap<String, Vec<AlbumRecord>>,
    failing_albums: bool,
    search_delay: Option<Duration>,
    query_delays: HashMap<String, Duration>,
    token_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl FakeSpotify {
    fn new() -> Self {
        Self {
            token: Mutex::new(Some("BQDfake".to_string())),
            artists: HashMap::new(),
            albums: HashMap::new(),
            failing_albums: false,
            search_delay: None,
            query_delays: HashMap::new(),
            token_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn with_artist(mut self, query: &str, artist: ArtistRecord, albums: Vec<AlbumRecord>) -> Self {
        self.albums.insert(artist.id.clone(), albums);
        self.artists
            .entry(query.to_string())
            .or_default()
            .push(artist);
        self
    }

    fn with_token(self, token: Option<&str>) -> Self {
        *self.token.lock().unwrap() = token.map(str::to_string);
        self
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SpotifyApi for FakeSpotify {
    async fn request_token(&self) -> Result<Credential, SearchError> {
        self.record(Call::Token);
        if let Some(delay) = self.token_delay {
            tokio::time::sleep(delay).await;
        }
        match self.token.lock().unwrap().clone() {
            Some(access_token) => Ok(Credential {
                access_token,
                expires_in: 3600,
                obtained_at: chrono::Utc::now().timestamp() as u64,
            }),
            None => Err(SearchError::Http {
                status: StatusCode::BAD_REQUEST,
                message: "invalid_client".to_string(),
            }),
        }
    }

    async fn search_artists(
        &self,
        query: &str,
        token: &Credential,
    ) -> Result<Vec<ArtistRecord>, SearchError> {
        self.record(Call::Search {
            query: query.to_string(),
            bearer: token.access_token.clone(),
        });
        if let Some(delay) = self.search_delay.or(self.query_delays.get(query).copied()) {
            tokio::time::sleep(delay).await;
        }
        Ok(self.artists.get(query).cloned().unwrap_or_default())
    }

    async fn artist_albums(
        &self,
        artist_id: &str,
        token: &Credential,
    ) -> Result<Vec<AlbumRecord>, SearchError> {
        self.record(Call::Albums {
            artist_id: artist_id.to_string(),
            bearer: token.access_token.clone(),
        });
        if self.failing_albums {
            return Err(SearchError::Http {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Server error".to_string(),
            });
        }
        Ok(self.albums.get(artist_id).cloned().unwrap_or_default())
    }
}

fn artist(id: &str, name: &str, genres: &[&str]) -> ArtistRecord {
    ArtistRecord {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity: 79,
        follower_count: 8_234_567,
        image_url: Some(format!("https://i.scdn.co/image/{}", id)),
    }
}

fn albums(prefix: &str, count: usize) -> Vec<AlbumRecord> {
    (0..count)
        .map(|i| AlbumRecord {
            id: format!("{}-{}", prefix, i),
            name: format!("Album {}", i),
            release_date: "2001-06-05".to_string(),
            release_date_precision: DatePrecision::Day,
            total_tracks: 10,
            external_url: format!("https://open.spotify.com/album/{}-{}", prefix, i),
            cover_image_url: None,
        })
        .collect()
}

#[tokio::test]
async fn test_end_to_end_radiohead() {
    let api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &["alternative rock", "art rock"]),
        albums("rh", 9),
    );
    let mut orchestrator = SearchOrchestrator::new(api);

    orchestrator.start().await.unwrap();
    assert!(matches!(orchestrator.state(), SearchState::Ready));

    let state = orchestrator.search("Radiohead").await.unwrap();
    let SearchState::Resolved { artist, albums } = state else {
        panic!("expected a resolved search, got {:?}", state);
    };
    assert_eq!(artist.id, "abc123");
    assert_eq!(albums.len(), 9);
    assert_eq!(
        utils::format_genre_clause(&artist.genres),
        ", commonly associated with alternative rock and art rock"
    );
    assert_eq!(
        utils::artist_summary(&artist.name, albums.len(), &artist.genres),
        "Radiohead has released 9 albums, commonly associated with alternative rock and art rock."
    );
    assert!(orchestrator.take_notices().is_empty());
}

#[tokio::test]
async fn test_albums_are_listed_only_after_artist_is_resolved() {
    let api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 2),
    );
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();
    orchestrator.search("  Radiohead ").await.unwrap();

    assert_eq!(
        orchestrator.api().calls(),
        vec![
            Call::Token,
            Call::Search {
                query: "Radiohead".to_string(),
                bearer: "BQDfake".to_string()
            },
            Call::Albums {
                artist_id: "abc123".to_string(),
                bearer: "BQDfake".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_token_is_exchanged_once() {
    let api = FakeSpotify::new()
        .with_artist("Radiohead", artist("abc123", "Radiohead", &[]), albums("rh", 1))
        .with_artist("Portishead", artist("def456", "Portishead", &[]), albums("ph", 1));
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    orchestrator.search("Radiohead").await.unwrap();
    orchestrator.search("Portishead").await.unwrap();

    let token_calls = orchestrator
        .api()
        .calls()
        .into_iter()
        .filter(|c| *c == Call::Token)
        .count();
    assert_eq!(token_calls, 1);
    assert_eq!(orchestrator.credentials().exchange_count(), 1);
}

#[tokio::test]
async fn test_failed_token_exchange_blocks_requests() {
    let api = FakeSpotify::new()
        .with_token(None)
        .with_artist("Radiohead", artist("abc123", "Radiohead", &[]), albums("rh", 1));
    let mut orchestrator = SearchOrchestrator::new(api);

    let err = orchestrator.start().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert!(matches!(
        orchestrator.state(),
        SearchState::Unauthenticated { .. }
    ));

    let err = orchestrator.search("Radiohead").await.unwrap_err();
    assert!(matches!(err, SearchError::Unauthenticated(_)));

    // Only the failed exchange reached the API; nothing was sent without a token.
    assert_eq!(orchestrator.api().calls(), vec![Call::Token]);
}

#[tokio::test]
async fn test_empty_access_token_counts_as_failed_exchange() {
    let api = FakeSpotify::new()
        .with_token(Some(""))
        .with_artist("Radiohead", artist("abc123", "Radiohead", &[]), albums("rh", 1));
    let mut orchestrator = SearchOrchestrator::new(api);

    assert!(orchestrator.start().await.is_err());
    assert!(orchestrator.search("Radiohead").await.is_err());
    assert_eq!(orchestrator.api().calls(), vec![Call::Token]);
}

#[tokio::test]
async fn test_retry_auth_recovers() {
    let api = FakeSpotify::new()
        .with_token(None)
        .with_artist("Radiohead", artist("abc123", "Radiohead", &[]), albums("rh", 3));
    let mut orchestrator = SearchOrchestrator::new(api);
    assert!(orchestrator.start().await.is_err());

    *orchestrator.api().token.lock().unwrap() = Some("BQDsecond".to_string());
    orchestrator.retry_auth().await.unwrap();
    assert!(matches!(orchestrator.state(), SearchState::Ready));

    let state = orchestrator.search("Radiohead").await.unwrap();
    assert_eq!(state.albums().len(), 3);
    assert_eq!(orchestrator.credentials().exchange_count(), 2);
}

#[tokio::test]
async fn test_empty_query_is_rejected_without_network() {
    let api = FakeSpotify::new();
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    for query in ["", "   ", "\t\n"] {
        let err = orchestrator.search(query).await.unwrap_err();
        assert!(matches!(err, SearchError::EmptyQuery));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    assert!(matches!(orchestrator.state(), SearchState::Ready));
    assert_eq!(orchestrator.take_notices(), vec![Notice::EmptyQuery; 3]);
    assert_eq!(orchestrator.api().calls(), vec![Call::Token]);
    assert_eq!(orchestrator.generation(), 0);
}

#[tokio::test]
async fn test_empty_query_keeps_previous_result() {
    let api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 2),
    );
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();
    orchestrator.search("Radiohead").await.unwrap();

    assert!(orchestrator.search(" ").await.is_err());
    assert_eq!(orchestrator.state().artist().unwrap().id, "abc123");
    assert_eq!(orchestrator.state().albums().len(), 2);
}

#[tokio::test]
async fn test_artist_not_found() {
    let api = FakeSpotify::new();
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let state = orchestrator.search("zzzzqqq").await.unwrap();
    let SearchState::Failed { error, artist } = state else {
        panic!("expected a failed search, got {:?}", state);
    };
    assert!(matches!(error, SearchError::ArtistNotFound(q) if q == "zzzzqqq"));
    assert_eq!(error.kind(), ErrorKind::NotFound);
    assert_eq!(*artist, ArtistSelection::NoArtist);
    assert!(state.albums().is_empty());

    assert!(
        !orchestrator
            .api()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Albums { .. }))
    );
}

#[tokio::test]
async fn test_album_failure_keeps_artist() {
    let mut api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 2),
    );
    api.failing_albums = true;
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let state = orchestrator.search("Radiohead").await.unwrap();
    let SearchState::Failed { error, artist } = state else {
        panic!("expected a failed search, got {:?}", state);
    };
    assert_eq!(error.kind(), ErrorKind::PartialData);
    assert_eq!(artist.artist().unwrap().id, "abc123");
    assert!(state.albums().is_empty());
}

#[tokio::test]
async fn test_zero_albums_is_resolved_with_one_notice() {
    let api = FakeSpotify::new().with_artist(
        "Obscure",
        artist("obs1", "Obscure Artist", &["x"]),
        Vec::new(),
    );
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let state = orchestrator.search("Obscure").await.unwrap();
    let SearchState::Resolved { artist, albums } = state else {
        panic!("expected a resolved search, got {:?}", state);
    };
    assert_eq!(artist.id, "obs1");
    assert!(albums.is_empty());

    assert_eq!(
        orchestrator.take_notices(),
        vec![Notice::NoAlbums {
            artist: "Obscure Artist".to_string()
        }]
    );
    assert!(orchestrator.take_notices().is_empty());
}

#[tokio::test]
async fn test_first_match_is_taken() {
    let api = FakeSpotify::new()
        .with_artist("Genesis", artist("gen1", "Genesis", &[]), albums("g", 1))
        .with_artist("Genesis", artist("gen2", "Genesis Owusu", &[]), albums("go", 1));
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let state = orchestrator.search("Genesis").await.unwrap();
    assert_eq!(state.artist().unwrap().id, "gen1");
}

#[tokio::test]
async fn test_new_search_clears_previous_artist_and_albums() {
    let api = FakeSpotify::new()
        .with_artist("Radiohead", artist("abc123", "Radiohead", &[]), albums("rh", 4))
        .with_artist("Portishead", artist("def456", "Portishead", &[]), albums("ph", 3));
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();
    orchestrator.search("Radiohead").await.unwrap();

    let ticket = orchestrator.submit("Portishead").await.unwrap();
    assert!(matches!(orchestrator.state(), SearchState::Searching { .. }));
    assert!(orchestrator.state().artist().is_none());
    assert!(orchestrator.state().albums().is_empty());

    let timeout = orchestrator.timeout();
    let outcome = SearchOrchestrator::execute(orchestrator.api_handle(), ticket, timeout).await;
    assert!(orchestrator.apply(outcome));
    assert_eq!(orchestrator.state().artist().unwrap().id, "def456");
    assert_eq!(orchestrator.state().albums().len(), 3);
}

#[tokio::test]
async fn test_superseded_search_result_is_discarded() {
    let api = FakeSpotify::new()
        .with_artist("Slow", artist("slow1", "Slow Artist", &[]), albums("s", 5))
        .with_artist("Fast", artist("fast1", "Fast Artist", &[]), albums("f", 2));
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let slow = orchestrator.submit("Slow").await.unwrap();
    let fast = orchestrator.submit("Fast").await.unwrap();
    assert!(fast.generation > slow.generation);

    let timeout = orchestrator.timeout();
    let fast_outcome =
        SearchOrchestrator::execute(orchestrator.api_handle(), fast, timeout).await;
    let slow_outcome =
        SearchOrchestrator::execute(orchestrator.api_handle(), slow, timeout).await;

    assert!(orchestrator.apply(fast_outcome));
    assert!(!orchestrator.apply(slow_outcome));

    assert_eq!(orchestrator.state().artist().unwrap().id, "fast1");
    assert_eq!(orchestrator.state().albums().len(), 2);
}

#[tokio::test]
async fn test_hung_request_times_out() {
    let mut api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 1),
    );
    api.search_delay = Some(Duration::from_secs(5));
    let mut orchestrator = SearchOrchestrator::new(api).with_timeout(Duration::from_millis(50));
    orchestrator.start().await.unwrap();

    let state = orchestrator.search("Radiohead").await.unwrap();
    let SearchState::Failed { error, artist } = state else {
        panic!("expected a failed search, got {:?}", state);
    };
    assert!(matches!(error, SearchError::Timeout(_)));
    assert!(error.timed_out());
    assert_eq!(error.kind(), ErrorKind::Network);
    assert_eq!(*artist, ArtistSelection::NoArtist);
}

#[tokio::test]
async fn test_credential_provider_renews_expired_token() {
    let api = FakeSpotify::new();
    let mut provider = CredentialProvider::new();

    let first = provider.ensure_token_at(&api, 0).await.unwrap();
    let cached = provider.ensure_token_at(&api, 60).await.unwrap();
    assert_eq!(first, cached);
    assert_eq!(provider.exchange_count(), 1);

    let expiry = first.obtained_at + first.expires_in;
    provider.ensure_token_at(&api, expiry).await.unwrap();
    assert_eq!(provider.exchange_count(), 2);
}

#[tokio::test]
async fn test_credential_provider_stays_failed_until_retry() {
    let api = FakeSpotify::new().with_token(None);
    let mut provider = CredentialProvider::new();

    assert!(provider.ensure_token(&api).await.is_err());
    assert!(provider.ensure_token(&api).await.is_err());
    assert_eq!(provider.exchange_count(), 1);
    assert!(provider.failure().is_some());
    assert!(provider.current().is_none());

    *api.token.lock().unwrap() = Some("BQDok".to_string());
    let token = provider.retry(&api).await.unwrap();
    assert_eq!(token.access_token, "BQDok");
    assert_eq!(provider.current(), Some(&token));
}

#[tokio::test]
async fn test_hung_token_exchange_leaves_unauthenticated() {
    let mut api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 1),
    );
    api.token_delay = Some(Duration::from_secs(5));
    let mut orchestrator = SearchOrchestrator::new(api).with_timeout(Duration::from_millis(50));

    let err = orchestrator.start().await.unwrap_err();
    assert!(err.timed_out());
    assert!(matches!(
        orchestrator.state(),
        SearchState::Unauthenticated { .. }
    ));

    let err = orchestrator.search("Radiohead").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Auth);
    assert_eq!(orchestrator.generation(), 0);
    assert_eq!(orchestrator.api().calls(), vec![Call::Token]);
}

#[tokio::test]
async fn test_session_keeps_reading_while_search_in_flight() {
    let mut api = FakeSpotify::new()
        .with_artist("Slow", artist("slow1", "Slow Artist", &[]), albums("s", 5))
        .with_artist("Fast", artist("fast1", "Fast Artist", &[]), albums("f", 2));
    api.query_delays
        .insert("Slow".to_string(), Duration::from_millis(300));
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let input = BufReader::new(&b"Slow\nFast\n"[..]);
    let summary = run_session(&mut orchestrator, input).await;

    assert_eq!(
        summary,
        SessionSummary {
            submitted: 2,
            applied: 1,
            discarded: 1,
        }
    );
    assert_eq!(orchestrator.generation(), 2);
    assert_eq!(orchestrator.state().artist().unwrap().id, "fast1");
    assert_eq!(orchestrator.state().albums().len(), 2);

    let calls = orchestrator.api().calls();
    let album_lookup = |id: &str| {
        calls
            .iter()
            .position(|c| matches!(c, Call::Albums { artist_id, .. } if artist_id == id))
            .unwrap()
    };
    assert!(album_lookup("fast1") < album_lookup("slow1"));
}

#[tokio::test]
async fn test_session_skips_blank_lines() {
    let api = FakeSpotify::new().with_artist(
        "Radiohead",
        artist("abc123", "Radiohead", &[]),
        albums("rh", 3),
    );
    let mut orchestrator = SearchOrchestrator::new(api);
    orchestrator.start().await.unwrap();

    let input = BufReader::new(&b"   \n\nRadiohead\n"[..]);
    let summary = run_session(&mut orchestrator, input).await;

    assert_eq!(summary.submitted, 1);
    assert_eq!(summary.applied, 1);
    assert_eq!(summary.discarded, 0);
    assert!(orchestrator.take_notices().is_empty());
    assert_eq!(orchestrator.state().albums().len(), 3);
}
