use std::time::Duration;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Table;

use crate::{
    error::SearchError,
    management::{Notice, SearchState},
    types::{AlbumRecord, ArtistRecord, ArtistSelection},
    utils, warning,
};

const POPULARITY_WIDTH: usize = 30;

pub(crate) fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_style(
        ProgressStyle::with_template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb
}

pub fn render_notice(notice: &Notice) {
    warning!("{}", notice);
}

pub fn render_error(error: &SearchError) {
    if error.is_notice() {
        warning!("{}", error);
        return;
    }

    warning!("{}", error.to_string().red());
    if error.timed_out() {
        warning!("Spotify did not answer in time, try the search again.");
    }
}

/// Renders whatever the orchestrator currently holds.
pub fn render_state(state: &SearchState) {
    match state {
        SearchState::Resolved { artist, albums } => {
            render_artist(artist, Some(albums.len()));
            render_albums(albums);
        }
        SearchState::Failed { error, artist } => {
            if let ArtistSelection::Artist(artist) = artist {
                render_artist(artist, None);
            }
            render_error(error);
        }
        SearchState::Unauthenticated { reason } => {
            warning!("Not authenticated with Spotify: {}", reason);
        }
        SearchState::Idle
        | SearchState::TokenPending
        | SearchState::Ready
        | SearchState::Searching { .. } => {}
    }
}

/// Prints the artist header. The "has released" sentence needs a known album
/// count and is left out when the listing failed.
fn render_artist(artist: &ArtistRecord, album_count: Option<usize>) {
    println!();
    println!("{}", artist.name.truecolor(0x82, 0x40, 0x1d).bold());
    println!(
        "{} followers",
        utils::format_followers(artist.follower_count)
    );
    if let Some(count) = album_count {
        println!(
            "{}",
            utils::artist_summary(&artist.name, count, &artist.genres)
        );
    }
    println!();
    println!("Popularity");
    println!(
        "{}",
        utils::popularity_bar(artist.popularity, POPULARITY_WIDTH)
    );
    if let Some(url) = &artist.image_url {
        println!("{} {}", "Picture:".dimmed(), url);
    }
}

fn render_albums(albums: &[AlbumRecord]) {
    if albums.is_empty() {
        return;
    }

    println!();
    println!("{}", "Discography".bold());
    println!("{}", Table::new(utils::album_table_rows(albums)));
}

/// Machine-readable form of a finished search.
///
/// `album_summary` is only set when the album listing succeeded, so a failed
/// listing is never reported as "0 albums".
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub query: &'a str,
    pub artist: ArtistSelection,
    pub albums: &'a [AlbumRecord],
    pub album_summary: Option<String>,
    pub notices: Vec<String>,
    pub error: Option<String>,
}

impl<'a> JsonReport<'a> {
    pub fn new(query: &'a str, state: &'a SearchState, notices: &[Notice]) -> Self {
        let artist = match state.artist() {
            Some(a) => ArtistSelection::Artist(a.clone()),
            None => ArtistSelection::NoArtist,
        };
        let albums = state.albums();
        let album_summary = match state {
            SearchState::Resolved { artist, albums } => Some(utils::artist_summary(
                &artist.name,
                albums.len(),
                &artist.genres,
            )),
            _ => None,
        };
        let error = match state {
            SearchState::Failed { error, .. } => Some(error.to_string()),
            SearchState::Unauthenticated { reason } => Some(reason.clone()),
            _ => None,
        };

        Self {
            query,
            artist,
            albums,
            album_summary,
            notices: notices.iter().map(|n| n.to_string()).collect(),
            error,
        }
    }
}
