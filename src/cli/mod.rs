//! # CLI Module
//!
//! The terminal front ends of artistfolio. Both commands drive a
//! [`SearchOrchestrator`](crate::management::SearchOrchestrator) and render
//! its state as an artist page followed by a discography table.
//!
//! - [`search`] - one-shot lookup (`artistfolio search radiohead`), optionally
//!   printed as JSON
//! - [`interactive`] - read queries from stdin until `:quit` or EOF; input
//!   stays live while searches run, and superseded results are dropped
//!
//! ```text
//! CLI Layer (rendering, notices)
//!     ↓
//! Management Layer (credential, orchestrator state)
//!     ↓
//! Spotify Layer (HTTP requests)
//! ```

mod interactive;
mod render;
mod search;

use crate::{
    config::Settings,
    error::Result,
    management::SearchOrchestrator,
    spotify::SpotifyClient,
};

pub use interactive::{SessionSummary, interactive, run_session};
pub use render::{JsonReport, render_error, render_notice, render_state};
pub use search::search;

/// Builds an orchestrator talking to Spotify with the configured timeout.
pub fn build_orchestrator(settings: Settings) -> Result<SearchOrchestrator<SpotifyClient>> {
    let timeout = settings.timeout;
    let client = SpotifyClient::new(settings)?;
    Ok(SearchOrchestrator::new(client).with_timeout(timeout))
}
