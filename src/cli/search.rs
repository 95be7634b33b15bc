use crate::{
    cli::{
        build_orchestrator,
        render::{self, JsonReport},
    },
    config::Settings,
    error, info,
    management::SearchState,
};

/// Looks up a single artist and prints the result.
///
/// With `json` set, the result is written to stdout as one JSON document and
/// nothing else is printed there.
///
/// # Example Usage
///
/// ```bash
/// artistfolio search radiohead
/// artistfolio search "the national" --json
/// ```
pub async fn search(settings: Settings, query: String, json: bool) {
    let mut orchestrator = match build_orchestrator(settings) {
        Ok(o) => o,
        Err(e) => error!("Cannot set up Spotify client. Err: {}", e),
    };

    if let Err(e) = orchestrator.start().await {
        error!("Cannot authenticate with Spotify. Err: {}", e);
    }

    let pb = (!json).then(|| render::spinner(format!("Searching for \"{}\"...", query.trim())));
    let result = orchestrator.search(&query).await.map(|_| ());
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let notices = orchestrator.take_notices();
    if json {
        let report = JsonReport::new(&query, orchestrator.state(), &notices);
        match serde_json::to_string_pretty(&report) {
            Ok(out) => println!("{}", out),
            Err(e) => error!("Cannot serialize result. Err: {}", e),
        }
        if result.is_err() || matches!(orchestrator.state(), SearchState::Failed { .. }) {
            std::process::exit(1);
        }
        return;
    }

    if let Err(e) = result {
        for notice in &notices {
            render::render_notice(notice);
        }
        if notices.is_empty() {
            render::render_error(&e);
        }
        std::process::exit(1);
    }

    render::render_state(orchestrator.state());
    for notice in &notices {
        render::render_notice(notice);
    }

    if let SearchState::Resolved { albums, .. } = orchestrator.state() {
        if albums.len() as u32 >= crate::spotify::releases::PAGE_LIMIT {
            info!(
                "Showing the first {} albums only.",
                crate::spotify::releases::PAGE_LIMIT
            );
        }
    } else {
        std::process::exit(1);
    }
}
