use std::io::Write;

use indicatif::ProgressBar;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing::warn;

use crate::{
    cli::{build_orchestrator, render},
    config::Settings,
    error, info,
    management::{SearchOrchestrator, SearchOutcome},
    spotify::SpotifyApi,
    success, warning,
};

const PROMPT: &str = "artist> ";

/// Counters for one interactive session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Queries accepted by the orchestrator.
    pub submitted: usize,
    /// Outcomes that became the displayed result.
    pub applied: usize,
    /// Outcomes dropped because a newer query had been accepted meanwhile.
    pub discarded: usize,
}

/// Reads artist queries from stdin and renders each result.
///
/// A failed token exchange at startup does not end the session: searches are
/// refused until `:auth` succeeds.
///
/// Commands:
/// - `:auth` - retry the token exchange
/// - `:help` - list commands
/// - `:quit` - leave (EOF works too)
pub async fn interactive(settings: Settings) {
    let mut orchestrator = match build_orchestrator(settings) {
        Ok(o) => o,
        Err(e) => error!("Cannot set up Spotify client. Err: {}", e),
    };

    match orchestrator.start().await {
        Ok(()) => success!("Connected to Spotify. Type an artist name, :help for commands."),
        Err(e) => warning!("{}. Type :auth to try again.", e),
    }

    run_session(&mut orchestrator, BufReader::new(tokio::io::stdin())).await;
}

/// Drives an orchestrator from line-based input until `:quit` or EOF.
///
/// Input keeps being read while searches are in flight. Every accepted query
/// runs as its own task; when a new query is accepted before an older one has
/// finished, the older outcome is discarded on arrival instead of replacing
/// the newer result. At EOF the session waits for in-flight searches before
/// returning; `:quit` abandons them.
///
/// # Arguments
///
/// * `orchestrator` - An orchestrator, usually already authenticated via `start`
/// * `input` - Line source; stdin for the CLI
///
/// # Returns
///
/// A [`SessionSummary`] with the number of submitted, applied and discarded searches.
///
/// # Example
///
/// ```
/// let mut orchestrator = build_orchestrator(settings)?;
/// orchestrator.start().await?;
/// let summary = run_session(&mut orchestrator, BufReader::new(tokio::io::stdin())).await;
/// ```
pub async fn run_session<A, R>(
    orchestrator: &mut SearchOrchestrator<A>,
    input: R,
) -> SessionSummary
where
    A: SpotifyApi + 'static,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut in_flight: JoinSet<SearchOutcome> = JoinSet::new();
    let mut input_open = true;
    let mut pb: Option<ProgressBar> = None;
    let mut summary = SessionSummary::default();

    prompt();
    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => {
                        input_open = false;
                        continue;
                    }
                    Err(e) => {
                        warning!("Cannot read input. Err: {}", e);
                        input_open = false;
                        continue;
                    }
                };

                match line.trim() {
                    ":quit" | ":q" => break,
                    ":help" => {
                        info!("Type an artist name to search.");
                        info!(":auth retries authentication, :quit leaves.");
                    }
                    ":auth" => match orchestrator.retry_auth().await {
                        Ok(()) => success!("Authenticated."),
                        Err(e) => render::render_error(&e),
                    },
                    query => match orchestrator.submit(query).await {
                        Ok(ticket) => {
                            summary.submitted += 1;
                            if let Some(old) = pb.take() {
                                old.finish_and_clear();
                            }
                            pb = Some(render::spinner(format!("Searching for \"{}\"...", ticket.query)));
                            in_flight.spawn(SearchOrchestrator::execute(
                                orchestrator.api_handle(),
                                ticket,
                                orchestrator.timeout(),
                            ));
                        }
                        Err(e) => {
                            if !e.is_notice() {
                                render::render_error(&e);
                            }
                            for notice in orchestrator.take_notices() {
                                render::render_notice(&notice);
                            }
                        }
                    },
                }
                prompt();
            }
            Some(joined) = in_flight.join_next() => {
                let outcome = match joined {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        warn!(error = %e, "search task did not complete");
                        continue;
                    }
                };

                if !orchestrator.apply(outcome) {
                    summary.discarded += 1;
                    continue;
                }

                summary.applied += 1;
                if let Some(pb) = pb.take() {
                    pb.finish_and_clear();
                }
                println!();
                render::render_state(orchestrator.state());
                for notice in orchestrator.take_notices() {
                    render::render_notice(&notice);
                }
                if input_open {
                    prompt();
                }
            }
            else => break,
        }
    }

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }
    summary
}

fn prompt() {
    print!("{}", PROMPT);
    let _ = std::io::stdout().flush();
}
