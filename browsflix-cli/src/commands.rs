//! CLI command implementations

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use browsflix_core::{
    BrowsflixConfig, JsonFileUsageRecorder, Movie, NoopUsageRecorder, SearchRecord, UsageRecorder,
};
use browsflix_search::{
    FetchStrategy, SearchSessionHandle, SessionPhase, SessionState, spawn_search_session,
};
use browsflix_web::ProxyServer;
use clap::Subcommand;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

/// Upper bound on the wait for the last piped query, on top of the debounce.
const LAST_QUERY_SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Show the popular movies listing
    Browse,
    /// Search the catalog once
    Search {
        /// Search terms
        query: String,
    },
    /// Search as you type: every stdin line replaces the query
    Interactive,
    /// Run the catalog proxy server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Show the most frequent searches
    Trending {
        /// Number of searches to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

/// Runs a parsed command.
///
/// # Errors
///
/// - `anyhow::Error` - The command failed; the message is user facing
pub async fn run_command(command: Commands, config: BrowsflixConfig) -> Result<()> {
    match command {
        Commands::Browse => browse(config).await,
        Commands::Search { query } => search(config, query).await,
        Commands::Interactive => interactive(config).await,
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::Trending { limit } => trending(config, limit).await,
    }
}

/// Prints the discover listing.
///
/// # Errors
///
/// - `anyhow::Error` - HTTP client setup failed or the session stopped early
pub async fn browse(config: BrowsflixConfig) -> Result<()> {
    let session = start_session(&config, Arc::new(NoopUsageRecorder))?;

    let state = session.settled_for("").await?;
    println!("Popular movies:");
    print_state(&state);

    session.shutdown().await?;
    Ok(())
}

/// Runs one search and records its top result.
///
/// # Errors
///
/// - `anyhow::Error` - HTTP client setup failed or the session stopped early
pub async fn search(config: BrowsflixConfig, query: String) -> Result<()> {
    let recorder = JsonFileUsageRecorder::new(config.recorder.store_path.clone());
    let session = start_session(&config, Arc::new(recorder))?;

    session.update_query(query.clone()).await?;
    let state = session.settled_for(&query).await?;
    println!("Results for \"{query}\":");
    print_state(&state);

    session.shutdown().await?;
    Ok(())
}

/// Feeds stdin lines to a session and prints every settled state.
///
/// # Errors
///
/// - `anyhow::Error` - Client setup failed, stdin broke, or the session stopped
pub async fn interactive(config: BrowsflixConfig) -> Result<()> {
    let recorder = JsonFileUsageRecorder::new(config.recorder.store_path.clone());
    let session = start_session(&config, Arc::new(recorder))?;

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        let mut last_printed: Option<SessionState> = None;
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            if !is_settled(&state) {
                continue;
            }
            let printable = SessionState {
                query: String::new(),
                ..state
            };
            if last_printed.as_ref() != Some(&printable) {
                print_heading(&printable.debounced_query);
                print_state(&printable);
                last_printed = Some(printable);
            }
        }
    });

    println!("Type to search. An empty line shows popular movies; Ctrl-D quits.");
    let settle_timeout = config.session.debounce_interval + LAST_QUERY_SETTLE_TIMEOUT;
    feed_queries(&session, BufReader::new(tokio::io::stdin()), settle_timeout).await?;

    session.shutdown().await?;
    printer.await.context("Result printer stopped unexpectedly")?;
    Ok(())
}

/// Sends every input line as a query change.
///
/// At end of input the last query is given `settle_timeout` to be searched,
/// so piped input still gets its final results. Returns that settled state,
/// or `None` when the input was empty or the query did not settle in time.
///
/// # Errors
///
/// - `anyhow::Error` - Reading the input failed or the session stopped
async fn feed_queries<R>(
    session: &SearchSessionHandle,
    input: R,
    settle_timeout: Duration,
) -> Result<Option<SessionState>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    let mut last_query = None;
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let query = line.trim().to_string();
        session.update_query(query.as_str()).await?;
        last_query = Some(query);
    }

    let Some(query) = last_query else {
        return Ok(None);
    };
    match tokio::time::timeout(settle_timeout, session.settled_for(&query)).await {
        Ok(state) => Ok(Some(state?)),
        Err(_) => {
            tracing::warn!(query, "Input ended before the last query settled");
            Ok(None)
        }
    }
}

/// Runs the catalog proxy until the process is stopped.
///
/// # Errors
///
/// - `anyhow::Error` - The server could not bind or stopped with an error
pub async fn serve(mut config: BrowsflixConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    if let Some(host) = host {
        config.proxy.host = host;
    }
    if let Some(port) = port {
        config.proxy.port = port;
    }

    let server = ProxyServer::bind(&config.proxy, &config.catalog).await?;
    println!("Browsflix proxy running on http://{}", server.local_addr()?);
    server.run().await?;
    Ok(())
}

/// Prints the most frequent recorded searches.
///
/// # Errors
///
/// - `anyhow::Error` - The search store could not be read
pub async fn trending(config: BrowsflixConfig, limit: usize) -> Result<()> {
    let recorder = JsonFileUsageRecorder::new(config.recorder.store_path.clone());
    let records = recorder
        .trending(limit)
        .await
        .with_context(|| format!("Failed to read {}", recorder.path().display()))?;

    if records.is_empty() {
        println!("No searches recorded yet.");
        return Ok(());
    }

    println!("Trending searches:");
    for (index, record) in records.iter().enumerate() {
        println!("{}", format_trending_line(index + 1, record));
    }
    Ok(())
}

fn start_session(
    config: &BrowsflixConfig,
    recorder: Arc<dyn UsageRecorder>,
) -> Result<SearchSessionHandle> {
    let strategy =
        FetchStrategy::from_config(&config.catalog).context("Failed to set up catalog clients")?;
    Ok(spawn_search_session(strategy, recorder, &config.session))
}

fn is_settled(state: &SessionState) -> bool {
    !state.is_loading && matches!(state.phase, SessionPhase::Success | SessionPhase::Failed)
}

fn print_heading(query: &str) {
    if query.is_empty() {
        println!("\nPopular movies:");
    } else {
        println!("\nResults for \"{query}\":");
    }
}

fn print_state(state: &SessionState) {
    if let Some(error) = state.error() {
        println!("{error}");
        return;
    }
    if state.results.is_empty() {
        println!("No movies found.");
        return;
    }
    for (index, movie) in state.results.iter().enumerate() {
        println!("{}", format_movie_line(index + 1, movie));
    }
}

/// One listing line, e.g. `  1. Heat (1995) ★ 7.9`.
pub fn format_movie_line(rank: usize, movie: &Movie) -> String {
    let year = movie
        .year()
        .map_or_else(|| "N/A".to_string(), |year| year.to_string());
    let rating = movie
        .rating()
        .map_or_else(|| "N/A".to_string(), |rating| format!("{rating:.1}"));
    format!("{rank:>3}. {} ({year}) ★ {rating}", movie.title)
}

pub fn format_trending_line(rank: usize, record: &SearchRecord) -> String {
    let noun = if record.count == 1 { "search" } else { "searches" };
    format!(
        "{rank:>3}. {} ({} {noun}, last {})",
        record.search_term,
        record.count,
        record.last_searched_at.format("%Y-%m-%d %H:%M")
    )
}
