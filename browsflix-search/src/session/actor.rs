//! Event loop owning a search session's state.

use std::sync::Arc;
use std::time::Duration;

use browsflix_core::config::SessionConfig;
use browsflix_core::{Movie, UsageRecorder};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;

use super::commands::{FetchCompletion, FetchTicket, SessionCommand};
use super::debouncer::SearchDebouncer;
use super::handle::SearchSessionHandle;
use super::state::SessionState;
use crate::strategy::FetchStrategy;
use crate::types::ApiOutcome;

/// Upper bound on waiting for in-flight usage recordings at shutdown.
const RECORDING_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Spawns a search session and returns its handle.
///
/// The session immediately fetches the discover listing for the empty query,
/// then reacts to debounced query changes sent through the handle.
///
/// # Examples
/// ```rust,no_run
/// # #[tokio::main]
/// # async fn main() {
/// use std::sync::Arc;
///
/// use browsflix_core::{BrowsflixConfig, NoopUsageRecorder};
/// use browsflix_search::{FetchStrategy, spawn_search_session};
///
/// let config = BrowsflixConfig::default();
/// let strategy = FetchStrategy::from_config(&config.catalog).unwrap();
/// let session = spawn_search_session(strategy, Arc::new(NoopUsageRecorder), &config.session);
/// session.update_query("blade runner").await.unwrap();
/// # }
/// ```
pub fn spawn_search_session(
    strategy: FetchStrategy,
    recorder: Arc<dyn UsageRecorder>,
    config: &SessionConfig,
) -> SearchSessionHandle {
    let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));
    let (state_tx, state_rx) = watch::channel(SessionState::new());
    let (stabilized_tx, stabilized_rx) = mpsc::unbounded_channel();
    let (completion_tx, completion_rx) = mpsc::unbounded_channel();

    let session = SearchSession {
        state: SessionState::new(),
        generation: 0,
        strategy,
        recorder,
        debouncer: SearchDebouncer::new(config.debounce_interval, stabilized_tx),
        completions: completion_tx,
        published: state_tx,
        recordings: JoinSet::new(),
        shutdown_responder: None,
    };

    tokio::spawn(run_session_loop(
        session,
        command_rx,
        stabilized_rx,
        completion_rx,
    ));

    SearchSessionHandle::new(command_tx, state_rx)
}

/// Orchestrates debouncing, fetching and state updates for one session.
///
/// Every fetch is tagged with a generation; outcomes for anything but the
/// latest generation are dropped on arrival. Usage recordings run detached
/// from the state machine and are only awaited when the session stops.
struct SearchSession {
    state: SessionState,
    generation: u64,
    strategy: FetchStrategy,
    recorder: Arc<dyn UsageRecorder>,
    debouncer: SearchDebouncer,
    completions: mpsc::UnboundedSender<FetchCompletion>,
    published: watch::Sender<SessionState>,
    recordings: JoinSet<()>,
    shutdown_responder: Option<oneshot::Sender<()>>,
}

impl SearchSession {
    /// Processes a handle command. Returns false to stop the loop.
    fn process_command(&mut self, command: SessionCommand) -> bool {
        match command {
            SessionCommand::UpdateQuery { raw } => {
                self.state.query.clone_from(&raw);
                self.publish();
                self.debouncer.submit(raw);
            }
            SessionCommand::Refresh => {
                let query = self.state.debounced_query.clone();
                tracing::debug!(query, "Refreshing search");
                self.begin_fetch(query);
            }
            SessionCommand::Shutdown { responder } => {
                self.debouncer.cancel();
                self.shutdown_responder = Some(responder);
                return false;
            }
        }
        true
    }

    fn on_stabilized(&mut self, query: String) {
        if query == self.state.debounced_query {
            tracing::trace!(query, "Stabilized query unchanged");
            return;
        }
        self.begin_fetch(query);
    }

    fn begin_fetch(&mut self, query: String) {
        self.generation += 1;
        let ticket = FetchTicket {
            generation: self.generation,
            query,
        };

        self.state.begin_loading(&ticket.query);
        self.publish();

        tracing::debug!(
            generation = ticket.generation,
            query = ticket.query,
            "Fetching catalog"
        );

        let strategy = self.strategy.clone();
        let completions = self.completions.clone();
        tokio::spawn(async move {
            let outcome = strategy.resolve(&ticket.query).await;
            // Loop gone means the session ended; the outcome has no reader
            let _ = completions.send(FetchCompletion { ticket, outcome });
        });
    }

    fn on_fetch_completed(&mut self, completion: FetchCompletion) {
        let FetchCompletion { ticket, outcome } = completion;

        if ticket.generation != self.generation {
            tracing::debug!(
                generation = ticket.generation,
                current = self.generation,
                query = ticket.query,
                "Discarding stale catalog outcome"
            );
            return;
        }

        let top_result = match &outcome {
            ApiOutcome::Success(results) if !ticket.query.is_empty() => results.first().cloned(),
            ApiOutcome::Success(_) => None,
            ApiOutcome::ApiError(message) => {
                tracing::info!(query = ticket.query, message, "Catalog reported an error");
                None
            }
            ApiOutcome::TransportFailure(cause) => {
                tracing::error!(
                    query = ticket.query,
                    error = %cause,
                    "Both catalog targets failed"
                );
                None
            }
        };

        self.state.apply_outcome(outcome);
        self.publish();

        if let Some(movie) = top_result {
            self.record_usage(ticket.query, movie);
        }
    }

    /// Records the search in a detached task; failures are only logged.
    fn record_usage(&mut self, query: String, movie: Movie) {
        let recorder = Arc::clone(&self.recorder);
        self.recordings.spawn(async move {
            if let Err(e) = recorder.record_search(&query, &movie).await {
                tracing::warn!(query, movie_id = movie.id, error = %e, "Failed to record search");
            }
        });
    }

    async fn flush_recordings(&mut self) {
        let pending = self.recordings.len();
        if pending == 0 {
            return;
        }

        let drained = tokio::time::timeout(RECORDING_FLUSH_TIMEOUT, async {
            while self.recordings.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            tracing::warn!(pending, "Abandoning unfinished usage recordings");
            self.recordings.abort_all();
        }
    }

    fn publish(&self) {
        self.published.send_replace(self.state.clone());
    }
}

/// Runs the session loop until shutdown or until every handle is dropped.
async fn run_session_loop(
    mut session: SearchSession,
    mut commands: mpsc::Receiver<SessionCommand>,
    mut stabilized: mpsc::UnboundedReceiver<String>,
    mut completions: mpsc::UnboundedReceiver<FetchCompletion>,
) {
    tracing::debug!("Search session started");

    // Mounting behaves like a stabilized change to the empty query
    session.begin_fetch(String::new());

    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(command) => {
                    if !session.process_command(command) {
                        break;
                    }
                }
                None => break,
            },
            Some(query) = stabilized.recv() => session.on_stabilized(query),
            Some(completion) = completions.recv() => session.on_fetch_completed(completion),
            Some(_) = session.recordings.join_next(), if !session.recordings.is_empty() => {}
        }
    }

    session.debouncer.cancel();
    session.flush_recordings().await;
    // Handles must observe the closed channel once shutdown is acknowledged
    drop(commands);
    if let Some(responder) = session.shutdown_responder.take() {
        let _ = responder.send(());
    }
    tracing::debug!("Search session stopped");
}
