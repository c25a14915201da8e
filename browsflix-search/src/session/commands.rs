//! Messages processed by the search session event loop.

use tokio::sync::oneshot;

use crate::types::ApiOutcome;

/// Commands sent from a handle to the session loop.
#[derive(Debug)]
pub enum SessionCommand {
    /// Raw input changed
    UpdateQuery { raw: String },
    /// Re-issue the current debounced query
    Refresh,
    /// Stop the loop; responds once the loop has let go of its state
    Shutdown { responder: oneshot::Sender<()> },
}

/// Identifies which fetch an outcome belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchTicket {
    pub generation: u64,
    pub query: String,
}

/// Outcome of a fetch, delivered back to the loop that issued it.
#[derive(Debug)]
pub(crate) struct FetchCompletion {
    pub ticket: FetchTicket,
    pub outcome: ApiOutcome,
}
