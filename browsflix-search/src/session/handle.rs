//! Handle for communicating with a search session.

use tokio::sync::{mpsc, oneshot, watch};

use super::commands::SessionCommand;
use super::state::SessionState;
use crate::errors::SessionError;

/// Handle for communicating with a search session.
///
/// Cloneable; every clone drives the same session. State is observed through
/// published snapshots, never by reaching into the session.
#[derive(Debug, Clone)]
pub struct SearchSessionHandle {
    sender: mpsc::Sender<SessionCommand>,
    state: watch::Receiver<SessionState>,
}

impl SearchSessionHandle {
    pub(crate) fn new(
        sender: mpsc::Sender<SessionCommand>,
        state: watch::Receiver<SessionState>,
    ) -> Self {
        Self { sender, state }
    }

    /// Reports a raw input change.
    ///
    /// The query is fetched once it has been stable for the debounce interval.
    ///
    /// # Errors
    ///
    /// - `SessionError::Shutdown` - Session loop is no longer running
    pub async fn update_query(&self, raw: impl Into<String>) -> Result<(), SessionError> {
        self.send(SessionCommand::UpdateQuery { raw: raw.into() })
            .await
    }

    /// Fetches the current debounced query again.
    ///
    /// # Errors
    ///
    /// - `SessionError::Shutdown` - Session loop is no longer running
    pub async fn refresh(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Refresh).await
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Waits for the first state satisfying `predicate`, current one included.
    ///
    /// # Errors
    ///
    /// - `SessionError::Shutdown` - Session stopped before the predicate held
    pub async fn wait_for<F>(&self, predicate: F) -> Result<SessionState, SessionError>
    where
        F: FnMut(&SessionState) -> bool,
    {
        let mut state = self.state.clone();
        let matched = state
            .wait_for(predicate)
            .await
            .map(|matched| matched.clone())
            .map_err(|_| SessionError::Shutdown);
        matched
    }

    /// Waits until the fetch for `query` has settled.
    ///
    /// # Errors
    ///
    /// - `SessionError::Shutdown` - Session stopped before the fetch settled
    pub async fn settled_for(&self, query: &str) -> Result<SessionState, SessionError> {
        self.wait_for(|state| state.is_settled_for(query)).await
    }

    /// Stops the session. Pending debounced input is discarded; in-flight
    /// usage recordings are awaited briefly.
    ///
    /// # Errors
    ///
    /// - `SessionError::Shutdown` - Session loop had already stopped
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        let (responder, rx) = oneshot::channel();
        self.send(SessionCommand::Shutdown { responder }).await?;
        rx.await.map_err(|_| SessionError::Shutdown)
    }

    pub fn is_running(&self) -> bool {
        !self.sender.is_closed()
    }

    async fn send(&self, command: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| SessionError::Shutdown)
    }
}
