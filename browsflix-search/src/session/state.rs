//! Observable state of a search session.

use browsflix_core::Movie;
use serde::Serialize;

use crate::types::ApiOutcome;

/// Shown when neither catalog target could be reached.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Failed to fetch movies. Please try again later.";

/// Where the session is in its fetch lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionPhase {
    /// Nothing requested yet
    #[default]
    Idle,
    /// A fetch for the current debounced query is outstanding
    Loading,
    /// Last fetch produced results (possibly none)
    Success,
    /// Last fetch ended in an API error or transport failure
    Failed,
}

/// Snapshot of a search session.
///
/// `error_message` empty means no error. Once a fetch settles, either
/// `results` or `error_message` carries the answer, never both.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    /// Latest raw input
    pub query: String,
    /// Latest stabilized input, the one fetches are issued for
    pub debounced_query: String,
    pub is_loading: bool,
    pub error_message: String,
    pub results: Vec<Movie>,
    pub phase: SessionPhase,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Error to display, if any.
    pub fn error(&self) -> Option<&str> {
        (!self.error_message.is_empty()).then_some(self.error_message.as_str())
    }

    /// True once the fetch for `query` has been applied.
    pub fn is_settled_for(&self, query: &str) -> bool {
        self.debounced_query == query
            && !self.is_loading
            && matches!(self.phase, SessionPhase::Success | SessionPhase::Failed)
    }

    /// Enters loading for a new stabilized query.
    ///
    /// Results from the previous fetch stay visible until the new outcome
    /// arrives.
    pub(crate) fn begin_loading(&mut self, debounced_query: &str) {
        debounced_query.clone_into(&mut self.debounced_query);
        self.error_message.clear();
        self.is_loading = true;
        self.phase = SessionPhase::Loading;
    }

    /// Applies the outcome of the current fetch.
    pub(crate) fn apply_outcome(&mut self, outcome: ApiOutcome) {
        self.is_loading = false;
        match outcome {
            ApiOutcome::Success(results) => {
                self.results = results;
                self.error_message.clear();
                self.phase = SessionPhase::Success;
            }
            ApiOutcome::ApiError(message) => {
                self.error_message = message;
                self.results.clear();
                self.phase = SessionPhase::Failed;
            }
            ApiOutcome::TransportFailure(_) => {
                TRANSPORT_FAILURE_MESSAGE.clone_into(&mut self.error_message);
                self.results.clear();
                self.phase = SessionPhase::Failed;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CatalogError;
    use crate::types::CatalogTarget;

    fn loaded(results: Vec<Movie>) -> SessionState {
        let mut state = SessionState::new();
        state.begin_loading("");
        state.apply_outcome(ApiOutcome::Success(results));
        state
    }

    #[test]
    fn test_loading_keeps_previous_results() {
        let mut state = loaded(vec![Movie::new(1, "Up")]);
        state.error_message = "stale".to_string();

        state.begin_loading("heat");

        assert!(state.is_loading);
        assert_eq!(state.phase, SessionPhase::Loading);
        assert_eq!(state.debounced_query, "heat");
        assert_eq!(state.error(), None);
        assert_eq!(state.results, vec![Movie::new(1, "Up")]);
        assert!(!state.is_settled_for("heat"));
    }

    #[test]
    fn test_api_error_clears_results() {
        let mut state = loaded(vec![Movie::new(1, "Up")]);
        state.begin_loading("qqqq");
        state.apply_outcome(ApiOutcome::ApiError("No results".to_string()));

        assert!(!state.is_loading);
        assert_eq!(state.phase, SessionPhase::Failed);
        assert_eq!(state.error(), Some("No results"));
        assert!(state.results.is_empty());
        assert!(state.is_settled_for("qqqq"));
    }

    #[test]
    fn test_transport_failure_shows_generic_message() {
        let mut state = loaded(vec![Movie::new(1, "Up")]);
        state.begin_loading("heat");
        state.apply_outcome(ApiOutcome::TransportFailure(CatalogError::HttpStatus {
            target: CatalogTarget::Fallback,
            status: 500,
        }));

        assert_eq!(
            state.error(),
            Some("Failed to fetch movies. Please try again later.")
        );
        assert!(state.results.is_empty());
    }

    #[test]
    fn test_success_clears_error() {
        let mut state = SessionState::new();
        state.begin_loading("x");
        state.apply_outcome(ApiOutcome::ApiError("nope".to_string()));
        state.begin_loading("y");
        state.apply_outcome(ApiOutcome::Success(vec![Movie::new(2, "Y")]));

        assert_eq!(state.error(), None);
        assert_eq!(state.phase, SessionPhase::Success);
        assert_eq!(state.results.len(), 1);
    }
}
