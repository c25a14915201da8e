//! Search session: debounced input, ordered fetches, observable state.

mod actor;
mod commands;
pub mod debouncer;
mod handle;
pub mod state;

pub use actor::spawn_search_session;
pub use commands::SessionCommand;
pub use debouncer::SearchDebouncer;
pub use handle::SearchSessionHandle;
pub use state::{SessionPhase, SessionState, TRANSPORT_FAILURE_MESSAGE};
