//! Shared server state.

mod sessions;

pub use sessions::{AppState, Session, SessionSummary, COMMIT_SLOT};
