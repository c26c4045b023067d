//! Per-view state models
//!
//! Each view owns its UI state and a busy flag. A request goes through
//! `begin_*` (which refuses to start while busy and hands out what to send),
//! the actual call, then `finish_*` with the result. The GUI runs the call on
//! a worker thread between the two; the CLI and tests use the synchronous
//! helpers that do all three.

mod edit;
mod records;
mod search;
mod upload;

pub use edit::{EditForm, EditView, TIMESTAMP_FORMAT};
pub use records::{fetch_after_exit, RecordsView, DELETE_CONFIRMATION, EMPTY_LIST_MESSAGE};
pub use search::SearchView;
pub use upload::{UploadOutcome, UploadView};

use std::time::Duration;

/// Screens of the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Upload,
    Records,
    Search,
    Edit(String),
}

/// Navigation requested by a view once an action completes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Route,
    pub after: Duration,
}
