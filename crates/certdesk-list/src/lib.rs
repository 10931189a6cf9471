//! Certificate list controller for certdesk.
//!
//! Reconciles a remotely paginated certificate collection with local view
//! state: page accumulation, search/filter/sort, bulk selection, and
//! mutations that update optimistically or resync as each requires.

pub mod accumulator;
pub mod busy;
pub mod config;
pub mod controller;
pub mod error;
pub mod notification;
mod orchestrator;
pub mod selection;
pub mod view;

pub use accumulator::{accumulate, Accumulator};
pub use busy::Activity;
pub use config::ListConfig;
pub use controller::{ExportProgress, ListController, StatusCounts};
pub use error::ListError;
pub use notification::{
    BatchCounts, BulkMutationResult, MutationResult, Notification, NotificationKind,
};
pub use selection::Selection;
pub use view::{derive_view, sort_view};
