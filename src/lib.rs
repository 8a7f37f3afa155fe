//! This crate imports assignments from a school calendar feed into a task service, at most once each.
//!
//! The calendar feed (e.g. the iCalendar export of a Schoology account) is parsed into [`Event`]s by the [`feed`] module. \
//! Events that are old enough to be stable in the feed are selected by the [`eligibility`] module, and a persisted [`Ledger`] remembers which events were already imported on previous runs.
//!
//! A [`Syncer`] drives one full pass (fetch → parse → filter → dedupe → import → persist) over a [`FeedSource`](traits::FeedSource) and a [`TaskSink`](traits::TaskSink). \
//! Default implementations of these two seams (an HTTP feed and a Todoist REST sink) live in the [`client`] module; tests can substitute mocks instead.

pub mod traits;

mod event;
pub use event::Event;
pub mod error;
pub use error::{FeedError, ImportError, SyncError};
pub mod feed;
pub mod eligibility;
pub mod ledger;
pub use ledger::Ledger;
pub mod importer;
pub use importer::{TaskId, TaskImporter, TaskRequest};
pub mod sync;
pub use sync::{RunOutcome, RunSummary, Syncer};

pub mod client;

pub mod settings;
