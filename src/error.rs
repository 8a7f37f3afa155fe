//! The error taxonomy of a sync run.
//!
//! Errors split into two families: fatal errors ([`FeedError`], [`SyncError`]) abort the whole run
//! before any further side effect, while per-event errors ([`ImportError`]) are isolated by the
//! orchestrator so that one bad event never blocks the import of the others.

/// A fatal problem with the calendar feed. No remote task is ever created, and the ledger is never
/// mutated, after one of these.
#[derive(thiserror::Error, Debug)]
pub enum FeedError {
    /// The feed could not be fetched (network/transport error, or a non-success HTTP status)
    #[error("feed is unreachable: {0}")]
    Unavailable(String),

    /// The payload could not be parsed as iCalendar data
    #[error("feed is not valid iCalendar data: {0}")]
    Format(String),
}

/// A failure to import one event. These never abort the run, except for `Auth`.
#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    /// A transient service error. The event stays out of the ledger and will be retried on the
    /// next run.
    #[error("transient failure: {0}")]
    Transient(String),

    /// The service rejected this event for good (e.g. invalid data). The event is recorded in the
    /// ledger anyway, so that the same doomed request is not re-submitted forever.
    #[error("permanent failure: {0}")]
    Permanent(String),

    /// The service rejected our credentials. There is no point attempting the remaining events,
    /// so the orchestrator escalates this to a fatal [`SyncError::Auth`].
    #[error("authentication rejected by the task service: {0}")]
    Auth(String),
}

/// A fatal error that aborts a sync run.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    /// The ledger could not be read or persisted. Note that a *corrupt* ledger file is not fatal:
    /// it degrades to an empty ledger with a logged warning (see [`crate::Ledger::load`]).
    #[error("unable to access the import ledger: {0}")]
    Ledger(#[from] std::io::Error),

    #[error("authentication rejected by the task service: {0}")]
    Auth(String),
}

/// A problem with the configuration file.
#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("unable to read the configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration file: {0}")]
    Invalid(#[from] serde_json::Error),
}
