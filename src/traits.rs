use async_trait::async_trait;

use crate::error::{FeedError, ImportError};
use crate::importer::{TaskId, TaskRequest};

/// A source producing the raw calendar payload.
///
/// The production implementation is [`HttpFeed`](crate::client::HttpFeed); tests substitute mocks.
#[async_trait]
pub trait FeedSource {
    /// Fetch the current calendar payload.
    /// This may be a long (network) operation, and it may fail e.g. when the feed server is down.
    async fn fetch(&self) -> Result<String, FeedError>;
}

/// A sink accepting task-creation requests, usually a remote task service.
///
/// The production implementation is [`TodoistSink`](crate::client::TodoistSink); tests substitute mocks.
#[async_trait]
pub trait TaskSink {
    /// Create one remote task and return its identifier.
    ///
    /// Implementations perform no retries themselves; retry policy belongs to the caller, which
    /// relies on the [`ImportError`] variant to distinguish retryable failures from permanent ones.
    async fn create_task(&self, request: &TaskRequest) -> Result<TaskId, ImportError>;
}
