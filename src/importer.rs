//! Turns one eligible [`Event`] into one remote task

use chrono::NaiveDate;

use crate::error::ImportError;
use crate::traits::TaskSink;
use crate::Event;

/// The identifier of a task created on the remote service
pub type TaskId = String;

/// A task-creation request, as accepted by a [`TaskSink`]
#[derive(Clone, Debug, PartialEq)]
pub struct TaskRequest {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
}

/// Maps events to task-creation requests and submits them to a sink.
///
/// The importer is a pure request/response step: it performs no retries (retry policy belongs to
/// the [`Syncer`](crate::Syncer)) and never touches the import ledger.
#[derive(Debug, Default)]
pub struct TaskImporter {}

impl TaskImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the task-creation request for an event.
    ///
    /// When the event carries a link back to the source service, the title becomes a markdown
    /// link, so the created task points back at the original assignment. The due date falls back
    /// to the start date for feeds that only provide `DTSTART`.
    pub fn request_for(&self, event: &Event) -> TaskRequest {
        let title = match event.url() {
            Some(url) => format!("[{}]({})", event.title(), url),
            None => event.title().to_string(),
        };

        TaskRequest {
            title,
            description: event.description().to_string(),
            due_date: event.due_date().unwrap_or_else(|| event.start_date()),
        }
    }

    /// Submit one event to the sink. Returns the remote task identifier on success.
    pub async fn import<S: TaskSink + ?Sized>(
        &self,
        sink: &S,
        event: &Event,
    ) -> Result<TaskId, ImportError> {
        let request = self.request_for(event);
        sink.create_task(&request).await
    }
}
