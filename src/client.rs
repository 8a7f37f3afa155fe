//! Production implementations of the feed source and task sink seams
//!
//! [`HttpFeed`] fetches the calendar payload over HTTP(S), and [`TodoistSink`] creates tasks
//! through the Todoist REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use url::Url;

use crate::error::{FeedError, ImportError};
use crate::importer::{TaskId, TaskRequest};
use crate::traits::{FeedSource, TaskSink};

/// A feed source that fetches the calendar payload from an HTTP(S) URL
#[derive(Debug, Clone)]
pub struct HttpFeed {
    url: Url,
}

impl HttpFeed {
    /// Create a feed for the given URL.
    ///
    /// Calendar services commonly hand out `webcal://` URLs; those are rewritten to `https://`,
    /// which is what such servers actually speak.
    pub fn new(url: &str) -> Result<Self, url::ParseError> {
        let url = match url.strip_prefix("webcal://") {
            Some(rest) => Url::parse(&format!("https://{}", rest))?,
            None => Url::parse(url)?,
        };
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String, FeedError> {
        log::debug!("Fetching the calendar feed from {}", self.url);
        let response = reqwest::get(self.url.clone())
            .await
            .map_err(|err| FeedError::Unavailable(err.to_string()))?
            .error_for_status()
            .map_err(|err| FeedError::Unavailable(err.to_string()))?;

        response
            .text()
            .await
            .map_err(|err| FeedError::Unavailable(err.to_string()))
    }
}

static TODOIST_API_BASE: &str = "https://api.todoist.com/rest/v2";

/// Minimum delay between two requests to the task service. Todoist rate-limits aggressively, and
/// staying well below the limit also leaves room for the user's other Todoist clients.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct RemoteProject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedTask {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateTaskBody<'r> {
    content: &'r str,
    description: &'r str,
    due_date: String,
    project_id: &'r str,
    labels: &'r [String],
}

/// A task sink backed by the Todoist REST API.
///
/// Tasks are created in the configured project (created on the fly when it does not exist yet)
/// and tagged with the configured labels. The sink self-rate-limits; it performs no retries.
pub struct TodoistSink {
    http: reqwest::Client,
    api_token: String,
    project: String,
    labels: Vec<String>,

    /// Resolved lazily on the first task creation
    project_id: tokio::sync::Mutex<Option<String>>,
    last_request: tokio::sync::Mutex<Option<Instant>>,
}

impl TodoistSink {
    pub fn new(api_token: String, project: String, labels: Vec<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_token,
            project,
            labels,
            project_id: tokio::sync::Mutex::new(None),
            last_request: tokio::sync::Mutex::new(None),
        }
    }

    /// Sleep long enough to keep at least [`MIN_REQUEST_INTERVAL`] between requests
    async fn pace(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(last) = *last_request {
            let elapsed = last.elapsed();
            if elapsed < MIN_REQUEST_INTERVAL {
                tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }

    /// Map a response from the task service to our error taxonomy
    fn classify_status(status: StatusCode, context: &str) -> ImportError {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            ImportError::Auth(format!("{}: HTTP {}", context, status))
        } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            ImportError::Transient(format!("{}: HTTP {}", context, status))
        } else {
            ImportError::Permanent(format!("{}: HTTP {}", context, status))
        }
    }

    fn transport_error(err: reqwest::Error, context: &str) -> ImportError {
        ImportError::Transient(format!("{}: {}", context, err))
    }

    /// Return the identifier of the configured project, looking it up (and creating the project
    /// when it does not exist yet) on the first call
    async fn project_id(&self) -> Result<String, ImportError> {
        let mut cached = self.project_id.lock().await;
        if let Some(id) = cached.as_ref() {
            return Ok(id.clone());
        }

        self.pace().await;
        let response = self
            .http
            .get(format!("{}/projects", TODOIST_API_BASE))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "listing projects"))?;
        if response.status().is_success() == false {
            return Err(Self::classify_status(response.status(), "listing projects"));
        }
        let projects: Vec<RemoteProject> = response
            .json()
            .await
            .map_err(|err| Self::transport_error(err, "listing projects"))?;

        let id = match projects.into_iter().find(|p| p.name == self.project) {
            Some(project) => project.id,
            None => {
                log::info!("Project \"{}\" does not exist yet, creating it", self.project);
                self.create_project().await?
            }
        };

        *cached = Some(id.clone());
        Ok(id)
    }

    async fn create_project(&self) -> Result<String, ImportError> {
        self.pace().await;
        let response = self
            .http
            .post(format!("{}/projects", TODOIST_API_BASE))
            .bearer_auth(&self.api_token)
            .json(&serde_json::json!({ "name": self.project }))
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "creating the project"))?;
        if response.status().is_success() == false {
            return Err(Self::classify_status(response.status(), "creating the project"));
        }

        let project: RemoteProject = response
            .json()
            .await
            .map_err(|err| Self::transport_error(err, "creating the project"))?;
        Ok(project.id)
    }
}

#[async_trait]
impl TaskSink for TodoistSink {
    async fn create_task(&self, request: &TaskRequest) -> Result<TaskId, ImportError> {
        let project_id = self.project_id().await?;

        let body = CreateTaskBody {
            content: &request.title,
            description: &request.description,
            due_date: request.due_date.format("%Y-%m-%d").to_string(),
            project_id: &project_id,
            labels: &self.labels,
        };

        self.pace().await;
        let response = self
            .http
            .post(format!("{}/tasks", TODOIST_API_BASE))
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|err| Self::transport_error(err, "creating a task"))?;
        if response.status().is_success() == false {
            return Err(Self::classify_status(response.status(), "creating a task"));
        }

        let created: CreatedTask = response
            .json()
            .await
            .map_err(|err| Self::transport_error(err, "creating a task"))?;
        Ok(created.id)
    }
}
