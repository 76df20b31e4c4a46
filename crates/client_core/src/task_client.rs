use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::TaskFailure,
    protocol::{TaskRequest, TaskResponse},
};
use tracing::{debug, info, info_span, warn, Instrument};
use url::Url;
use uuid::Uuid;

#[async_trait]
pub trait TaskSubmitter: Send + Sync {
    /// Sends one task and returns the normalized response. A response with
    /// `success == false` is still `Ok`; callers interpret it per task.
    async fn submit(&self, request: &TaskRequest) -> Result<TaskResponse, TaskFailure>;
}

/// Client for the single multiplexed task endpoint.
#[derive(Clone)]
pub struct TaskClient {
    http: Client,
    endpoint: Url,
}

impl TaskClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build task HTTP client")?;
        Ok(Self { http, endpoint })
    }

    async fn post(&self, request: &TaskRequest) -> Result<TaskResponse, TaskFailure> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(|err| TaskFailure::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| TaskFailure::Transport(err.to_string()))?;

        let raw: serde_json::Value = serde_json::from_str(&body).map_err(|err| {
            TaskFailure::Transport(format!("non-JSON response ({status}): {err}"))
        })?;
        let normalized = TaskResponse::from_raw(raw)?;

        if !status.is_success() {
            // A non-2xx status is only a logical failure when the body says so.
            return match normalized.error {
                Some(message) if !normalized.success => Err(TaskFailure::Rejected(message)),
                _ => Err(TaskFailure::Transport(format!(
                    "task endpoint returned {status}"
                ))),
            };
        }
        Ok(normalized)
    }
}

#[async_trait]
impl TaskSubmitter for TaskClient {
    async fn submit(&self, request: &TaskRequest) -> Result<TaskResponse, TaskFailure> {
        let task = request.tag();
        let span = info_span!("task", task = %task, request_id = %Uuid::new_v4());
        async move {
            info!("submitting task");
            match self.post(request).await {
                Ok(response) => {
                    debug!(success = response.success, "task response normalized");
                    Ok(response)
                }
                Err(err) => {
                    warn!("task failed: {err}");
                    Err(err)
                }
            }
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
#[path = "tests/task_client_tests.rs"]
mod tests;
