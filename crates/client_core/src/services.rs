use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use storage::{ObjectListing, ObjectStore, S3ObjectStore};
use tracing::{debug, info};

use crate::{
    config::AppConfig,
    controller::{BackendCommand, UiError, UiErrorContext, UiEvent},
    session::{build_identity_provider, SessionResolver},
    task_client::{TaskClient, TaskSubmitter},
};

/// Remote collaborators the backend worker executes commands against.
#[derive(Clone)]
pub struct Services {
    session: SessionResolver,
    listing: ObjectListing,
    tasks: Arc<dyn TaskSubmitter>,
    presign_ttl: Duration,
}

impl Services {
    pub fn new(
        session: SessionResolver,
        listing: ObjectListing,
        tasks: Arc<dyn TaskSubmitter>,
        presign_ttl: Duration,
    ) -> Self {
        Self {
            session,
            listing,
            tasks,
            presign_ttl,
        }
    }

    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("failed to build HTTP client")?;
        let identity = build_identity_provider(config, http)?;
        let store = S3ObjectStore::connect(&config.storage).await;
        let tasks = TaskClient::new(config.task_endpoint.clone(), config.request_timeout)?;
        info!(endpoint = %config.task_endpoint, bucket = store.bucket(), "services ready");

        Ok(Self::new(
            SessionResolver::new(identity),
            ObjectListing::new(Arc::new(store)),
            Arc::new(tasks),
            config.presign_ttl,
        ))
    }

    fn store(&self) -> &Arc<dyn ObjectStore> {
        self.listing.store()
    }

    /// Runs one command to completion. Never fails: every outcome is an event.
    pub async fn execute(&self, command: BackendCommand) -> UiEvent {
        debug!(command = command.name(), "executing backend command");
        match command {
            BackendCommand::CheckSession { generation } => UiEvent::SessionChecked {
                generation,
                status: self.session.check_session().await,
            },
            BackendCommand::SignOut => match self.session.sign_out().await {
                Ok(()) => UiEvent::SignedOut,
                Err(err) => UiEvent::Error(UiError::from_message(
                    UiErrorContext::Session,
                    format!("sign-out failed: {err:#}"),
                )),
            },
            BackendCommand::ListFiles {
                purpose,
                prefix,
                delay,
            } => {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                let files = self.listing.list(&prefix).await;
                UiEvent::FilesListed {
                    purpose,
                    prefix,
                    files,
                }
            }
            BackendCommand::Upload {
                purpose,
                local_path,
                key,
                content_type,
            } => {
                let uploaded = async {
                    let body = tokio::fs::read(&local_path)
                        .await
                        .with_context(|| format!("failed to read {}", local_path.display()))?;
                    self.store().upload(&key, body, Some(content_type)).await
                }
                .await;
                match uploaded {
                    Ok(key) => UiEvent::Uploaded { purpose, key },
                    Err(err) => UiEvent::UploadFailed {
                        purpose,
                        reason: format!("{err:#}"),
                    },
                }
            }
            BackendCommand::DeleteFile { purpose, key } => match self.store().remove(&key).await {
                Ok(()) => UiEvent::FileDeleted { purpose, key },
                Err(err) => UiEvent::DeleteFailed {
                    key,
                    reason: format!("{err:#}"),
                },
            },
            BackendCommand::PresignDownload { key } => {
                match self.store().presign_download(&key, self.presign_ttl).await {
                    Ok(url) => UiEvent::DownloadReady { key, url },
                    Err(err) => UiEvent::DownloadFailed {
                        key,
                        reason: format!("{err:#}"),
                    },
                }
            }
            BackendCommand::SubmitTask { request } => {
                let outcome = self.tasks.submit(&request).await;
                UiEvent::TaskCompleted { request, outcome }
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/services_tests.rs"]
mod tests;
