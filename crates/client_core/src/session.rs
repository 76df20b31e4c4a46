use std::{collections::HashMap, sync::Arc};

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{Deserialize, Serialize};
use shared::domain::NamespaceId;
use tokio::sync::Mutex;
use tracing::{info, warn};
use url::Url;

use crate::config::AppConfig;

const GET_ID_TARGET: &str = "AWSCognitoIdentityService.GetId";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// An established identity and the storage namespace derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub namespace_id: NamespaceId,
    /// Login token the identity was resolved with; `None` for guest access.
    pub token: Option<String>,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn get_session(&self, force_refresh: bool) -> Result<Session>;
    async fn sign_out(&self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Authenticated { namespace_id: NamespaceId },
    Unauthenticated,
}

impl SessionStatus {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    pub fn namespace_id(&self) -> Option<&NamespaceId> {
        match self {
            Self::Authenticated { namespace_id } => Some(namespace_id),
            Self::Unauthenticated => None,
        }
    }
}

/// Turns identity lookups into a session status; lookup failures are logged
/// and reported as `Unauthenticated`.
#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
}

impl SessionResolver {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn check_session(&self) -> SessionStatus {
        match self.provider.get_session(false).await {
            Ok(session) => {
                info!(namespace = %session.namespace_id, "session resolved");
                SessionStatus::Authenticated {
                    namespace_id: session.namespace_id,
                }
            }
            Err(err) => {
                warn!("session check failed: {err:#}");
                SessionStatus::Unauthenticated
            }
        }
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await
    }
}

/// Fixed identity id from configuration.
pub struct StaticIdentityProvider {
    identity_id: String,
    signed_out: Mutex<bool>,
}

impl StaticIdentityProvider {
    pub fn new(identity_id: impl Into<String>) -> Self {
        Self {
            identity_id: identity_id.into(),
            signed_out: Mutex::new(false),
        }
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn get_session(&self, _force_refresh: bool) -> Result<Session> {
        if *self.signed_out.lock().await {
            bail!("no active session: signed out");
        }
        Ok(Session {
            namespace_id: NamespaceId::new(self.identity_id.clone()),
            token: None,
        })
    }

    async fn sign_out(&self) -> Result<()> {
        *self.signed_out.lock().await = true;
        Ok(())
    }
}

#[derive(Serialize)]
struct GetIdRequest<'a> {
    #[serde(rename = "IdentityPoolId")]
    identity_pool_id: &'a str,
    #[serde(rename = "Logins", skip_serializing_if = "Option::is_none")]
    logins: Option<HashMap<&'a str, &'a str>>,
}

#[derive(Deserialize)]
struct GetIdResponse {
    #[serde(rename = "IdentityId")]
    identity_id: String,
}

#[derive(Deserialize)]
struct ServiceError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(alias = "Message", default)]
    message: String,
}

struct CognitoState {
    id_token: Option<String>,
    cached: Option<Session>,
    signed_out: bool,
}

/// Resolves identity ids through the Cognito Identity `GetId` action.
pub struct CognitoIdentityProvider {
    http: Client,
    endpoint: Url,
    identity_pool_id: String,
    logins_key: Option<String>,
    state: Mutex<CognitoState>,
}

impl CognitoIdentityProvider {
    pub fn new(
        http: Client,
        endpoint: Url,
        identity_pool_id: impl Into<String>,
        logins_key: Option<String>,
        id_token: Option<String>,
    ) -> Self {
        Self {
            http,
            endpoint,
            identity_pool_id: identity_pool_id.into(),
            logins_key,
            state: Mutex::new(CognitoState {
                id_token,
                cached: None,
                signed_out: false,
            }),
        }
    }

    async fn fetch_identity_id(&self, id_token: Option<&str>) -> Result<String> {
        let logins = match (&self.logins_key, id_token) {
            (Some(key), Some(token)) => Some([(key.as_str(), token)].into_iter().collect()),
            _ => None,
        };
        let body = serde_json::to_vec(&GetIdRequest {
            identity_pool_id: &self.identity_pool_id,
            logins,
        })
        .context("failed to encode GetId request")?;

        let response = self
            .http
            .post(self.endpoint.clone())
            .header("X-Amz-Target", GET_ID_TARGET)
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(body)
            .send()
            .await
            .context("identity service request failed")?;

        let status = response.status();
        let text = response
            .text()
            .await
            .context("failed to read identity service response")?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ServiceError>(&text)
                .map(|e| format!("{}: {}", e.kind, e.message))
                .unwrap_or(text);
            bail!("identity service returned {status}: {detail}");
        }

        let parsed: GetIdResponse =
            serde_json::from_str(&text).context("malformed GetId response")?;
        if parsed.identity_id.trim().is_empty() {
            return Err(anyhow!("identity service returned an empty IdentityId"));
        }
        Ok(parsed.identity_id)
    }
}

#[async_trait]
impl IdentityProvider for CognitoIdentityProvider {
    async fn get_session(&self, force_refresh: bool) -> Result<Session> {
        let mut state = self.state.lock().await;
        if state.signed_out {
            bail!("no active session: signed out");
        }
        if !force_refresh {
            if let Some(session) = &state.cached {
                return Ok(session.clone());
            }
        }

        let identity_id = self.fetch_identity_id(state.id_token.as_deref()).await?;
        let session = Session {
            namespace_id: NamespaceId::new(identity_id),
            token: state.id_token.clone(),
        };
        state.cached = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        state.cached = None;
        state.id_token = None;
        state.signed_out = true;
        info!("signed out");
        Ok(())
    }
}

pub fn build_identity_provider(
    config: &AppConfig,
    http: Client,
) -> Result<Arc<dyn IdentityProvider>> {
    let identity = &config.identity;
    if let Some(identity_id) = &identity.identity_id {
        info!(%identity_id, "using static identity");
        return Ok(Arc::new(StaticIdentityProvider::new(identity_id.clone())));
    }

    let pool_id = identity
        .identity_pool_id
        .clone()
        .context("identity_pool_id is required for the identity service")?;
    let logins_key = identity
        .user_pool_id
        .as_ref()
        .map(|user_pool| format!("cognito-idp.{}.amazonaws.com/{user_pool}", config.region));
    Ok(Arc::new(CognitoIdentityProvider::new(
        http,
        identity.cognito_endpoint.clone(),
        pool_id,
        logins_key,
        identity.id_token.clone(),
    )))
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
