use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use storage::S3Settings;
use thiserror::Error;
use url::Url;

const ENV_PREFIX: &str = "EDUCLOUD__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("required setting `{0}` is not set")]
    Missing(&'static str),
    #[error("setting `{key}` is not a valid URL ('{value}'): {source}")]
    InvalidUrl {
        key: &'static str,
        value: String,
        source: url::ParseError,
    },
    #[error("setting `{key}` must be a non-negative integer, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },
    #[error("either `identity_id` or `identity_pool_id` must be configured")]
    MissingIdentity,
    #[error("`s3_access_key_id` and `s3_secret_access_key` must be set together")]
    PartialCredentials,
}

#[derive(Debug, Clone)]
pub struct IdentitySettings {
    pub identity_pool_id: Option<String>,
    pub user_pool_id: Option<String>,
    /// Id token from an external sign-in; absent means guest access.
    pub id_token: Option<String>,
    /// Fixed identity id, bypassing the identity service.
    pub identity_id: Option<String>,
    pub cognito_endpoint: Url,
}

/// Process-wide settings, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub region: String,
    pub identity: IdentitySettings,
    pub storage: S3Settings,
    pub task_endpoint: Url,
    pub request_timeout: Duration,
    pub upload_refresh_delay: Duration,
    pub presign_ttl: Duration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    region: Option<String>,
    identity_pool_id: Option<String>,
    user_pool_id: Option<String>,
    identity_id: Option<String>,
    cognito_endpoint: Option<String>,
    bucket: Option<String>,
    s3_endpoint: Option<String>,
    s3_access_key_id: Option<String>,
    s3_secret_access_key: Option<String>,
    task_endpoint: Option<String>,
    request_timeout_secs: Option<u64>,
    upload_refresh_delay_ms: Option<u64>,
    presign_ttl_secs: Option<u64>,
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("educloud").join("config.toml"))
}

/// Defaults, then the TOML file, then `EDUCLOUD__*` environment variables.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let file = match path {
        Some(path) => read_file_config(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => read_file_config(&path)?,
            None => FileConfig::default(),
        },
    };
    resolve(file, |key| std::env::var(key).ok())
}

fn read_file_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn resolve(
    file: FileConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<AppConfig, ConfigError> {
    let setting = |key: &'static str, from_file: Option<String>| -> Option<String> {
        env(&format!("{ENV_PREFIX}{}", key.to_ascii_uppercase()))
            .or(from_file)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let number = |key: &'static str, from_file: Option<u64>| -> Result<Option<u64>, ConfigError> {
        match env(&format!("{ENV_PREFIX}{}", key.to_ascii_uppercase())) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
            None => Ok(from_file),
        }
    };

    let region = setting("region", file.region).unwrap_or_else(|| "us-east-1".to_string());

    let identity_pool_id = setting("identity_pool_id", file.identity_pool_id);
    let identity_id = setting("identity_id", file.identity_id);
    if identity_pool_id.is_none() && identity_id.is_none() {
        return Err(ConfigError::MissingIdentity);
    }
    let cognito_endpoint = match setting("cognito_endpoint", file.cognito_endpoint) {
        Some(value) => parse_url("cognito_endpoint", value)?,
        None => parse_url(
            "cognito_endpoint",
            format!("https://cognito-identity.{region}.amazonaws.com/"),
        )?,
    };

    let bucket = setting("bucket", file.bucket).ok_or(ConfigError::Missing("bucket"))?;
    let task_endpoint = setting("task_endpoint", file.task_endpoint)
        .ok_or(ConfigError::Missing("task_endpoint"))
        .and_then(|value| parse_url("task_endpoint", value))?;

    let access_key_id = setting("s3_access_key_id", file.s3_access_key_id);
    let secret_access_key = setting("s3_secret_access_key", file.s3_secret_access_key);
    if access_key_id.is_some() != secret_access_key.is_some() {
        return Err(ConfigError::PartialCredentials);
    }

    let request_timeout =
        number("request_timeout_secs", file.request_timeout_secs)?.unwrap_or(60);
    let upload_refresh_delay =
        number("upload_refresh_delay_ms", file.upload_refresh_delay_ms)?.unwrap_or(500);
    let presign_ttl = number("presign_ttl_secs", file.presign_ttl_secs)?.unwrap_or(900);

    Ok(AppConfig {
        identity: IdentitySettings {
            identity_pool_id,
            user_pool_id: setting("user_pool_id", file.user_pool_id),
            id_token: setting("id_token", None),
            identity_id,
            cognito_endpoint,
        },
        storage: S3Settings {
            bucket,
            region: region.clone(),
            endpoint: setting("s3_endpoint", file.s3_endpoint),
            access_key_id,
            secret_access_key,
        },
        region,
        task_endpoint,
        request_timeout: Duration::from_secs(request_timeout),
        upload_refresh_delay: Duration::from_millis(upload_refresh_delay),
        presign_ttl: Duration::from_secs(presign_ttl),
    })
}

fn parse_url(key: &'static str, value: String) -> Result<Url, ConfigError> {
    Url::parse(&value).map_err(|source| ConfigError::InvalidUrl { key, value, source })
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
