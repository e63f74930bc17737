//! Authenticated store backend.
//!
//! Speaks JSON to a store gateway. The session token is obtained once in
//! [`StoreClient::connect`] and reused for every request of the run.

use std::fmt;
use std::path::Path;

use apkfetch_schema::{ArtifactCandidate, PackageId};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{Backend, BackendError, BackendKind, candidate_file_name};
use crate::config::{ConfigError, require};
use crate::io::download::{download_to_file, is_busy_status};

/// The four secrets a store session needs.
#[derive(Clone)]
pub struct StoreCredentials {
    pub email: String,
    pub password: String,
    pub gsf_id: String,
    pub auth_token: String,
}

impl StoreCredentials {
    pub const KEYS: [&'static str; 4] = [
        "APKFETCH_STORE_EMAIL",
        "APKFETCH_STORE_PASSWORD",
        "APKFETCH_STORE_GSF_ID",
        "APKFETCH_STORE_AUTH_TOKEN",
    ];

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let [email, password, gsf_id, auth_token] = require(Self::KEYS, lookup)?;
        Ok(Self {
            email,
            password,
            gsf_id,
            auth_token,
        })
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl fmt::Debug for StoreCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreCredentials")
            .field("email", &self.email)
            .field("gsf_id", &self.gsf_id)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    pub base_url: String,
    pub locale: String,
    pub timezone: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8600".to_string(),
            locale: "us_US".to_string(),
            timezone: "America/Chicago".to_string(),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
    gsf_id: &'a str,
    auth_token: &'a str,
    locale: &'a str,
    timezone: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct DetailsResponse {
    details: Option<Details>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Details {
    app_details: Option<AppDetails>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppDetails {
    version_code: Option<u64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryResponse {
    download_url: String,
    version_code: Option<u64>,
    sha256: Option<String>,
}

pub struct StoreClient {
    client: Client,
    settings: StoreSettings,
    token: String,
}

impl fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreClient")
            .field("base_url", &self.settings.base_url)
            .finish_non_exhaustive()
    }
}

impl StoreClient {
    /// Logs in and returns a client holding the session token.
    ///
    /// # Errors
    ///
    /// [`BackendError::Unauthorized`] when the gateway rejects the
    /// credentials; any other failure to reach the gateway is returned as is.
    pub async fn connect(
        credentials: &StoreCredentials,
        settings: StoreSettings,
    ) -> Result<Self, BackendError> {
        let client = Client::builder().user_agent(crate::USER_AGENT).build()?;
        let body = LoginRequest {
            email: &credentials.email,
            password: &credentials.password,
            gsf_id: &credentials.gsf_id,
            auth_token: &credentials.auth_token,
            locale: &settings.locale,
            timezone: &settings.timezone,
        };

        let url = format!("{}/auth/login", base(&settings));
        let response = client.post(url).json(&body).send().await?;
        let login: LoginResponse = match check_status(response).await {
            Ok(response) => response.json().await?,
            Err(BackendError::Forbidden { message, .. }) => {
                return Err(BackendError::Unauthorized(message));
            }
            Err(e) => return Err(e),
        };
        if login.token.is_empty() {
            return Err(BackendError::Unauthorized("empty session token".into()));
        }

        tracing::info!("Logged in to store gateway at {}", settings.base_url);
        Ok(Self {
            client,
            settings,
            token: login.token,
        })
    }

    fn get(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.settings.locale)
            .header("X-Timezone", &self.settings.timezone)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", base(&self.settings), path.trim_start_matches('/'))
    }
}

fn base(settings: &StoreSettings) -> &str {
    settings.base_url.trim_end_matches('/')
}

/// Maps a non-success response to the matching [`BackendError`], preferring
/// the gateway's `{error}` text as the message.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(|b| b.error)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendError::Forbidden {
            status: status.as_u16(),
            message,
        },
        s if is_busy_status(s) => BackendError::Busy {
            status: s.as_u16(),
            message,
        },
        s => BackendError::Status {
            status: s.as_u16(),
            message,
        },
    })
}

#[async_trait]
impl Backend for StoreClient {
    fn kind(&self) -> BackendKind {
        BackendKind::Store
    }

    async fn fetch_latest(&self, package: &PackageId) -> Result<Option<u64>, BackendError> {
        let response = self
            .get(&self.endpoint("details"))
            .query(&[("doc", package.as_str())])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let details: DetailsResponse = check_status(response).await?.json().await?;
        Ok(details
            .details
            .and_then(|d| d.app_details)
            .and_then(|a| a.version_code))
    }

    async fn fetch_artifact(
        &self,
        package: &PackageId,
        identifier: Option<u64>,
        staging: &Path,
    ) -> Result<ArtifactCandidate, BackendError> {
        let mut request = self
            .get(&self.endpoint("delivery"))
            .query(&[("doc", package.as_str())]);
        if let Some(vc) = identifier {
            request = request.query(&[("vc", vc)]);
        }

        let response = request.send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            if let Some(identifier) = identifier {
                return Err(BackendError::Unavailable {
                    package: package.clone(),
                    identifier,
                });
            }
        }
        let delivery: DeliveryResponse = check_status(response).await?.json().await?;

        // Relative download URLs point back at the gateway and need the session.
        let download = if delivery.download_url.starts_with("http://")
            || delivery.download_url.starts_with("https://")
        {
            self.client.get(&delivery.download_url)
        } else {
            self.get(&self.endpoint(&delivery.download_url))
        };

        let identifier = identifier.or(delivery.version_code);
        let path = staging.join(candidate_file_name(package, identifier));
        download_to_file(download, &path, delivery.sha256.as_deref()).await?;

        tracing::debug!("Fetched {} ({:?}) from store", package, identifier);
        Ok(ArtifactCandidate { identifier, path })
    }
}
