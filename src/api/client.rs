use super::{ApiError, Envelope};
use crate::config::AppConfig;
use crate::session::{Session, SessionRecord, SessionStorage, SessionStore};
use reqwest::{Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Default request timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the user.
const MAX_ERROR_CHARS: usize = 200;

const LOGIN_PATH: &str = "/auth/login";

/// Email and password for the login call. The password is never logged.
#[derive(Debug)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::from(password.into()),
        }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// # Errors
    /// Returns [`ApiError::Config`] for an unusable base URL or HTTP client.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|err| ApiError::Config(format!("Invalid API base URL: {err}")))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "API base URL must be http(s): {base_url}"
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { http, base_url })
    }

    /// # Errors
    /// Returns [`ApiError::Config`] for an unusable configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchanges credentials for a session record. The record is not
    /// validated here; hand it to [`SessionStore::login`].
    ///
    /// # Errors
    /// Returns an error on transport failures, HTTP errors or a rejected
    /// envelope.
    pub async fn login(&self, credentials: &Credentials) -> Result<SessionRecord, ApiError> {
        let request = LoginRequest {
            email: credentials.email.trim(),
            password: credentials.password.expose_secret(),
        };

        debug!(email = request.email, "requesting login");
        let response = self
            .http
            .post(build_url_with_base(self.base_url.as_str(), LOGIN_PATH))
            .json(&request)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_envelope_response(response).await
    }

    /// Logs in and establishes the session in `store`.
    ///
    /// # Errors
    /// Returns an error if the login call fails or the backend answers with an
    /// incomplete session; the store is untouched in both cases.
    pub async fn sign_in<S: SessionStorage>(
        &self,
        store: &SessionStore<S>,
        credentials: &Credentials,
    ) -> Result<Session, ApiError> {
        let record = self.login(credentials).await?;
        Ok(store.login(record)?)
    }

    /// GETs an envelope-wrapped resource with the current bearer token. A 401
    /// means the backend no longer accepts the credential, so the session is
    /// cleared before the error is returned.
    ///
    /// # Errors
    /// Returns [`ApiError::Unauthorized`] without a session or on 401, and the
    /// usual transport and decoding errors otherwise.
    pub async fn get_authed<T: DeserializeOwned, S: SessionStorage>(
        &self,
        path: &str,
        store: &SessionStore<S>,
    ) -> Result<T, ApiError> {
        let Some(session) = store.current() else {
            return Err(ApiError::Unauthorized);
        };

        let response = self
            .http
            .get(build_url_with_base(self.base_url.as_str(), path))
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(map_request_error)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(path, "credential rejected by backend; signing out");
            store.logout();
            return Err(ApiError::Unauthorized);
        }

        handle_envelope_response(response).await
    }
}

/// Builds a URL from an explicit base URL and the provided path.
fn build_url_with_base(base_url: &str, path: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let path = path.trim();

    if base.is_empty() {
        path.to_string()
    } else {
        format!("{}/{}", base, path.trim_start_matches('/'))
    }
}

fn map_request_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout("Request timed out. Please try again.".to_string())
    } else {
        ApiError::Network(format!("Unable to reach the server: {err}"))
    }
}

/// Decodes an envelope, surfacing HTTP errors with sanitized bodies. Error
/// responses that carry an envelope report its message instead of the raw body.
async fn handle_envelope_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.text().await.map_err(map_request_error)?;

    if !status.is_success() {
        let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.message)
            .unwrap_or(body);
        return Err(ApiError::Http {
            status: status.as_u16(),
            message: sanitize_body(&message),
        });
    }

    serde_json::from_str::<Envelope<T>>(&body)
        .map_err(|err| ApiError::Parse(format!("Failed to decode response: {err}")))?
        .into_result()
}

/// Sanitizes HTTP error bodies for user-facing messages by trimming and truncating.
fn sanitize_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
