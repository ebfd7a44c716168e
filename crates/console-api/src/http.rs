use crate::envelope::parse_error_body;
use crate::error::{AuthFailure, TransportError};
use anyhow::Context;
use console_core::credential::CredentialStore;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const API_PREFIX: [&str; 2] = ["api", "admin"];
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn with_method(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// A response the transport did not claim: status and body, untouched.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// HTTP transport for the admin API. Attaches the stored bearer token and
/// turns credential rejections into [`TransportError::AuthExpired`] after
/// clearing the store. Nothing is retried.
#[derive(Clone)]
pub struct AuthTransport {
    client: Client,
    base_url: Url,
    credentials: CredentialStore,
}

impl AuthTransport {
    pub fn new(server_url: &str, credentials: CredentialStore) -> anyhow::Result<Self> {
        let base_url = Url::parse(server_url)
            .with_context(|| format!("parse server url {server_url}"))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("server url {server_url} cannot be used as a base");
        }
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Sends `options` to `/api/admin/<segments>`. Segments are encoded
    /// individually, so a code containing `/` stays one segment.
    pub async fn request(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        let response = self.send(segments, options).await?;
        if let Some(reason) = auth_failure(response.status, &response.body) {
            self.credentials.clear();
            warn!(
                status = response.status.as_u16(),
                reason = %reason,
                path = %segments.join("/"),
                "Credential rejected; session cleared"
            );
            return Err(TransportError::AuthExpired(reason));
        }
        Ok(response)
    }

    /// Same as [`request`](Self::request) but leaves 400/401 to the caller.
    /// Used for login, where a 401 means bad credentials.
    pub async fn request_unchecked(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        self.send(segments, options).await
    }

    async fn send(
        &self,
        segments: &[&str],
        options: RequestOptions,
    ) -> Result<RawResponse, TransportError> {
        let url = self.endpoint(segments, &options.query)?;
        let headers = self.headers(options.headers);
        let mut builder = self
            .client
            .request(options.method.clone(), url.clone())
            .headers(headers);
        if let Some(body) = options.body {
            builder = builder.json(&body);
        }
        debug!(method = %options.method, url = %url, "Sending admin request");
        let response = builder.send().await.map_err(TransportError::Network)?;
        let status = response.status();
        let body = response.text().await.map_err(TransportError::Network)?;
        debug!(status = status.as_u16(), url = %url, "Admin response received");
        Ok(RawResponse { status, body })
    }

    fn endpoint(&self, segments: &[&str], query: &[(String, String)]) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| TransportError::InvalidPath {
                    path: segments.join("/"),
                    reason: "base url cannot hold a path".to_string(),
                })?;
            path.pop_if_empty();
            path.extend(API_PREFIX);
            path.extend(segments);
        }
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    fn headers(&self, extra: HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(extra);
        if let Some(bearer) = self.credentials.read().bearer() {
            match HeaderValue::from_str(&bearer) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(err) => warn!(error = %err, "Stored token is not a valid header value"),
            }
        }
        headers
    }
}

/// 401 always means the session is gone. A 400 counts only when the server
/// blames the Authorization header.
pub(crate) fn auth_failure(status: StatusCode, body: &str) -> Option<AuthFailure> {
    if status == StatusCode::UNAUTHORIZED {
        return Some(AuthFailure::Unauthorized);
    }
    if status != StatusCode::BAD_REQUEST {
        return None;
    }
    let error = parse_error_body(body)?;
    match error.code()? {
        "INVALID_TOKEN_FORMAT" => Some(AuthFailure::InvalidTokenFormat),
        "VALIDATION_ERROR"
            if error
                .message()
                .to_ascii_lowercase()
                .contains("authorization") =>
        {
            Some(AuthFailure::InvalidTokenFormat)
        }
        _ => None,
    }
}
