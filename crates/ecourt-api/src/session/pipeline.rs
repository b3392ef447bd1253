// Request pipeline
//
// Every outbound call goes through `RequestPipeline::send`:
//
//   PREPARING ─▶ SENT ─┬─▶ SUCCESS
//                      └─▶ AUTH_FAILED ─▶ REFRESHING ─▶ RETRIED ─┬─▶ SUCCESS
//                                                                 └─▶ FAILED
//
// `ApiRequest` is an immutable description of the call; each attempt
// builds a fresh `reqwest::Request` from it, so the retry is tracked by
// `send` itself rather than by a flag on a shared request object.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::session::manager::TokenManager;
use crate::session::{TOKEN_PATH, endpoint_url, preview};

/// A backend call, independent of any single attempt at sending it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body.
    pub fn json(mut self, body: &impl Serialize) -> Result<Self, Error> {
        let value = serde_json::to_value(body).map_err(|e| Error::Deserialization {
            message: format!("failed to encode request body: {e}"),
            body: String::new(),
        })?;
        self.body = Some(value);
        Ok(self)
    }

    /// Append a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Whether this call is the credential issuance itself, which must
    /// never carry a (possibly stale) credential.
    pub fn targets_issuance(&self) -> bool {
        self.path == TOKEN_PATH
    }
}

/// Authenticated transport for every backend call.
#[derive(Debug, Clone)]
pub struct RequestPipeline {
    http: reqwest::Client,
    base_url: Url,
    tokens: Arc<TokenManager>,
}

impl RequestPipeline {
    pub fn new(http: reqwest::Client, base_url: Url, tokens: Arc<TokenManager>) -> Self {
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The token manager this pipeline authenticates with.
    pub fn tokens(&self) -> &Arc<TokenManager> {
        &self.tokens
    }

    /// The underlying HTTP client (for calls that bypass authentication).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Send `request` with the current credential.
    ///
    /// A 401 triggers one refresh of the refused credential and one
    /// resend. A second 401 becomes `Error::AuthorizationExpired`; a
    /// failed refresh surfaces as its `Error::Issuance`. Every other
    /// status is returned as-is.
    pub async fn send(&self, request: &ApiRequest) -> Result<reqwest::Response, Error> {
        if request.targets_issuance() {
            return self.dispatch(request, None, 1).await;
        }

        let token = self.tokens.get_valid().await?;
        let resp = self.dispatch(request, Some(&token), 1).await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!(path = request.path(), "credential refused, refreshing and retrying once");
        let token = self.tokens.refresh_rejected(&token).await?;
        let resp = self.dispatch(request, Some(&token), 2).await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::AuthorizationExpired {
                message: format!(
                    "{} refused a freshly issued credential: {}",
                    request.path(),
                    preview(&body)
                ),
            });
        }
        Ok(resp)
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&SecretString>,
        attempt: u8,
    ) -> Result<reqwest::Response, Error> {
        let url = endpoint_url(&self.base_url, request.path())?;
        debug!(attempt, "{} {}", request.method, url);

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }
        if let Some(token) = token {
            builder = builder.bearer_auth(token.expose_secret());
        }

        Ok(builder.send().await?)
    }
}
