//! Dealboard HTTP client adapter.
//!
//! Implements the [`board::ApiClient`] trait over HTTP with `reqwest`, and
//! carries the login handshake that produces the token for later requests.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** URL construction, header injection, status mapping,
//! and body parsing all live here. The [`board`] crate sees only
//! [`board::ApiClient`].
//!
//! ## Header contract
//!
//! Every request carries `Content-Type: application/json`. `X-API-Key` is
//! added only when the [`board::AuthContext`] holds a token; requests are
//! never blocked locally, authorization is left to the server.
//!
//! No retries, no re-authentication, and no timeout beyond reqwest's default.

use async_trait::async_trait;
use board::{ApiClient, ApiFailure, ApiPath, ApiToken, AuthContext, LoginRequest, LoginResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Header carrying the bearer token.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Errors raised while constructing an [`HttpApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The base URL is not an absolute http(s) URL.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The token contains bytes that cannot appear in an HTTP header.
    #[error("API token is not a valid header value")]
    InvalidToken,

    /// The underlying reqwest client could not be built.
    #[error("HTTP client construction failed: {0}")]
    Build(#[from] reqwest::Error),
}

/// `reqwest`-backed implementation of [`ApiClient`].
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    http: reqwest::Client,
    headers: HeaderMap,
}

impl HttpApiClient {
    /// Creates a client rooted at `base_url` that authenticates with `auth`.
    pub fn new(base_url: &str, auth: AuthContext) -> Result<Self, ClientError> {
        let parsed = Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let headers = default_headers(&auth)?;
        let http = reqwest::Client::builder().build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            headers,
        })
    }

    /// The base URL every path is appended to (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for `path`.
    pub fn url_for(&self, path: &ApiPath) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds, without sending, the request for `path`.
    ///
    /// Exposed so the header contract can be checked without a server.
    pub fn build_request(
        &self,
        method: Method,
        path: &ApiPath,
        body: Option<&Value>,
    ) -> Result<reqwest::Request, ApiFailure> {
        let mut builder = self
            .http
            .request(method, self.url_for(path))
            .headers(self.headers.clone());
        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }
        builder.build().map_err(transport_failure)
    }

    /// Runs the login handshake and returns the issued token.
    ///
    /// The handshake is a GET on `/auth/webhook` with the user's identity as
    /// query parameters. It is sent with whatever auth context this client
    /// was built with; callers normally use an anonymous client.
    #[instrument(skip_all, fields(account_id = %login.account_id, user_id = %login.user_id))]
    pub async fn login(&self, login: &LoginRequest) -> Result<ApiToken, ApiFailure> {
        let request = self
            .http
            .get(self.url_for(&ApiPath::login()))
            .headers(self.headers.clone())
            .query(login)
            .build()
            .map_err(transport_failure)?;
        let body = self.execute(request).await?;
        let response: LoginResponse = serde_json::from_value(body)?;
        debug!("login handshake succeeded");
        Ok(response.token)
    }

    async fn execute(&self, request: reqwest::Request) -> Result<Value, ApiFailure> {
        let method = request.method().clone();
        let url = request.url().path().to_string();
        debug!(%method, path = %url, "sending request");

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(%method, path = %url, error = %e, "request did not complete");
            transport_failure(e)
        })?;

        check_status(response.status())?;

        let bytes = response.bytes().await.map_err(transport_failure)?;
        let body = serde_json::from_slice(&bytes)?;
        Ok(body)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    #[instrument(skip_all, fields(path = %path))]
    async fn get_json(&self, path: &ApiPath) -> Result<Value, ApiFailure> {
        let request = self.build_request(Method::GET, path, None)?;
        self.execute(request).await
    }

    #[instrument(skip_all, fields(path = %path))]
    async fn post_json(&self, path: &ApiPath, body: Value) -> Result<Value, ApiFailure> {
        let request = self.build_request(Method::POST, path, Some(&body))?;
        self.execute(request).await
    }
}

/// Maps a response status onto the success/failure split.
///
/// Any 2xx is success. Everything else is [`ApiFailure::HttpError`]; the body
/// is never read in that case.
pub fn check_status(status: StatusCode) -> Result<(), ApiFailure> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiFailure::HttpError {
            status: status.as_u16(),
        })
    }
}

fn default_headers(auth: &AuthContext) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(token) = auth.token() {
        let mut value =
            HeaderValue::from_str(token.as_str()).map_err(|_| ClientError::InvalidToken)?;
        value.set_sensitive(true);
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
    }
    Ok(headers)
}

fn transport_failure(err: reqwest::Error) -> ApiFailure {
    ApiFailure::TransportError {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(value: &str) -> AuthContext {
        AuthContext::with_token(ApiToken::new(value).unwrap())
    }

    #[test]
    fn token_header_is_sent_only_when_present() {
        let anonymous = HttpApiClient::new("http://localhost:5000", AuthContext::anonymous())
            .unwrap()
            .build_request(Method::GET, &ApiPath::pipelines(), None)
            .unwrap();
        assert_eq!(anonymous.headers()[CONTENT_TYPE], "application/json");
        assert!(anonymous.headers().get(API_KEY_HEADER).is_none());

        let authed = HttpApiClient::new("http://localhost:5000", token("abc"))
            .unwrap()
            .build_request(Method::GET, &ApiPath::pipelines(), None)
            .unwrap();
        assert_eq!(authed.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(authed.headers()[API_KEY_HEADER], "abc");
    }

    #[test]
    fn paths_append_to_base_url() {
        let client = HttpApiClient::new("https://crm.example.com/api/", token("abc")).unwrap();
        assert_eq!(client.base_url(), "https://crm.example.com/api");
        assert_eq!(
            client.url_for(&ApiPath::stages(board::PipelineId::new(4))),
            "https://crm.example.com/api/pipelines/4/stages"
        );
    }

    #[test]
    fn post_body_is_serialised_json() {
        let client = HttpApiClient::new("http://localhost:5000", token("abc")).unwrap();
        let body = json!({"name": "Sales"});
        let request = client
            .build_request(Method::POST, &ApiPath::pipelines(), Some(&body))
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        let sent = request.body().and_then(|b| b.as_bytes()).unwrap();
        assert_eq!(sent, br#"{"name":"Sales"}"#);
    }

    #[test]
    fn invalid_base_urls_are_rejected() {
        assert!(matches!(
            HttpApiClient::new("not a url", AuthContext::anonymous()),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpApiClient::new("ftp://example.com", AuthContext::anonymous()),
            Err(ClientError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn tokens_with_control_characters_are_rejected() {
        assert!(matches!(
            HttpApiClient::new("http://localhost", token("bad\ntoken")),
            Err(ClientError::InvalidToken)
        ));
    }

    #[test]
    fn only_success_statuses_pass() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::CREATED).is_ok());
        assert_eq!(
            check_status(StatusCode::INTERNAL_SERVER_ERROR),
            Err(ApiFailure::HttpError { status: 500 })
        );
        assert_eq!(
            check_status(StatusCode::FORBIDDEN),
            Err(ApiFailure::HttpError { status: 403 })
        );
    }
}
