//! The `ApiClient` port and the resource paths it accepts.
//!
//! Infrastructure crates implement [`ApiClient`]; the aggregator and the
//! single-level views only ever see this trait. Implementations inject the
//! `Content-Type` and `X-API-Key` headers and turn every outcome into a
//! `Result`, so nothing above this boundary handles transport details.

use async_trait::async_trait;
use serde_json::Value;

use crate::{ApiFailure, PipelineId, StageId};

// ---------------------------------------------------------------------------
// Resource paths
// ---------------------------------------------------------------------------

/// A resource path relative to the API base URL. Always starts with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(String);

impl ApiPath {
    /// `/pipelines`
    pub fn pipelines() -> Self {
        Self("/pipelines".to_string())
    }

    /// `/pipelines/{pipeline}/stages`
    pub fn stages(pipeline: PipelineId) -> Self {
        Self(format!("/pipelines/{pipeline}/stages"))
    }

    /// `/pipelines/{pipeline}/stages/{stage}/negotiations`
    pub fn negotiations(pipeline: PipelineId, stage: StageId) -> Self {
        Self(format!("/pipelines/{pipeline}/stages/{stage}/negotiations"))
    }

    /// `/admin/users`
    pub fn admin_users() -> Self {
        Self("/admin/users".to_string())
    }

    /// `/auth/webhook`
    pub fn login() -> Self {
        Self("/auth/webhook".to_string())
    }

    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ApiPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// JSON request/response access to the remote API.
///
/// Implementations must:
/// - send `Content-Type: application/json` on every request;
/// - send `X-API-Key` only when their auth context holds a token;
/// - map any non-success status to [`ApiFailure::HttpError`] without reading
///   the body;
/// - never retry.
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// GET `path` and return the parsed JSON body.
    async fn get_json(&self, path: &ApiPath) -> Result<Value, ApiFailure>;

    /// POST `body` to `path` and return the parsed JSON body.
    async fn post_json(&self, path: &ApiPath, body: Value) -> Result<Value, ApiFailure>;
}

#[async_trait]
impl<C: ApiClient + ?Sized> ApiClient for &C {
    async fn get_json(&self, path: &ApiPath) -> Result<Value, ApiFailure> {
        (**self).get_json(path).await
    }

    async fn post_json(&self, path: &ApiPath, body: Value) -> Result<Value, ApiFailure> {
        (**self).post_json(path, body).await
    }
}
