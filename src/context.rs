use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::adapter::TriggerKind;
use crate::platform::FunctionPlatform;
use crate::request::FetchOptions;

/// Describes the platform trigger a synthesized request stands in for.
///
/// Attached to every request the adapter builds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMetadata {
    pub trigger: TriggerKind,
    pub platform: String,
    pub function_name: Option<String>,
    /// Caller uid for authenticated callable invocations.
    pub auth_uid: Option<String>,
    pub event_id: Option<String>,
    pub event_type: Option<String>,
    pub event_source: Option<String>,
}

impl TriggerMetadata {
    pub fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            platform: FunctionPlatform::default().label().to_owned(),
            function_name: None,
            auth_uid: None,
            event_id: None,
            event_type: None,
            event_source: None,
        }
    }
}

/// Request-scoped handle that exposes which trigger produced the current request.
#[derive(Clone, Debug)]
pub struct TriggerContext {
    metadata: TriggerMetadata,
    options: FetchOptions,
}

impl TriggerContext {
    /// Returns the trigger metadata recorded by the adapter.
    pub fn metadata(&self) -> &TriggerMetadata {
        &self.metadata
    }

    pub fn trigger(&self) -> TriggerKind {
        self.metadata.trigger
    }

    /// Returns the fetch-standard options the request was assembled with.
    pub fn options(&self) -> &FetchOptions {
        &self.options
    }
}

/// Errors emitted when a handler requests [`TriggerContext`] outside an adapter invocation.
#[derive(Debug, Error)]
pub enum TriggerContextRejection {
    #[error("trigger metadata missing from request extensions")]
    MissingMetadata,
}

impl IntoResponse for TriggerContextRejection {
    fn into_response(self) -> Response {
        let status = StatusCode::INTERNAL_SERVER_ERROR;
        let message = self.to_string();
        (status, message).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for TriggerContext
where
    S: Send + Sync,
{
    type Rejection = TriggerContextRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let metadata = parts
            .extensions
            .get::<TriggerMetadata>()
            .cloned()
            .ok_or(TriggerContextRejection::MissingMetadata)?;

        let options = parts
            .extensions
            .get::<FetchOptions>()
            .cloned()
            .unwrap_or_default();

        Ok(Self { metadata, options })
    }
}
