//! Assembly of standard requests from a template plus per-call overrides.

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Uri};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_FALLBACK_URL;
use crate::error::Result;
use crate::headers::{HeaderSource, merge_headers};

/// Partial request configured once per adapter and applied to every synthesized request.
#[derive(Clone, Debug, Default)]
pub struct RequestTemplate {
    pub url: Option<String>,
    pub method: Option<Method>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Bytes>,
}

impl RequestTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Per-call request options. Every field wins over the template.
#[derive(Clone, Debug, Default)]
pub struct RequestInit {
    pub method: Option<Method>,
    pub headers: Option<HeaderSource>,
    pub body: Option<Bytes>,
    pub options: FetchOptions,
}

impl RequestInit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn headers(mut self, headers: impl Into<HeaderSource>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn options(mut self, options: FetchOptions) -> Self {
        self.options = options;
        self
    }
}

/// Fetch-standard request options that have no `http::Request` counterpart.
///
/// The assembler attaches these to every request it builds as an extension, so routes can
/// read them with `Extension<FetchOptions>` or through [`crate::TriggerContext`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOptions {
    pub cache: Option<RequestCache>,
    pub credentials: Option<RequestCredentials>,
    pub mode: Option<RequestMode>,
    pub redirect: Option<RequestRedirect>,
    pub referrer: Option<String>,
    pub referrer_policy: Option<ReferrerPolicy>,
    pub integrity: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCache {
    Default,
    NoStore,
    Reload,
    NoCache,
    ForceCache,
    OnlyIfCached,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestCredentials {
    Omit,
    SameOrigin,
    Include,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestRedirect {
    Follow,
    Error,
    Manual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferrerPolicy {
    NoReferrer,
    NoReferrerWhenDowngrade,
    SameOrigin,
    Origin,
    StrictOrigin,
    OriginWhenCrossOrigin,
    StrictOriginWhenCrossOrigin,
    UnsafeUrl,
}

/// Builds a request from an optional template and optional overrides.
///
/// Uses [`DEFAULT_FALLBACK_URL`] when the template carries no URL.
pub fn assemble_request(
    partial: Option<&RequestTemplate>,
    overrides: Option<RequestInit>,
) -> Result<Request<Body>> {
    assemble_request_with_fallback(partial, overrides, DEFAULT_FALLBACK_URL)
}

/// Same as [`assemble_request`] with an explicit fallback URL.
///
/// Precedence per field: URL comes from the template only, method, headers and body prefer
/// `overrides`, and the fetch-only options come from `overrides` alone.
pub fn assemble_request_with_fallback(
    partial: Option<&RequestTemplate>,
    overrides: Option<RequestInit>,
    fallback_url: &str,
) -> Result<Request<Body>> {
    let overrides = overrides.unwrap_or_default();

    let url = partial
        .and_then(|template| template.url.as_deref())
        .unwrap_or(fallback_url);
    let uri: Uri = url.parse()?;

    let method = overrides
        .method
        .or_else(|| partial.and_then(|template| template.method.clone()))
        .unwrap_or_default();

    let headers = merge_headers(
        partial.and_then(|template| template.headers.as_ref()),
        overrides.headers.as_ref(),
    )?;

    let body = overrides
        .body
        .or_else(|| partial.and_then(|template| template.body.clone()))
        .map(Body::from)
        .unwrap_or_else(Body::empty);

    let mut request = Request::builder().method(method).uri(uri).body(body)?;
    *request.headers_mut() = headers;
    request.extensions_mut().insert(overrides.options);

    Ok(request)
}
