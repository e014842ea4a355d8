use std::convert::Infallible;
use std::sync::Arc;

use async_trait::async_trait;
use axum::BoxError;
use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use tower::ServiceExt;

/// Routing application the adapter hands synthesized requests to.
///
/// Implemented for [`axum::Router`]; implement it directly to put any other fetch-style
/// dispatcher behind the adapter.
#[async_trait]
pub trait FetchApp: Send + Sync + 'static {
    async fn fetch(&self, request: Request<Body>) -> Result<Response, BoxError>;
}

#[async_trait]
impl FetchApp for Router {
    async fn fetch(&self, request: Request<Body>) -> Result<Response, BoxError> {
        let response: Result<Response, Infallible> = self.clone().oneshot(request).await;
        match response {
            Ok(response) => Ok(response),
            Err(never) => match never {},
        }
    }
}

#[async_trait]
impl<A> FetchApp for Arc<A>
where
    A: FetchApp + ?Sized,
{
    async fn fetch(&self, request: Request<Body>) -> Result<Response, BoxError> {
        (**self).fetch(request).await
    }
}
