//! Translation between platform triggers and the routing application.
//!
//! One adapter wraps an application together with an optional [`RequestTemplate`] and hands
//! out a strongly typed handler per trigger kind. Every handler builds a synthetic request,
//! runs it through the application and converts the response into whatever the trigger
//! expects back.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::{Method, Request, Uri};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use triggerflare_native::{
    CallableRequest, CloudEvent, NativeHeaderValue, NativeRequest, ResponseSink,
};

use crate::app::FetchApp;
use crate::config::AdapterConfig;
use crate::context::TriggerMetadata;
use crate::error::{Result, TriggerflareError};
use crate::headers::{HeaderSource, decode_value, merge_headers};
use crate::request::{FetchOptions, RequestInit, RequestTemplate, assemble_request_with_fallback};

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_HOST: &str = "localhost";
const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";
const HOST_HEADER: &str = "host";
const SCHEDULE_MARKER: &[u8] = br#"{"schedule":true}"#;

/// Platform trigger kinds an adapter can serve.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TriggerKind {
    OnRequest,
    OnCall,
    OnEvent,
    OnSchedule,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::OnRequest => "onRequest",
            TriggerKind::OnCall => "onCall",
            TriggerKind::OnEvent => "onEvent",
            TriggerKind::OnSchedule => "onSchedule",
        }
    }
}

impl fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TriggerKind {
    type Err = TriggerflareError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "onRequest" => Ok(TriggerKind::OnRequest),
            "onCall" => Ok(TriggerKind::OnCall),
            "onEvent" => Ok(TriggerKind::OnEvent),
            "onSchedule" => Ok(TriggerKind::OnSchedule),
            other => Err(TriggerflareError::UnsupportedTrigger(other.to_owned())),
        }
    }
}

/// Builds the handler for the trigger named by `trigger` using the default configuration.
///
/// Fails with [`TriggerflareError::UnsupportedTrigger`] before anything else happens when the
/// tag is not one of `onRequest`, `onCall`, `onEvent` or `onSchedule`.
pub fn handle<A: FetchApp>(
    app: A,
    trigger: &str,
    template: Option<RequestTemplate>,
) -> Result<TriggerHandler<A>> {
    handle_with_config(app, trigger, template, AdapterConfig::default())
}

/// Same as [`handle`] with an explicit [`AdapterConfig`].
pub fn handle_with_config<A: FetchApp>(
    app: A,
    trigger: &str,
    template: Option<RequestTemplate>,
    config: AdapterConfig,
) -> Result<TriggerHandler<A>> {
    let kind = trigger.parse::<TriggerKind>()?;
    let adapter = TriggerAdapter {
        app,
        template,
        config,
    };
    Ok(adapter.handler(kind))
}

/// Builder that pairs an application with its template and configuration.
pub struct TriggerAdapter<A> {
    app: A,
    template: Option<RequestTemplate>,
    config: AdapterConfig,
}

impl<A: FetchApp> TriggerAdapter<A> {
    pub fn new(app: A) -> Self {
        Self {
            app,
            template: None,
            config: AdapterConfig::default(),
        }
    }

    /// Sets the template merged into every synthesized request.
    pub fn template(mut self, template: RequestTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn on_request(self) -> RequestHandler<A> {
        RequestHandler {
            shared: self.into_shared(),
        }
    }

    pub fn on_call(self) -> CallHandler<A> {
        CallHandler {
            shared: self.into_shared(),
        }
    }

    pub fn on_event(self) -> EventHandler<A> {
        EventHandler {
            shared: self.into_shared(),
        }
    }

    pub fn on_schedule(self) -> ScheduleHandler<A> {
        ScheduleHandler {
            shared: self.into_shared(),
        }
    }

    /// Builds the handler matching `kind`.
    pub fn handler(self, kind: TriggerKind) -> TriggerHandler<A> {
        match kind {
            TriggerKind::OnRequest => TriggerHandler::Request(self.on_request()),
            TriggerKind::OnCall => TriggerHandler::Call(self.on_call()),
            TriggerKind::OnEvent => TriggerHandler::Event(self.on_event()),
            TriggerKind::OnSchedule => TriggerHandler::Schedule(self.on_schedule()),
        }
    }

    fn into_shared(self) -> Arc<Shared<A>> {
        Arc::new(Shared {
            app: self.app,
            template: self.template,
            config: self.config,
        })
    }
}

/// One handler per trigger kind, each with its own call signature.
pub enum TriggerHandler<A> {
    Request(RequestHandler<A>),
    Call(CallHandler<A>),
    Event(EventHandler<A>),
    Schedule(ScheduleHandler<A>),
}

impl<A> TriggerHandler<A> {
    pub fn kind(&self) -> TriggerKind {
        match self {
            TriggerHandler::Request(_) => TriggerKind::OnRequest,
            TriggerHandler::Call(_) => TriggerKind::OnCall,
            TriggerHandler::Event(_) => TriggerKind::OnEvent,
            TriggerHandler::Schedule(_) => TriggerKind::OnSchedule,
        }
    }

    pub fn into_request(self) -> Option<RequestHandler<A>> {
        match self {
            TriggerHandler::Request(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn into_call(self) -> Option<CallHandler<A>> {
        match self {
            TriggerHandler::Call(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn into_event(self) -> Option<EventHandler<A>> {
        match self {
            TriggerHandler::Event(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn into_schedule(self) -> Option<ScheduleHandler<A>> {
        match self {
            TriggerHandler::Schedule(handler) => Some(handler),
            _ => None,
        }
    }
}

struct Shared<A> {
    app: A,
    template: Option<RequestTemplate>,
    config: AdapterConfig,
}

impl<A: FetchApp> Shared<A> {
    fn metadata(&self, trigger: TriggerKind) -> TriggerMetadata {
        let mut metadata = TriggerMetadata::new(trigger);
        metadata.platform = self.config.platform.label().to_owned();
        metadata.function_name = self.config.platform.function_name().map(str::to_owned);
        metadata
    }

    fn template_body(&self) -> Option<Bytes> {
        self.template
            .as_ref()
            .and_then(|template| template.body.clone())
    }

    fn assemble(&self, body: Bytes, metadata: TriggerMetadata) -> Result<Request<Body>> {
        let init = RequestInit::new().body(body);
        let mut request = assemble_request_with_fallback(
            self.template.as_ref(),
            Some(init),
            &self.config.fallback_url,
        )?;
        request.extensions_mut().insert(metadata);
        Ok(request)
    }

    async fn dispatch(&self, trigger: TriggerKind, request: Request<Body>) -> Result<Response> {
        tracing::debug!(
            %trigger,
            method = %request.method(),
            url = %request.uri(),
            "dispatching synthesized request"
        );
        self.app.fetch(request).await.map_err(TriggerflareError::App)
    }

    /// Runs a request whose response only matters for diagnostics.
    async fn dispatch_logged(&self, trigger: TriggerKind, request: Request<Body>) -> Result<()> {
        match self.dispatch(trigger, request).await {
            Ok(response) => {
                tracing::info!(
                    %trigger,
                    status = response.status().as_u16(),
                    "{trigger} response status"
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(%trigger, error = %err, "{trigger} dispatch failed");
                Err(err)
            }
        }
    }
}

/// Handler for HTTP request triggers.
pub struct RequestHandler<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for RequestHandler<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: FetchApp> RequestHandler<A> {
    /// Serves `req` through the application and writes the reply into `res`.
    ///
    /// The native request body only reaches the application when
    /// [`AdapterConfig::forward_request_body`] is set; otherwise the template body (if any)
    /// is the only body sent.
    pub async fn call<S>(&self, req: &NativeRequest, res: &mut S) -> Result<()>
    where
        S: ResponseSink,
    {
        let shared = &self.shared;
        let template = shared.template.as_ref();

        let protocol = req
            .headers
            .get(FORWARDED_PROTO_HEADER)
            .and_then(NativeHeaderValue::first)
            .unwrap_or(DEFAULT_PROTOCOL);
        let host = req
            .headers
            .get(HOST_HEADER)
            .and_then(NativeHeaderValue::first)
            .unwrap_or(DEFAULT_HOST);
        let uri: Uri = format!("{protocol}://{host}{}", req.url).parse()?;

        let method = match template.and_then(|template| template.method.clone()) {
            Some(method) => method,
            None => Method::from_bytes(req.method.as_bytes())?,
        };

        let native = HeaderSource::Native(req.headers.clone());
        let headers = merge_headers(
            template.and_then(|template| template.headers.as_ref()),
            Some(&native),
        )?;

        // An empty template body counts as unset here.
        let body = match shared.template_body().filter(|body| !body.is_empty()) {
            Some(body) => Body::from(body),
            None if shared.config.forward_request_body => req
                .raw_body
                .clone()
                .map(Body::from)
                .unwrap_or_else(Body::empty),
            None => Body::empty(),
        };

        let mut request = Request::builder().method(method).uri(uri).body(body)?;
        *request.headers_mut() = headers;
        request.extensions_mut().insert(FetchOptions::default());
        request
            .extensions_mut()
            .insert(shared.metadata(TriggerKind::OnRequest));

        let response = shared.dispatch(TriggerKind::OnRequest, request).await?;
        let (parts, body) = response.into_parts();

        res.status(parts.status.as_u16());
        for name in parts.headers.keys() {
            let mut values: Vec<String> = parts
                .headers
                .get_all(name)
                .iter()
                .map(decode_value)
                .collect();
            let value = if values.len() == 1 {
                NativeHeaderValue::Single(values.remove(0))
            } else {
                NativeHeaderValue::Multiple(values)
            };
            res.set_header(name.as_str(), value);
        }

        let body = axum::body::to_bytes(body, usize::MAX).await?;
        res.send(body);

        Ok(())
    }
}

/// Handler for callable (RPC-style) triggers.
pub struct CallHandler<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for CallHandler<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: FetchApp> CallHandler<A> {
    /// Serves the invocation and returns the JSON-decoded response body.
    pub async fn call<T>(&self, req: &CallableRequest<T>) -> Result<Value>
    where
        T: Serialize + Sync,
    {
        self.call_as(req).await
    }

    /// Like [`CallHandler::call`], decoding the response body into `R`.
    pub async fn call_as<T, R>(&self, req: &CallableRequest<T>) -> Result<R>
    where
        T: Serialize + Sync,
        R: DeserializeOwned,
    {
        let shared = &self.shared;
        let body = match shared.template_body() {
            Some(body) => body,
            None => Bytes::from(serde_json::to_vec(&req.data)?),
        };

        let mut metadata = shared.metadata(TriggerKind::OnCall);
        metadata.auth_uid = req.auth.as_ref().map(|auth| auth.uid.clone());

        let request = shared.assemble(body, metadata)?;
        let response = shared.dispatch(TriggerKind::OnCall, request).await?;
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Handler for cloud event triggers.
pub struct EventHandler<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for EventHandler<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: FetchApp> EventHandler<A> {
    /// Forwards the event to the application.
    ///
    /// The response status is only logged. Application failures are logged and returned.
    pub async fn call<T>(&self, event: &CloudEvent<T>) -> Result<()>
    where
        T: Serialize + Sync,
    {
        let shared = &self.shared;
        let body = match shared.template_body() {
            Some(body) => body,
            None => Bytes::from(serde_json::to_vec(event)?),
        };

        let mut metadata = shared.metadata(TriggerKind::OnEvent);
        metadata.event_id = Some(event.id.clone());
        metadata.event_type = Some(event.event_type.clone());
        metadata.event_source = Some(event.source.clone());

        let request = shared.assemble(body, metadata)?;
        shared.dispatch_logged(TriggerKind::OnEvent, request).await
    }
}

/// Handler for scheduled triggers.
pub struct ScheduleHandler<A> {
    shared: Arc<Shared<A>>,
}

impl<A> Clone for ScheduleHandler<A> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: FetchApp> ScheduleHandler<A> {
    /// Runs one scheduled tick through the application.
    ///
    /// Without a template body the request carries `{"schedule":true}`.
    pub async fn call(&self) -> Result<()> {
        let shared = &self.shared;
        let body = shared
            .template_body()
            .unwrap_or_else(|| Bytes::from_static(SCHEDULE_MARKER));

        let request = shared.assemble(body, shared.metadata(TriggerKind::OnSchedule))?;
        shared
            .dispatch_logged(TriggerKind::OnSchedule, request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::BoxError;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use std::sync::Mutex;
    use triggerflare_native::BufferedResponse;

    /// Records the last request it saw and answers with a fixed response.
    struct Recorder {
        seen: Mutex<Option<(Method, String, Vec<(String, String)>, Bytes)>>,
        reply: &'static str,
    }

    #[async_trait]
    impl FetchApp for Recorder {
        async fn fetch(&self, request: Request<Body>) -> std::result::Result<Response, BoxError> {
            let (parts, body) = request.into_parts();
            let body = axum::body::to_bytes(body, usize::MAX).await?;
            let headers = parts
                .headers
                .iter()
                .map(|(name, value)| {
                    (
                        name.as_str().to_owned(),
                        value.to_str().unwrap_or_default().to_owned(),
                    )
                })
                .collect();
            *self.seen.lock().unwrap() =
                Some((parts.method, parts.uri.to_string(), headers, body));
            Ok((StatusCode::ACCEPTED, self.reply).into_response())
        }
    }

    impl Recorder {
        fn replying(reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(None),
                reply,
            })
        }

        fn seen(&self) -> (Method, String, Vec<(String, String)>, Bytes) {
            self.seen.lock().unwrap().clone().expect("request seen")
        }
    }

    struct Failing;

    /// Answers every request with a header carrying a Latin-1 byte.
    struct Latin1Header;

    #[async_trait]
    impl FetchApp for Latin1Header {
        async fn fetch(&self, _request: Request<Body>) -> std::result::Result<Response, BoxError> {
            let mut response = (StatusCode::CREATED, "ok").into_response();
            response.headers_mut().insert(
                "x-name",
                axum::http::HeaderValue::from_bytes(b"caf\xe9")?,
            );
            Ok(response)
        }
    }

    /// Sink that records the order of calls made on it.
    #[derive(Default)]
    struct OrderedSink {
        calls: Vec<String>,
    }

    impl ResponseSink for OrderedSink {
        fn status(&mut self, status: u16) {
            self.calls.push(format!("status:{status}"));
        }

        fn set_header(&mut self, name: &str, _value: NativeHeaderValue) {
            self.calls.push(format!("header:{name}"));
        }

        fn send(&mut self, body: Bytes) {
            self.calls.push(format!("send:{}", body.len()));
        }
    }

    #[async_trait]
    impl FetchApp for Failing {
        async fn fetch(&self, _request: Request<Body>) -> std::result::Result<Response, BoxError> {
            Err("router exploded".into())
        }
    }

    #[test]
    fn parses_trigger_tags() {
        assert_eq!("onRequest".parse::<TriggerKind>().unwrap(), TriggerKind::OnRequest);
        assert_eq!("onCall".parse::<TriggerKind>().unwrap(), TriggerKind::OnCall);
        assert_eq!("onEvent".parse::<TriggerKind>().unwrap(), TriggerKind::OnEvent);
        assert_eq!(
            "onSchedule".parse::<TriggerKind>().unwrap(),
            TriggerKind::OnSchedule
        );
        assert_eq!(TriggerKind::OnSchedule.to_string(), "onSchedule");
    }

    #[test]
    fn unsupported_tag_fails_synchronously() {
        let result = handle(Recorder::replying("{}"), "onFoo", None);

        match result {
            Err(TriggerflareError::UnsupportedTrigger(tag)) => assert_eq!(tag, "onFoo"),
            _ => panic!("expected unsupported trigger error"),
        }
    }

    #[test]
    fn handler_matches_requested_kind() {
        for kind in [
            TriggerKind::OnRequest,
            TriggerKind::OnCall,
            TriggerKind::OnEvent,
            TriggerKind::OnSchedule,
        ] {
            let handler = handle(Recorder::replying("{}"), kind.as_str(), None).unwrap();
            assert_eq!(handler.kind(), kind);
        }
    }

    #[tokio::test]
    async fn request_defaults_protocol_and_host() {
        let app = Recorder::replying("ok");
        let handler = TriggerAdapter::new(app.clone()).on_request();
        let req = NativeRequest::new("GET", "/foo?bar=1");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        let (method, url, _, body) = app.seen();
        assert_eq!(method, Method::GET);
        assert_eq!(url, "https://localhost/foo?bar=1");
        assert!(body.is_empty());
        assert_eq!(res.status, 202);
        assert_eq!(res.body.as_deref(), Some(&b"ok"[..]));
    }

    #[tokio::test]
    async fn request_uses_forwarded_proto_and_template() {
        let app = Recorder::replying("ok");
        let template = RequestTemplate::new()
            .method(Method::PUT)
            .headers(
                [("x-template", "t"), ("x-shared", "template")]
                    .into_iter()
                    .collect::<triggerflare_native::NativeHeaders>(),
            )
            .body("from-template");
        let handler = TriggerAdapter::new(app.clone())
            .template(template)
            .on_request();
        let req = NativeRequest::new("POST", "/items")
            .header("x-forwarded-proto", "http")
            .header("host", "svc.internal")
            .header("x-shared", "native")
            .raw_body("ignored");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        let (method, url, headers, body) = app.seen();
        assert_eq!(method, Method::PUT);
        assert_eq!(url, "http://svc.internal/items");
        assert!(headers.contains(&("x-template".into(), "t".into())));
        assert!(headers.contains(&("x-shared".into(), "native".into())));
        assert_eq!(body, "from-template");
    }

    #[tokio::test]
    async fn request_body_is_not_forwarded_by_default() {
        let app = Recorder::replying("ok");
        let handler = TriggerAdapter::new(app.clone()).on_request();
        let req = NativeRequest::new("POST", "/items").raw_body("payload");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        assert!(app.seen().3.is_empty());
    }

    #[tokio::test]
    async fn request_body_forwarding_is_opt_in() {
        let app = Recorder::replying("ok");
        let handler = TriggerAdapter::new(app.clone())
            .config(AdapterConfig::builder().forward_request_body(true).build())
            .on_request();
        let req = NativeRequest::new("POST", "/items").raw_body("payload");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        assert_eq!(app.seen().3, "payload");
    }

    #[tokio::test]
    async fn empty_template_body_does_not_replace_native_body() {
        let app = Recorder::replying("ok");
        let handler = TriggerAdapter::new(app.clone())
            .template(RequestTemplate::new().body(""))
            .config(AdapterConfig::builder().forward_request_body(true).build())
            .on_request();
        let req = NativeRequest::new("POST", "/items").raw_body("payload");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        assert_eq!(app.seen().3, "payload");
    }

    #[tokio::test]
    async fn invalid_native_method_is_rejected() {
        let handler = TriggerAdapter::new(Recorder::replying("ok")).on_request();
        let req = NativeRequest::new("BAD METHOD", "/");
        let mut res = BufferedResponse::new();

        let result = handler.call(&req, &mut res).await;

        assert!(matches!(result, Err(TriggerflareError::InvalidMethod(_))));
        assert!(!res.is_sent());
    }

    /// `!Send` sink handle.
    struct SharedSink(std::rc::Rc<std::cell::RefCell<OrderedSink>>);

    impl ResponseSink for SharedSink {
        fn status(&mut self, status: u16) {
            self.0.borrow_mut().status(status);
        }

        fn set_header(&mut self, name: &str, value: NativeHeaderValue) {
            self.0.borrow_mut().set_header(name, value);
        }

        fn send(&mut self, body: Bytes) {
            self.0.borrow_mut().send(body);
        }
    }

    #[tokio::test]
    async fn request_writes_status_then_headers_then_body() {
        let handler = TriggerAdapter::new(Latin1Header).on_request();
        let req = NativeRequest::new("GET", "/");
        let mut sink = OrderedSink::default();

        handler.call(&req, &mut sink).await.unwrap();

        assert_eq!(sink.calls.first().map(String::as_str), Some("status:201"));
        assert_eq!(sink.calls.last().map(String::as_str), Some("send:2"));
        let headers = &sink.calls[1..sink.calls.len() - 1];
        assert!(!headers.is_empty());
        assert!(headers.iter().all(|call| call.starts_with("header:")));
        assert!(headers.iter().any(|call| call == "header:x-name"));
    }

    #[tokio::test]
    async fn request_accepts_single_threaded_sinks() {
        let handler = TriggerAdapter::new(Latin1Header).on_request();
        let req = NativeRequest::new("GET", "/");
        let shared = std::rc::Rc::new(std::cell::RefCell::new(OrderedSink::default()));
        let mut sink = SharedSink(std::rc::Rc::clone(&shared));

        handler.call(&req, &mut sink).await.unwrap();

        assert_eq!(shared.borrow().calls.last().map(String::as_str), Some("send:2"));
    }

    #[tokio::test]
    async fn request_forwards_header_bytes_verbatim() {
        let handler = TriggerAdapter::new(Latin1Header).on_request();
        let req = NativeRequest::new("GET", "/");
        let mut res = BufferedResponse::new();

        handler.call(&req, &mut res).await.unwrap();

        assert_eq!(
            res.headers.get("x-name"),
            Some(&NativeHeaderValue::from("caf\u{e9}"))
        );
    }

    #[tokio::test]
    async fn request_propagates_application_errors() {
        let handler = TriggerAdapter::new(Failing).on_request();
        let req = NativeRequest::new("GET", "/");
        let mut res = BufferedResponse::new();

        let result = handler.call(&req, &mut res).await;

        assert!(matches!(result, Err(TriggerflareError::App(_))));
        assert!(!res.is_sent());
        assert_eq!(res, BufferedResponse::new());
    }

    #[tokio::test]
    async fn call_propagates_application_errors() {
        let handler = TriggerAdapter::new(Failing).on_call();

        let result = handler.call(&CallableRequest::new(1)).await;

        assert!(matches!(result, Err(TriggerflareError::App(_))));
    }

    #[tokio::test]
    async fn call_serializes_data_and_decodes_reply() {
        let app = Recorder::replying(r#"{"ok":true}"#);
        let handler = TriggerAdapter::new(app.clone()).on_call();
        let req = CallableRequest::new(serde_json::json!({ "n": 1 }));

        let value = handler.call(&req).await.unwrap();

        assert_eq!(value, serde_json::json!({ "ok": true }));
        let (method, url, _, body) = app.seen();
        assert_eq!(method, Method::GET);
        assert_eq!(url, "https://example.com/dummy");
        assert_eq!(body, r#"{"n":1}"#);
    }

    #[tokio::test]
    async fn call_prefers_template_body() {
        let app = Recorder::replying("1");
        let handler = TriggerAdapter::new(app.clone())
            .template(
                RequestTemplate::new()
                    .url("https://api.example.com/rpc")
                    .method(Method::POST)
                    .body("fixed"),
            )
            .on_call();

        let value: u32 = handler
            .call_as(&CallableRequest::new("ignored"))
            .await
            .unwrap();

        assert_eq!(value, 1);
        let (method, url, _, body) = app.seen();
        assert_eq!(method, Method::POST);
        assert_eq!(url, "https://api.example.com/rpc");
        assert_eq!(body, "fixed");
    }

    #[tokio::test]
    async fn call_rejects_non_json_reply() {
        let handler = TriggerAdapter::new(Recorder::replying("not json")).on_call();

        let result = handler.call(&CallableRequest::new(1)).await;

        assert!(matches!(result, Err(TriggerflareError::Json(_))));
    }

    #[tokio::test]
    async fn event_sends_whole_envelope() {
        let app = Recorder::replying("");
        let handler = TriggerAdapter::new(app.clone()).on_event();
        let event = CloudEvent::new("evt-1", "//source", "demo.created", serde_json::json!(7));

        handler.call(&event).await.unwrap();

        let body = app.seen().3;
        let decoded: CloudEvent = serde_json::from_slice(&body).unwrap();
        assert_eq!(decoded, event);
    }

    #[tokio::test]
    async fn event_prefers_template_body() {
        let app = Recorder::replying("");
        let handler = TriggerAdapter::new(app.clone())
            .template(RequestTemplate::new().body("fixed"))
            .on_event();
        let event = CloudEvent::new("evt-1", "//source", "demo.created", serde_json::json!(7));

        handler.call(&event).await.unwrap();

        assert_eq!(app.seen().3, "fixed");
    }

    #[tokio::test]
    async fn event_propagates_application_errors() {
        let handler = TriggerAdapter::new(Failing).on_event();
        let event = CloudEvent::new("evt-1", "//source", "demo.created", ());

        let result = handler.call(&event).await;

        assert!(matches!(result, Err(TriggerflareError::App(_))));
    }

    #[tokio::test]
    async fn schedule_sends_marker_body() {
        let app = Recorder::replying("");
        let handler = TriggerAdapter::new(app.clone()).on_schedule();

        handler.call().await.unwrap();

        assert_eq!(app.seen().3, r#"{"schedule":true}"#);
    }

    #[tokio::test]
    async fn schedule_prefers_template_body() {
        let app = Recorder::replying("");
        let handler = TriggerAdapter::new(app.clone())
            .template(RequestTemplate::new().body("nightly"))
            .on_schedule();

        handler.call().await.unwrap();

        assert_eq!(app.seen().3, "nightly");
    }

    #[tokio::test]
    async fn schedule_propagates_application_errors() {
        let handler = TriggerAdapter::new(Failing).on_schedule();

        assert!(matches!(
            handler.call().await,
            Err(TriggerflareError::App(_))
        ));
    }
}
