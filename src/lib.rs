//! Triggerflare adapter crate.
//!
//! This crate lets an Axum router (or any other [`FetchApp`]) serve every trigger a
//! serverless functions platform can deliver: HTTP requests, callable invocations, cloud
//! events and scheduled ticks. Each trigger is translated into a standard `http` request,
//! run through the router, and the response is translated back into the shape the trigger
//! expects.

pub mod adapter;
pub mod app;
pub mod config;
pub mod context;
pub mod error;
pub mod headers;
pub mod platform;
pub mod request;

pub use crate::adapter::{
    CallHandler, EventHandler, RequestHandler, ScheduleHandler, TriggerAdapter, TriggerHandler,
    TriggerKind, handle, handle_with_config,
};
pub use crate::app::FetchApp;
pub use crate::config::{AdapterConfig, AdapterConfigBuilder, ConfigError, DEFAULT_FALLBACK_URL};
pub use crate::context::{TriggerContext, TriggerContextRejection, TriggerMetadata};
pub use crate::error::{Result, TriggerflareError};
pub use crate::headers::{HeaderSource, merge_headers};
pub use crate::platform::{CloudFunctionsPlatform, EmulatorPlatform, FunctionPlatform};
pub use crate::request::{
    FetchOptions, ReferrerPolicy, RequestCache, RequestCredentials, RequestInit, RequestMode,
    RequestRedirect, RequestTemplate, assemble_request, assemble_request_with_fallback,
};
pub use triggerflare_native::{
    AppCheckData, AuthData, BufferedResponse, CallableRequest, CloudEvent, NativeHeaderValue,
    NativeHeaders, NativeRequest, ResponseSink,
};
