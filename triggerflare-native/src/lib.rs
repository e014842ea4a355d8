//! Platform-native shapes delivered by the serverless functions runtime.
//!
//! These types model what the platform hands to a registered function before any
//! translation into `http` envelopes happens: the loosely typed header bag of an
//! incoming HTTP request, the mutable response sink the function writes into, the
//! callable-invocation envelope and the CloudEvents envelope.

use std::borrow::Cow;
use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const CLOUD_EVENTS_SPEC_VERSION: &str = "1.0";

/// A single entry of a [`NativeHeaders`] bag.
///
/// The platform reports repeated headers as arrays and everything else as plain strings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NativeHeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl NativeHeaderValue {
    /// Collapses the entry into one header value, joining arrays with `,` in order.
    pub fn joined(&self) -> Cow<'_, str> {
        match self {
            NativeHeaderValue::Single(value) => Cow::Borrowed(value),
            NativeHeaderValue::Multiple(values) => Cow::Owned(values.join(",")),
        }
    }

    /// Returns the first value carried by the entry.
    pub fn first(&self) -> Option<&str> {
        match self {
            NativeHeaderValue::Single(value) => Some(value),
            NativeHeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

impl From<&str> for NativeHeaderValue {
    fn from(value: &str) -> Self {
        Self::Single(value.to_owned())
    }
}

impl From<String> for NativeHeaderValue {
    fn from(value: String) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<String>> for NativeHeaderValue {
    fn from(values: Vec<String>) -> Self {
        Self::Multiple(values)
    }
}

impl From<Vec<&str>> for NativeHeaderValue {
    fn from(values: Vec<&str>) -> Self {
        Self::Multiple(values.into_iter().map(str::to_owned).collect())
    }
}

/// Header bag attached to a platform-native HTTP request.
///
/// Entries may be absent (`None`), mirroring how the platform reports headers it knows
/// about but did not receive. Lookups ignore ASCII case.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NativeHeaders(BTreeMap<String, Option<NativeHeaderValue>>);

impl NativeHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entry under its lowercased name, replacing any previous entry.
    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<NativeHeaderValue>) {
        let name = name.as_ref().to_ascii_lowercase();
        self.0.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.0.insert(name, Some(value.into()));
    }

    /// Records a header the platform knows about but that carries no value.
    pub fn insert_absent(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref().to_ascii_lowercase();
        self.0.retain(|key, _| !key.eq_ignore_ascii_case(&name));
        self.0.insert(name, None);
    }

    /// Returns the entry for `name`, skipping absent entries.
    pub fn get(&self, name: &str) -> Option<&NativeHeaderValue> {
        self.0
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_ref())
    }

    /// Iterates over every entry, absent ones included.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&NativeHeaderValue>)> {
        self.0
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for NativeHeaders
where
    K: AsRef<str>,
    V: Into<NativeHeaderValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = NativeHeaders::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// Incoming HTTP request as delivered to an `onRequest` function.
#[derive(Clone, Debug)]
pub struct NativeRequest {
    pub method: String,
    /// Path plus query string, e.g. `/foo?bar=baz`.
    pub url: String,
    pub headers: NativeHeaders,
    /// Raw body bytes when the platform buffered them.
    pub raw_body: Option<Bytes>,
}

impl NativeRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: NativeHeaders::new(),
            raw_body: None,
        }
    }

    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<NativeHeaderValue>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn raw_body(mut self, body: impl Into<Bytes>) -> Self {
        self.raw_body = Some(body.into());
        self
    }
}

/// Mutable response object an `onRequest` function writes its reply into.
///
/// Callers set the status first, then headers, then send the body exactly once.
pub trait ResponseSink {
    fn status(&mut self, status: u16);

    /// Sets a header, replacing any value previously set under the same name.
    fn set_header(&mut self, name: &str, value: NativeHeaderValue);

    /// Writes the complete body and finishes the response.
    fn send(&mut self, body: Bytes);
}

/// In-memory [`ResponseSink`] that records everything written to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferedResponse {
    pub status: u16,
    pub headers: NativeHeaders,
    pub body: Option<Bytes>,
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: NativeHeaders::new(),
            body: None,
        }
    }
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicates whether [`ResponseSink::send`] has been called.
    pub fn is_sent(&self) -> bool {
        self.body.is_some()
    }
}

impl ResponseSink for BufferedResponse {
    fn status(&mut self, status: u16) {
        self.status = status;
    }

    fn set_header(&mut self, name: &str, value: NativeHeaderValue) {
        self.headers.insert(name, value);
    }

    fn send(&mut self, body: Bytes) {
        self.body = Some(body);
    }
}

/// Identity of the caller of a callable function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuthData {
    pub uid: String,
    /// Decoded ID token claims.
    #[serde(default)]
    pub token: Value,
}

/// App Check attestation attached to a callable invocation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppCheckData {
    pub app_id: String,
    #[serde(default)]
    pub token: Value,
}

/// Envelope delivered to an `onCall` function.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableRequest<T = Value> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<AppCheckData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id_token: Option<String>,
}

impl<T> CallableRequest<T> {
    /// Creates an unauthenticated invocation carrying `data`.
    pub fn new(data: T) -> Self {
        Self {
            data,
            auth: None,
            app: None,
            instance_id_token: None,
        }
    }

    pub fn with_auth(mut self, auth: AuthData) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// CloudEvents 1.0 envelope delivered to event-triggered functions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CloudEvent<T = Value> {
    pub specversion: String,
    pub id: String,
    pub source: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    pub data: T,
}

impl<T> CloudEvent<T> {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        event_type: impl Into<String>,
        data: T,
    ) -> Self {
        Self {
            specversion: CLOUD_EVENTS_SPEC_VERSION.to_owned(),
            id: id.into(),
            source: source.into(),
            event_type: event_type.into(),
            subject: None,
            time: None,
            data,
        }
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }
}
