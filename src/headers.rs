//! Merging of native header bags and standard header maps.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use triggerflare_native::NativeHeaders;

use crate::error::Result;

/// Either representation a caller may hand the adapter headers in.
#[derive(Clone, Debug)]
pub enum HeaderSource {
    /// Platform header bag; array entries collapse into one comma-joined value.
    Native(NativeHeaders),
    /// Standard header map, taken as-is.
    Standard(HeaderMap),
}

impl HeaderSource {
    /// Converts the source into a standard [`HeaderMap`].
    pub fn normalize(&self) -> Result<HeaderMap> {
        match self {
            HeaderSource::Native(headers) => normalize_native(headers),
            HeaderSource::Standard(headers) => Ok(headers.clone()),
        }
    }
}

impl From<NativeHeaders> for HeaderSource {
    fn from(headers: NativeHeaders) -> Self {
        Self::Native(headers)
    }
}

impl From<HeaderMap> for HeaderSource {
    fn from(headers: HeaderMap) -> Self {
        Self::Standard(headers)
    }
}

/// Merges two optional header sources into one map.
///
/// `a` is applied first and `b` on top of it. A name present in `b` replaces every
/// value `a` had for that name. Missing sources count as empty.
pub fn merge_headers(a: Option<&HeaderSource>, b: Option<&HeaderSource>) -> Result<HeaderMap> {
    let mut merged = match a {
        Some(source) => source.normalize()?,
        None => HeaderMap::new(),
    };

    if let Some(source) = b {
        overlay(&mut merged, source.normalize()?);
    }

    Ok(merged)
}

fn normalize_native(headers: &NativeHeaders) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers.iter() {
        let Some(value) = value else {
            continue;
        };
        let name = HeaderName::from_bytes(name.as_bytes())?;
        let value = encode_value(&value.joined())?;
        map.insert(name, value);
    }
    Ok(map)
}

/// Encodes a native header value, one byte per char when every char fits in Latin-1.
///
/// Values with wider chars fall back to their UTF-8 bytes.
pub(crate) fn encode_value(value: &str) -> Result<HeaderValue> {
    let latin1: Option<Vec<u8>> = value
        .chars()
        .map(|c| u8::try_from(u32::from(c)).ok())
        .collect();
    let value = match latin1 {
        Some(bytes) => HeaderValue::from_bytes(&bytes)?,
        None => HeaderValue::from_bytes(value.as_bytes())?,
    };
    Ok(value)
}

/// Decodes a header value byte for byte, so no byte is lost on the way to a native sink.
pub(crate) fn decode_value(value: &HeaderValue) -> String {
    value.as_bytes().iter().map(|&b| char::from(b)).collect()
}

fn overlay(target: &mut HeaderMap, source: HeaderMap) {
    let mut current: Option<HeaderName> = None;
    for (name, value) in source {
        // `None` continues the previous name's value list.
        match name {
            Some(name) => {
                target.insert(name.clone(), value);
                current = Some(name);
            }
            None => {
                if let Some(name) = &current {
                    target.append(name, value);
                }
            }
        }
    }
}
