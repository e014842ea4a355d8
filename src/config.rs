use std::env;

use dotenvy::Error as DotenvError;
use thiserror::Error;

use crate::platform::FunctionPlatform;

/// URL given to synthesized requests when the template does not name one.
pub const DEFAULT_FALLBACK_URL: &str = "https://example.com/dummy";
const FORWARD_BODY_ENV: &str = "TRIGGERFLARE_FORWARD_BODY";
const FALLBACK_URL_ENV: &str = "TRIGGERFLARE_FALLBACK_URL";

/// Configuration shared by every handler an adapter produces.
#[derive(Clone, Debug)]
pub struct AdapterConfig {
    pub platform: FunctionPlatform,
    /// Forward the native HTTP request body into the synthesized request.
    ///
    /// Off by default: only a template body reaches the router for `onRequest`.
    pub forward_request_body: bool,
    pub fallback_url: String,
}

impl AdapterConfig {
    /// Loads configuration from `TRIGGERFLARE_*` environment variables.
    ///
    /// Values from a local `.env` file (parsed via [`dotenvy::dotenv_override`]) override whatever is already set in
    /// the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_env_overrides()?;

        let platform = FunctionPlatform::detect();

        let forward_request_body = env::var(FORWARD_BODY_ENV)
            .ok()
            .map(|value| parse_flag(FORWARD_BODY_ENV, &value))
            .transpose()?
            .unwrap_or(false);

        let fallback_url = env::var(FALLBACK_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_owned());

        Ok(Self {
            platform,
            forward_request_body,
            fallback_url,
        })
    }

    /// Returns a builder for programmatic overrides.
    pub fn builder() -> AdapterConfigBuilder {
        AdapterConfigBuilder::default()
    }
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            platform: FunctionPlatform::default(),
            forward_request_body: false,
            fallback_url: DEFAULT_FALLBACK_URL.to_owned(),
        }
    }
}

/// Builder type for [`AdapterConfig`].
#[derive(Default, Clone, Debug)]
pub struct AdapterConfigBuilder {
    platform: Option<FunctionPlatform>,
    forward_request_body: Option<bool>,
    fallback_url: Option<String>,
}

impl AdapterConfigBuilder {
    /// Sets the platform reported to routes through [`crate::TriggerContext`].
    pub fn platform(mut self, platform: FunctionPlatform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Enables or disables forwarding of native HTTP request bodies.
    pub fn forward_request_body(mut self, enabled: bool) -> Self {
        self.forward_request_body = Some(enabled);
        self
    }

    /// Sets the URL used when a template does not provide one.
    pub fn fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> AdapterConfig {
        AdapterConfig {
            platform: self.platform.unwrap_or_default(),
            forward_request_body: self.forward_request_body.unwrap_or(false),
            fallback_url: self
                .fallback_url
                .unwrap_or_else(|| DEFAULT_FALLBACK_URL.to_owned()),
        }
    }
}

/// Errors that can occur while building [`AdapterConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid boolean for {name}: {value}")]
    InvalidFlag { name: &'static str, value: String },
    #[error("failed to load .env overrides: {0}")]
    Dotenv(#[from] DotenvError),
}

fn load_env_overrides() -> Result<(), ConfigError> {
    match dotenvy::dotenv_override() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err)),
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_owned(),
        }),
    }
}
