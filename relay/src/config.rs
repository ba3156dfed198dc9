use anyhow::{Context, Result};
use std::env;
use std::fmt;

/// The upstream API credential.
///
/// Loaded once at startup. `Debug` is redacted so the key cannot leak through
/// logged config values.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a key, treating an empty or blank value as not configured.
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            None
        } else {
            Some(Self(key))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub port: u16,
    /// `None` keeps the server running but every POST answers 500.
    pub api_key: Option<ApiKey>,
    pub upstream_url: String,
}

impl RelayConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_key: env::var("ANTHROPIC_API_KEY").ok().and_then(ApiKey::new),
            upstream_url: shared::ANTHROPIC_MESSAGES_URL.to_string(),
        })
    }
}
