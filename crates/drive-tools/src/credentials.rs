//! Bearer token resolution.
//!
//! The platform injects the user's Drive token into the turn state; local runs fall back to a
//! process environment variable. Both are modeled as [`CredentialSource`] providers composed in
//! priority order by a [`CredentialChain`], so the fallback path is explicit and testable.

use crate::agent::AUTH_ID;
use crate::context::StateLookup;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Environment variable consulted when the turn state carries no token.
pub const DRIVE_ACCESS_TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

/// State key under which the platform stores the token for [`AUTH_ID`].
#[must_use]
pub fn auth_state_key() -> String {
    format!("temp:{AUTH_ID}")
}

/// Opaque bearer credential. Formatting never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Returns `None` for an empty string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Option<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccessToken(<redacted, {} chars>)", self.0.len())
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}

/// A single place a bearer token may come from.
pub trait CredentialSource: Send + Sync {
    /// Short provider name for diagnostics.
    fn name(&self) -> &str;

    fn resolve(&self, ctx: &dyn StateLookup) -> Option<AccessToken>;
}

/// Reads a string token from the turn state.
#[derive(Debug, Clone)]
pub struct ContextCredentialSource {
    key: String,
}

impl ContextCredentialSource {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl CredentialSource for ContextCredentialSource {
    fn name(&self) -> &str {
        "context"
    }

    fn resolve(&self, ctx: &dyn StateLookup) -> Option<AccessToken> {
        match ctx.get_state(&self.key)? {
            Value::String(s) => AccessToken::new(s.clone()),
            Value::Null => None,
            other => {
                debug!(key = %self.key, kind = %json_kind(other), "ignoring non-string token state");
                None
            }
        }
    }
}

/// Environment lookup used by [`EnvCredentialSource`].
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads the token from an environment variable.
///
/// Defaults to the process environment; [`EnvCredentialSource::with_lookup`] swaps in another
/// lookup so callers never have to mutate the real environment.
#[derive(Clone)]
pub struct EnvCredentialSource {
    var: String,
    lookup: EnvLookup,
}

impl EnvCredentialSource {
    #[must_use]
    pub fn new(var: impl Into<String>) -> Self {
        Self::with_lookup(var, |name| std::env::var(name).ok())
    }

    #[must_use]
    pub fn with_lookup(
        var: impl Into<String>,
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            var: var.into(),
            lookup: Arc::new(lookup),
        }
    }

    #[must_use]
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl fmt::Debug for EnvCredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentialSource")
            .field("var", &self.var)
            .finish_non_exhaustive()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn name(&self) -> &str {
        "env"
    }

    fn resolve(&self, _ctx: &dyn StateLookup) -> Option<AccessToken> {
        (self.lookup)(&self.var).and_then(AccessToken::new)
    }
}

/// Fixed token, for local tooling and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentialSource {
    token: AccessToken,
}

impl StaticCredentialSource {
    #[must_use]
    pub fn new(token: AccessToken) -> Self {
        Self { token }
    }
}

impl CredentialSource for StaticCredentialSource {
    fn name(&self) -> &str {
        "static"
    }

    fn resolve(&self, _ctx: &dyn StateLookup) -> Option<AccessToken> {
        Some(self.token.clone())
    }
}

/// Ordered providers; the first one yielding a token wins.
#[derive(Default)]
pub struct CredentialChain {
    sources: Vec<Box<dyn CredentialSource>>,
}

impl CredentialChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Platform-injected state first, then `DRIVE_ACCESS_TOKEN`.
    #[must_use]
    pub fn platform_default() -> Self {
        Self::platform_default_with_env(|name| std::env::var(name).ok())
    }

    /// [`Self::platform_default`] with the `DRIVE_ACCESS_TOKEN` lookup supplied by the caller.
    #[must_use]
    pub fn platform_default_with_env(
        lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        Self::new()
            .with_source(ContextCredentialSource::new(auth_state_key()))
            .with_source(EnvCredentialSource::with_lookup(DRIVE_ACCESS_TOKEN_ENV, lookup))
    }

    #[must_use]
    pub fn with_source(mut self, source: impl CredentialSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    #[must_use]
    pub fn resolve(&self, ctx: &dyn StateLookup) -> Option<AccessToken> {
        for source in &self.sources {
            if let Some(token) = source.resolve(ctx) {
                debug!(provider = %source.name(), "authentication token found");
                return Some(token);
            }
            debug!(provider = %source.name(), "no token from provider");
        }
        None
    }
}

impl fmt::Debug for CredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.sources.iter().map(|s| s.name()))
            .finish()
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
