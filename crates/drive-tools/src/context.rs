//! Read-only view of the per-turn state bag supplied by the host runtime.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lookup-by-key access to host-owned state.
///
/// Hosts with their own session/state types can implement this directly instead of copying
/// into an [`ExecutionContext`].
pub trait StateLookup: Send + Sync {
    fn get_state(&self, key: &str) -> Option<&Value>;
}

/// Key/value state bag for one conversation turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    state: Map<String, Value>,
}

impl ExecutionContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_state(state: Map<String, Value>) -> Self {
        Self { state }
    }

    /// Builder-style insert, used by hosts while assembling the turn state.
    #[must_use]
    pub fn with_state(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.state.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }
}

impl StateLookup for ExecutionContext {
    fn get_state(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionContext, StateLookup};
    use serde_json::json;

    #[test]
    fn lookup_returns_inserted_values() {
        let ctx = ExecutionContext::new()
            .with_state("temp:auth", "abc")
            .with_state("count", 3);
        assert_eq!(ctx.get_state("temp:auth"), Some(&json!("abc")));
        assert_eq!(ctx.get_state("count"), Some(&json!(3)));
        assert_eq!(ctx.get_state("missing"), None);
    }

    #[test]
    fn deserializes_from_plain_json_object() {
        let ctx: ExecutionContext =
            serde_json::from_value(json!({"temp:google-drive-reader-auth": "tok"}))
                .expect("context json");
        assert_eq!(
            ctx.get("temp:google-drive-reader-auth"),
            Some(&json!("tok"))
        );
    }
}
