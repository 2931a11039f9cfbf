//! Completion result abstraction
//!
//! The orchestration framework hands back a completion plus a loosely-typed
//! metadata mapping. The shape of that mapping is not guaranteed: usage data
//! may be absent entirely (hardcoded or degraded responses), present but
//! empty, or typed as an opaque structured object. Consumers must inspect it
//! defensively.

use serde_json::Value;
use std::collections::HashMap;

/// Metadata key under which providers report token usage.
pub const USAGE_METADATA_KEY: &str = "Usage";

/// Result of a single chat-completion invocation.
#[derive(Debug, Clone)]
pub struct CompletionResult {
    /// The completion text.
    pub content: String,
    /// Provider metadata; `None` when the result carries none at all.
    pub metadata: Option<HashMap<String, Value>>,
}

impl CompletionResult {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Attach a `Usage` metadata entry, creating the metadata map if needed.
    pub fn with_usage(mut self, usage: Value) -> Self {
        self.metadata
            .get_or_insert_with(HashMap::new)
            .insert(USAGE_METADATA_KEY.to_string(), usage);
        self
    }

    /// The `Usage` metadata entry, if any.
    pub fn usage(&self) -> Option<&Value> {
        self.metadata.as_ref()?.get(USAGE_METADATA_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_result_has_no_usage() {
        let result = CompletionResult::new("hello");
        assert!(result.metadata.is_none());
        assert!(result.usage().is_none());
    }

    #[test]
    fn test_with_usage_creates_metadata() {
        let result = CompletionResult::new("hello").with_usage(json!({"TotalTokens": 7}));
        let usage = result.usage().unwrap();
        assert_eq!(usage["TotalTokens"], 7);
    }

    #[test]
    fn test_metadata_without_usage_entry() {
        let mut metadata = HashMap::new();
        metadata.insert("ModelId".to_string(), json!("gpt-4"));
        let result = CompletionResult::new("hello").with_metadata(metadata);
        assert!(result.metadata.is_some());
        assert!(result.usage().is_none());
    }
}
