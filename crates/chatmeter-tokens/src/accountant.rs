//! Usage accounting for named pipeline stages
//!
//! Each response-generation cycle owns a [`UsageTally`]; the pipeline calls
//! [`UsageAccountant::record_function_usage`] after every stage completion
//! to attribute the tokens the stage consumed. Responses without real usage
//! data (hardcoded templates, degraded fallbacks) are routine: those paths
//! log at error level and leave the tally untouched rather than failing the
//! surrounding turn.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use chatmeter_core::{ChatHistory, CompletionResult, Error, Result, Role};

use crate::estimator;
use crate::tokenizer::TokenCounter;

/// Mapping from internal pipeline-stage identifiers to the base usage-field
/// names reported externally. Total only over these six stages; any other
/// identifier is unsupported and must be signaled.
pub const STAGE_USAGE_FIELDS: &[(&str, &str)] = &[
    ("SystemAudienceExtraction", "audienceExtraction"),
    ("SystemIntentExtraction", "userIntentExtraction"),
    ("SystemMetaPrompt", "metaPromptTemplate"),
    ("SystemCompletion", "responseCompletion"),
    ("SystemCognitive_WorkingMemory", "workingMemoryExtraction"),
    ("SystemCognitive_LongTermMemory", "longTermMemoryExtraction"),
];

/// Suffix appended to every base usage-field name in the tally.
pub const TOKEN_USAGE_SUFFIX: &str = "TokenUsage";

/// Base usage-field name for a stage identifier. Exact-match lookup.
pub fn usage_field(stage: &str) -> Option<&'static str> {
    STAGE_USAGE_FIELDS
        .iter()
        .find(|(name, _)| *name == stage)
        .map(|(_, field)| *field)
}

/// Resolve a stage identifier to its tally key (`"{field}TokenUsage"`).
///
/// Unknown or absent identifiers log one error and return `None`; callers
/// treat that as "do nothing further", not as a fault.
pub fn resolve_usage_key(stage: Option<&str>) -> Option<String> {
    let Some(stage) = stage.filter(|s| !s.is_empty()) else {
        error!("No pipeline stage provided; cannot attribute token usage");
        return None;
    };

    match usage_field(stage) {
        Some(field) => Some(format!("{field}{TOKEN_USAGE_SUFFIX}")),
        None => {
            error!("Unknown pipeline stage dependency: {}", stage);
            None
        }
    }
}

/// Per-cycle record of token counts keyed by usage-field name
///
/// Values are decimal strings (the tally crosses a string-valued reporting
/// boundary). Key lookup is ASCII case-insensitive; stored keys keep the
/// casing of the stage table.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct UsageTally {
    entries: HashMap<String, String>,
}

impl UsageTally {
    /// Tally with one entry per known stage, each initialized to `"0"`.
    ///
    /// Used by callers that skip actual accounting but still need the full
    /// tally shape.
    pub fn empty() -> Self {
        let entries = STAGE_USAGE_FIELDS
            .iter()
            .map(|(_, field)| (format!("{field}{TOKEN_USAGE_SUFFIX}"), "0".to_string()))
            .collect();
        Self { entries }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Insert or overwrite, matching any existing key case-insensitively.
    pub fn set(&mut self, key: &str, value: String) {
        let stored = self
            .entries
            .keys()
            .find(|k| k.eq_ignore_ascii_case(key))
            .cloned()
            .unwrap_or_else(|| key.to_string());
        self.entries.insert(stored, value);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Usage details as reported inside completion metadata.
///
/// The `Usage` entry is typed heterogeneously by providers; decoding through
/// serde keeps "field missing" (`total_tokens: None`) distinct from
/// "entry malformed" (decode error).
#[derive(Debug, Deserialize)]
struct UsageDetails {
    #[serde(rename = "TotalTokens", alias = "total_tokens")]
    total_tokens: Option<u64>,
}

/// Outcome of extracting a token count from a `Usage` metadata value.
#[derive(Debug, PartialEq, Eq)]
enum TotalTokens {
    Found(u64),
    Missing,
}

fn extract_total_tokens(usage: &Value) -> Result<TotalTokens> {
    let details: UsageDetails = serde_json::from_value(usage.clone())
        .map_err(|e| Error::MalformedUsage(format!("{usage}: {e}")))?;
    Ok(match details.total_tokens {
        Some(count) => TotalTokens::Found(count),
        None => TotalTokens::Missing,
    })
}

fn usage_is_empty(usage: &Value) -> bool {
    match usage {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Bookkeeping surface for the chat-completion pipeline
///
/// Holds the process-wide [`TokenCounter`] explicitly so tests can construct
/// accountants against any encoding.
#[derive(Clone)]
pub struct UsageAccountant {
    counter: TokenCounter,
}

impl UsageAccountant {
    pub fn new(counter: TokenCounter) -> Self {
        Self { counter }
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Number of tokens the configured encoding produces for `text`.
    pub fn count_tokens(&self, text: &str) -> usize {
        self.counter.count(text)
    }

    /// Rough token cost of a single chat message.
    pub fn estimate_message_tokens(&self, role: Role, content: Option<&str>) -> usize {
        estimator::estimate_message_tokens(&self.counter, role, content)
    }

    /// Rough token cost of an entire chat history.
    pub fn estimate_history_tokens(&self, history: &ChatHistory) -> usize {
        estimator::estimate_history_tokens(&self.counter, history)
    }

    /// Attribute a completion result's reported token usage to `stage`,
    /// writing the count into `tally` under the stage's usage key.
    ///
    /// Missing data (unknown stage, absent metadata, absent or empty `Usage`
    /// entry, absent `TotalTokens` field) is logged and swallowed: the tally
    /// is left untouched (or recorded as 0 for the missing-field case) and
    /// `Ok(())` is returned. A `Usage` entry that fails to decode is a
    /// genuine integration defect: it is logged with full context and
    /// returned as [`Error::MalformedUsage`].
    pub fn record_function_usage(
        &self,
        result: &CompletionResult,
        tally: &mut UsageTally,
        stage: Option<&str>,
    ) -> Result<()> {
        let Some(key) = resolve_usage_key(stage) else {
            return Ok(());
        };

        let Some(metadata) = result.metadata.as_ref() else {
            error!("No metadata provided in completion result for {}", key);
            return Ok(());
        };

        let usage = metadata.get(chatmeter_core::completion::USAGE_METADATA_KEY);
        let Some(usage) = usage.filter(|u| !usage_is_empty(u)) else {
            error!("Unable to determine token usage for {}", key);
            return Ok(());
        };

        let count = match extract_total_tokens(usage) {
            Ok(TotalTokens::Found(count)) => count,
            Ok(TotalTokens::Missing) => {
                error!("Usage details carry no TotalTokens field for {}", key);
                0
            }
            Err(e) => {
                error!("Unable to extract token usage for {}: {}", key, e);
                return Err(e);
            }
        };

        tally.set(&key, count.to_string());
        Ok(())
    }
}
