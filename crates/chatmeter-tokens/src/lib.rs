//! Token accounting for the chat-completion pipeline
//!
//! This crate contains:
//! - Tokenizer wrapper over tiktoken (cl100k_base by default)
//! - Stage-to-usage-field table and per-cycle usage tally
//! - Rough token estimators for chat messages and histories

pub mod accountant;
pub mod estimator;
pub mod tokenizer;

pub use accountant::{
    STAGE_USAGE_FIELDS, TOKEN_USAGE_SUFFIX, UsageAccountant, UsageTally, resolve_usage_key,
    usage_field,
};
pub use estimator::{estimate_history_tokens, estimate_message_tokens};
pub use tokenizer::TokenCounter;
