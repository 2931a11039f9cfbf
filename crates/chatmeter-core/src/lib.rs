//! Core domain models for chatmeter
//!
//! This crate contains:
//! - Chat message abstraction (Role, ChatMessage, ChatHistory)
//! - Completion result with loosely-typed metadata
//! - Shared error type

pub mod completion;
pub mod error;
pub mod message;

pub use completion::CompletionResult;
pub use error::{Error, Result};
pub use message::{ChatHistory, ChatMessage, Role};
