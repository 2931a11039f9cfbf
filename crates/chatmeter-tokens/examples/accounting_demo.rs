//! Walks one accounting cycle: build a tally, record a completion's usage,
//! and estimate the prompt cost of a short history.
//!
//! Run with: `cargo run --example accounting_demo`

use anyhow::Result;
use serde_json::json;

use chatmeter_config::Config;
use chatmeter_core::{ChatMessage, CompletionResult, Role};
use chatmeter_tokens::{TokenCounter, UsageAccountant, UsageTally, estimate_history_tokens};

fn main() -> Result<()> {
    let config = Config::default();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.filter.clone())),
        )
        .init();

    let counter = TokenCounter::from_config(&config)?;
    let accountant = UsageAccountant::new(counter.clone());

    let history = vec![
        ChatMessage::new(Role::System, "You are a concise assistant."),
        ChatMessage::new(Role::User, "Summarize the weather in one word."),
    ];
    println!(
        "prompt estimate: {} tokens ({})",
        estimate_history_tokens(&counter, &history),
        counter.encoding()
    );

    let mut tally = UsageTally::empty();
    let result = CompletionResult::new("Sunny.").with_usage(json!({"TotalTokens": 58}));
    accountant.record_function_usage(&result, &mut tally, Some("SystemCompletion"))?;

    // A hardcoded reply carries no metadata; this logs and leaves the tally alone.
    let hardcoded = CompletionResult::new("I am sorry, I cannot help with that.");
    accountant.record_function_usage(&hardcoded, &mut tally, Some("SystemIntentExtraction"))?;

    for (key, value) in tally.iter() {
        println!("{key} = {value}");
    }

    Ok(())
}
