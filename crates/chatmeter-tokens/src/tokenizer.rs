use std::sync::Arc;

use chatmeter_core::{Error, Result};
use tiktoken_rs::CoreBPE;

/// Token counter backed by a tiktoken BPE (cl100k_base by default)
///
/// Constructed once per process and shared; the underlying encoder is
/// immutable, so `count` is safe to call from multiple threads.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
    encoding: String,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter")
            .field("encoding", &self.encoding)
            .finish_non_exhaustive()
    }
}

impl TokenCounter {
    /// Create a counter with the cl100k_base encoding (GPT-4, GPT-3.5-turbo)
    pub fn new() -> Result<Self> {
        Self::with_encoding("cl100k_base")
    }

    /// Create a counter for a named encoding scheme
    pub fn with_encoding(encoding: &str) -> Result<Self> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => return Err(Error::UnsupportedEncoding(other.to_string())),
        }
        .map_err(|e| Error::Tokenizer(e.to_string()))?;

        Ok(Self {
            bpe: Arc::new(bpe),
            encoding: encoding.to_string(),
        })
    }

    /// Create a counter from the configured encoding scheme
    pub fn from_config(config: &chatmeter_config::Config) -> Result<Self> {
        Self::with_encoding(&config.encoding)
    }

    /// Name of the encoding scheme this counter was built with
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    /// Count tokens in a single string
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_ordinary(text).len()
    }

    /// Count tokens for multiple strings
    pub fn count_batch(&self, texts: &[&str]) -> Vec<usize> {
        texts.iter().map(|text| self.count(text)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_counting() {
        let counter = TokenCounter::new().unwrap();

        let count = counter.count("Hello, world!");
        assert!(count > 0 && count < 10);

        // Empty string
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_monotonic_in_repeated_chars() {
        let counter = TokenCounter::new().unwrap();

        let mut prev = 0;
        for len in [1, 8, 64, 512] {
            let count = counter.count(&"a".repeat(len));
            assert!(count >= prev);
            prev = count;
        }
    }

    #[test]
    fn test_counting_is_idempotent() {
        let counter = TokenCounter::new().unwrap();
        let text = "the quick brown fox";
        assert_eq!(counter.count(text), counter.count(text));
    }

    #[test]
    fn test_batch_counting() {
        let counter = TokenCounter::new().unwrap();

        let texts = vec!["Hello", "world", "!"];
        let counts = counter.count_batch(&texts);

        assert_eq!(counts.len(), 3);
        assert!(counts.iter().all(|&c| c > 0));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let err = TokenCounter::with_encoding("not-an-encoding").unwrap_err();
        assert!(matches!(err, Error::UnsupportedEncoding(_)));
    }

    #[test]
    fn test_from_config_default() {
        let config = chatmeter_config::Config::default();
        let counter = TokenCounter::from_config(&config).unwrap();
        assert_eq!(counter.encoding(), "cl100k_base");
    }
}
