//! Message tokenization for chat generation.
//!
//! Splitting a message into words is deliberately a pluggable collaborator
//! of the word-chain models, not part of them. The default
//! [`SpaceTokenizer`] splits on single spaces with no case or punctuation
//! normalization, so generated text rejoins exactly as it was observed.
//!
//! This crate has no dependencies on the rest of the workspace — it is a
//! pure text utility producing `Vec<String>`.

/// Splits one message into an ordered token sequence.
///
/// Implementations must return at least one token for any non-empty
/// message; the word models rely on every message contributing a first and
/// a last token.
pub trait Tokenizer {
    fn tokenize(&self, message: &str) -> Vec<String>;
}

/// The default tokenizer: split on single spaces, keep everything else.
///
/// Consecutive spaces yield empty tokens, faithfully mirroring how the
/// message would rejoin with single spaces. No trimming, no lowercasing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpaceTokenizer;

impl Tokenizer for SpaceTokenizer {
    fn tokenize(&self, message: &str) -> Vec<String> {
        message.split(' ').map(str::to_string).collect()
    }
}

/// Alternative tokenizer: split on runs of any whitespace.
///
/// Collapses consecutive separators, so tabs and double spaces do not
/// produce empty tokens. An empty or all-whitespace message yields no
/// tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn tokenize(&self, message: &str) -> Vec<String> {
        message.split_whitespace().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn space_tokenizer_splits_on_single_spaces() {
        let tokens = SpaceTokenizer.tokenize("cool story bro");
        assert_eq!(tokens, vec!["cool", "story", "bro"]);
    }

    #[test]
    fn space_tokenizer_keeps_punctuation_and_case() {
        let tokens = SpaceTokenizer.tokenize("Hey, what's up?");
        assert_eq!(tokens, vec!["Hey,", "what's", "up?"]);
    }

    #[test]
    fn space_tokenizer_single_word() {
        assert_eq!(SpaceTokenizer.tokenize("ok"), vec!["ok"]);
    }

    #[test]
    fn space_tokenizer_double_space_yields_empty_token() {
        let tokens = SpaceTokenizer.tokenize("a  b");
        assert_eq!(tokens, vec!["a", "", "b"]);
    }

    #[test]
    fn whitespace_tokenizer_collapses_runs() {
        let tokens = WhitespaceTokenizer.tokenize("a \t b\n c");
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn whitespace_tokenizer_empty_message() {
        assert!(WhitespaceTokenizer.tokenize("   ").is_empty());
    }
}
