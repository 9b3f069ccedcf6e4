// ============================================================
// Layer 4 — Word Tokenizer
// ============================================================
// Splits one line into word-level tokens.
//
// Pipeline per line:
//   1. Whitespace split using the `tokenizers` crate pre-tokenizer
//   2. For each chunk:
//        - a chunk with no letters or digits stays whole ("--", "...")
//        - leading punctuation becomes one token per character
//        - trailing punctuation becomes tokens, runs of the same
//          character kept together ("!!", "...")
//        - the remaining core goes through the language's clitic rules
//
// Clitic rules:
//   English: don't → do n't, it's → it 's, we'll → we 'll, ...
//   French:  l'homme → l' homme, qu'il → qu' il, ...
//   Others:  none
//
// Example (english):
//   "I don't know, really..." → I | do | n't | know | , | really | ...

use tokenizers::pre_tokenizers::whitespace::WhitespaceSplit;
use tokenizers::{OffsetReferential, OffsetType, PreTokenizedString, PreTokenizer};

use crate::domain::corpus::TokenizedLine;
use crate::domain::error::{DatasetError, Result};
use crate::domain::language::Language;
use crate::domain::traits::LineTokenizer;

const ENGLISH_SUFFIXES: [&str; 7] = ["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];
const FRENCH_PREFIXES: [&str; 9] = ["qu'", "l'", "d'", "j'", "n'", "s'", "c'", "m'", "t'"];

#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer;

impl WordTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl LineTokenizer for WordTokenizer {
    fn tokenize(&self, line: &str, language: Language) -> Result<TokenizedLine> {
        let mut pretokenized = PreTokenizedString::from(line);
        WhitespaceSplit
            .pre_tokenize(&mut pretokenized)
            .map_err(|e| DatasetError::Tokenize(e.to_string()))?;

        let mut tokens = Vec::new();
        for (chunk, _, _) in pretokenized.get_splits(OffsetReferential::Original, OffsetType::Byte) {
            split_chunk(chunk, language, &mut tokens);
        }
        Ok(tokens)
    }
}

fn split_chunk(chunk: &str, language: Language, out: &mut Vec<String>) {
    let (Some(first), Some(last)) = (
        chunk.find(char::is_alphanumeric),
        chunk.rfind(char::is_alphanumeric),
    ) else {
        out.push(chunk.to_string());
        return;
    };
    let core_end = last + chunk[last..].chars().next().map_or(0, char::len_utf8);

    out.extend(chunk[..first].chars().map(String::from));
    split_clitics(&chunk[first..core_end], language, out);
    push_trailing(&chunk[core_end..], out);
}

fn split_clitics(core: &str, language: Language, out: &mut Vec<String>) {
    let split_at = match language {
        Language::English => ENGLISH_SUFFIXES.iter().find_map(|s| suffix_start(core, s)),
        Language::French  => FRENCH_PREFIXES.iter().find_map(|p| prefix_end(core, p)),
        _ => None,
    };
    match split_at {
        Some(at) => {
            out.push(core[..at].to_string());
            out.push(core[at..].to_string());
        }
        None => out.push(core.to_string()),
    }
}

fn suffix_start(core: &str, suffix: &str) -> Option<usize> {
    let at = core.len().checked_sub(suffix.len())?;
    (at > 0 && core.is_char_boundary(at) && core[at..].eq_ignore_ascii_case(suffix)).then_some(at)
}

fn prefix_end(core: &str, prefix: &str) -> Option<usize> {
    let at = prefix.len();
    (core.len() > at && core.is_char_boundary(at) && core[..at].eq_ignore_ascii_case(prefix)).then_some(at)
}

fn push_trailing(tail: &str, out: &mut Vec<String>) {
    let mut run = String::new();
    for c in tail.chars() {
        if run.chars().next().is_some_and(|r| r != c) {
            out.push(std::mem::take(&mut run));
        }
        run.push(c);
    }
    if !run.is_empty() {
        out.push(run);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn tok(line: &str, language: Language) -> Vec<String> {
        WordTokenizer::new().tokenize(line, language).unwrap()
    }

    #[test]
    fn test_punctuation_is_split_off() {
        assert_eq!(tok("Hello, world!", Language::English), ["Hello", ",", "world", "!"]);
        assert_eq!(tok("(yes)", Language::German), ["(", "yes", ")"]);
    }

    #[test]
    fn test_english_clitics() {
        assert_eq!(
            tok("I don't know, it's late...", Language::English),
            ["I", "do", "n't", "know", ",", "it", "'s", "late", "..."]
        );
        assert_eq!(tok("We'll see", Language::English), ["We", "'ll", "see"]);
    }

    #[test]
    fn test_french_elision() {
        assert_eq!(tok("l'homme est là.", Language::French), ["l'", "homme", "est", "là", "."]);
        assert_eq!(tok("Qu'il vienne", Language::French), ["Qu'", "il", "vienne"]);
    }

    #[test]
    fn test_rules_are_language_specific() {
        // English clitic rules do not fire for German text
        assert_eq!(tok("geht's", Language::German), ["geht's"]);
        assert_eq!(tok("l'homme", Language::English), ["l'homme"]);
    }

    #[test]
    fn test_punctuation_only_chunk_stays_whole() {
        assert_eq!(tok("wait -- what", Language::English), ["wait", "--", "what"]);
    }

    #[test]
    fn test_empty_and_blank_lines() {
        assert!(tok("", Language::English).is_empty());
        assert!(tok("   \t ", Language::English).is_empty());
    }

    #[test]
    fn test_non_ascii_words_survive() {
        assert_eq!(tok("Привет, мир", Language::Russian), ["Привет", ",", "мир"]);
    }
}
