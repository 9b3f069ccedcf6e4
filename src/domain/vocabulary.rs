// ============================================================
// Layer 3 — Vocabulary
// ============================================================
// Bidirectional token <-> id mapping for one language side.
//
// Construction (Vocabulary::build):
//   1. Flatten every tokenised line of every split into one stream
//   2. Keep each distinct token once, in order of first occurrence
//      (frequency is counted but never used for ordering)
//   3. Prepend the four reserved tokens in fixed order
//   4. Truncate the list to the configured maximum size
//   5. Assign ids 0..k-1 by position
//
// Tokens cut off by step 4 are simply absent: callers map them to
// the unknown token through `token_to_id_or_unk`.
//
// The type has no mutating methods. Once built it is shared
// read-only (behind an Arc) by all three split records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The four reserved tokens, in id order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialToken {
    Padding,
    Unknown,
    StartOfSequence,
    EndOfSequence,
}

impl SpecialToken {
    pub const ALL: [SpecialToken; 4] = [
        SpecialToken::Padding,
        SpecialToken::Unknown,
        SpecialToken::StartOfSequence,
        SpecialToken::EndOfSequence,
    ];

    /// Fixed id of this token in every vocabulary.
    pub const fn id(self) -> usize {
        self as usize
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SpecialToken::Padding         => "<|pad|>",
            SpecialToken::Unknown         => "<|unk|>",
            SpecialToken::StartOfSequence => "<|startoftext|>",
            SpecialToken::EndOfSequence   => "<|endoftext|>",
        }
    }
}

pub const PAD_ID: usize = SpecialToken::Padding.id();
pub const UNK_ID: usize = SpecialToken::Unknown.id();
pub const SOS_ID: usize = SpecialToken::StartOfSequence.id();
pub const EOS_ID: usize = SpecialToken::EndOfSequence.id();

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Vocabulary {
    idx2token: Vec<String>,
    token2idx: HashMap<String, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from tokenised lines, capped at `max_size` entries.
    pub fn build<'a, I>(lines: I, max_size: usize) -> Self
    where
        I: IntoIterator<Item = &'a Vec<String>>,
    {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut ordered: Vec<&str> = Vec::new();

        for line in lines {
            for token in line {
                let count = counts.entry(token.as_str()).or_insert(0);
                if *count == 0 {
                    ordered.push(token.as_str());
                }
                *count += 1;
            }
        }

        let tokens: Vec<String> = SpecialToken::ALL
            .iter()
            .map(|t| t.as_str())
            .chain(ordered.into_iter().filter(|t| !is_reserved(t)))
            .take(max_size)
            .map(str::to_owned)
            .collect();

        tracing::debug!(
            "Built vocabulary: {} distinct corpus tokens, kept {} (cap {})",
            counts.len(),
            tokens.len(),
            max_size
        );

        Self::from_tokens(tokens)
    }

    /// Rebuild a vocabulary from its id-ordered token list.
    /// A repeated token keeps the id of its first position.
    pub fn from_tokens(idx2token: Vec<String>) -> Self {
        let mut token2idx = HashMap::with_capacity(idx2token.len());
        for (idx, token) in idx2token.iter().enumerate() {
            token2idx.entry(token.clone()).or_insert(idx);
        }
        Self { idx2token, token2idx }
    }

    pub fn len(&self) -> usize {
        self.idx2token.len()
    }

    pub fn token_to_id(&self, token: &str) -> Option<usize> {
        self.token2idx.get(token).copied()
    }

    /// Look up a token, falling back to the unknown token's id.
    pub fn token_to_id_or_unk(&self, token: &str) -> usize {
        self.token_to_id(token).unwrap_or(UNK_ID)
    }

    pub fn id_to_token(&self, id: usize) -> Option<&str> {
        self.idx2token.get(id).map(String::as_str)
    }

    pub fn encode<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<usize> {
        tokens.iter().map(|t| self.token_to_id_or_unk(t.as_ref())).collect()
    }
}

fn is_reserved(token: &str) -> bool {
    SpecialToken::ALL.iter().any(|t| t.as_str() == token)
}

impl From<Vec<String>> for Vocabulary {
    fn from(tokens: Vec<String>) -> Self {
        Self::from_tokens(tokens)
    }
}

impl From<Vocabulary> for Vec<String> {
    fn from(vocab: Vocabulary) -> Self {
        vocab.idx2token
    }
}
