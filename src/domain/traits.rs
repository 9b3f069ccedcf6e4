// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The data layer reads lines and tokenises them through these
// seams, so a different tokenizer or corpus source can be swapped
// in without touching the loader or the assembler.

use crate::domain::corpus::{PairedTextData, TokenizedLine};
use crate::domain::error::Result;
use crate::domain::language::Language;

// ─── LineTokenizer ────────────────────────────────────────────────────────────
/// Turns one line of text into an ordered sequence of tokens.
///
/// Implementations:
///   - WordTokenizer → whitespace split + punctuation and clitic rules
pub trait LineTokenizer {
    fn tokenize(&self, line: &str, language: Language) -> Result<TokenizedLine>;
}

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce tokenised train/dev/test pairs.
///
/// Implementations:
///   - PairedCorpusLoader → reads `{split}.{suffix}` files from a directory
pub trait CorpusSource {
    fn load(&self) -> Result<PairedTextData>;
}
