// ============================================================
// Layer 3 — Splits and Split Corpora
// ============================================================
// A paired corpus is partitioned into three splits, always in the
// order train, dev, test. Each SplitCorpus holds the split's
// tokenised source and target lines (index-aligned: line i of the
// source pairs with line i of the target) plus handles to the two
// vocabularies. Every split holds the same Arc, never a copy.

use std::fmt;
use std::sync::Arc;

use crate::domain::error::{DatasetError, Result};
use crate::domain::vocabulary::Vocabulary;

/// One tokenised line.
pub type TokenizedLine = Vec<String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    /// File-name prefix, e.g. `train` in `train.src`.
    pub const fn prefix(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev   => "dev",
            Split::Test  => "test",
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Source and target lines of one split, before vocabularies exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitText {
    pub source: Vec<TokenizedLine>,
    pub target: Vec<TokenizedLine>,
}

/// Tokenised text for all three splits, indexed by `Split::index`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairedTextData {
    pub splits: [SplitText; 3],
}

impl PairedTextData {
    pub fn split(&self, split: Split) -> &SplitText {
        &self.splits[split.index()]
    }

    /// Every source line of every split, train first.
    pub fn all_source_lines(&self) -> impl Iterator<Item = &TokenizedLine> {
        self.splits.iter().flat_map(|s| s.source.iter())
    }

    /// Every target line of every split, train first.
    pub fn all_target_lines(&self) -> impl Iterator<Item = &TokenizedLine> {
        self.splits.iter().flat_map(|s| s.target.iter())
    }

    /// Total number of pairs across splits.
    pub fn len(&self) -> usize {
        self.splits.iter().map(|s| s.source.len()).sum()
    }
}

/// Self-contained record for one split, consumed by training.
#[derive(Debug, Clone)]
pub struct SplitCorpus {
    split:        Split,
    source_vocab: Arc<Vocabulary>,
    target_vocab: Arc<Vocabulary>,
    source_text:  Vec<TokenizedLine>,
    target_text:  Vec<TokenizedLine>,
}

impl SplitCorpus {
    /// Fails with `Misaligned` if the two line lists differ in length.
    pub fn new(
        split:        Split,
        source_vocab: Arc<Vocabulary>,
        target_vocab: Arc<Vocabulary>,
        text:         SplitText,
    ) -> Result<Self> {
        if text.source.len() != text.target.len() {
            return Err(DatasetError::Misaligned {
                split,
                source_lines: text.source.len(),
                target_lines: text.target.len(),
            });
        }
        Ok(Self {
            split,
            source_vocab,
            target_vocab,
            source_text: text.source,
            target_text: text.target,
        })
    }

    pub fn split(&self) -> Split {
        self.split
    }

    pub fn source_vocab(&self) -> &Arc<Vocabulary> {
        &self.source_vocab
    }

    pub fn target_vocab(&self) -> &Arc<Vocabulary> {
        &self.target_vocab
    }

    /// Iterate over (source, target) pairs in file order.
    pub fn pairs(&self) -> impl Iterator<Item = (&TokenizedLine, &TokenizedLine)> {
        self.source_text.iter().zip(self.target_text.iter())
    }

    /// Number of cases (pairs) in this split.
    pub fn len(&self) -> usize {
        self.source_text.len()
    }
}
