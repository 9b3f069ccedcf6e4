// ============================================================
// Layer 4 — Corpus Assembler
// ============================================================
// Turns loaded text into the three records training consumes:
//
//   1. Build the source vocabulary over all three splits
//   2. Build the target vocabulary over all three splits
//   3. Wrap each in an Arc so every split shares one allocation
//   4. Package train / dev / test into SplitCorpus records
//   5. Log the vocabulary sizes and the case count of each split

use std::sync::Arc;

use crate::data::config::ResolvedDatasetConfig;
use crate::domain::corpus::{PairedTextData, Split, SplitCorpus};
use crate::domain::error::Result;
use crate::domain::vocabulary::Vocabulary;

pub struct CorpusAssembler<'a> {
    config: &'a ResolvedDatasetConfig,
}

impl<'a> CorpusAssembler<'a> {
    pub fn new(config: &'a ResolvedDatasetConfig) -> Self {
        Self { config }
    }

    /// Returns the split records in train, dev, test order.
    pub fn assemble(&self, data: PairedTextData) -> Result<Vec<SplitCorpus>> {
        let source_vocab = Arc::new(Vocabulary::build(
            data.all_source_lines(),
            self.config.source.max_vocab_size,
        ));
        let target_vocab = Arc::new(Vocabulary::build(
            data.all_target_lines(),
            self.config.target.max_vocab_size,
        ));
        tracing::info!(
            "Source vocab size: {}, Target vocab size: {}",
            source_vocab.len(),
            target_vocab.len()
        );

        let PairedTextData { splits } = data;
        let corpora = Split::ALL
            .into_iter()
            .zip(splits)
            .map(|(split, text)| {
                SplitCorpus::new(split, Arc::clone(&source_vocab), Arc::clone(&target_vocab), text)
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!("{}", summary(&corpora));
        Ok(corpora)
    }
}

/// `train: N cases, dev: N cases, test: N cases`
pub fn summary(corpora: &[SplitCorpus]) -> String {
    corpora
        .iter()
        .map(|c| format!("{}: {} cases", c.split(), c.len()))
        .collect::<Vec<_>>()
        .join(", ")
}
