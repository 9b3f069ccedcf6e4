use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::corpus::SplitCorpus;
use crate::domain::vocabulary::{EOS_ID, SOS_ID};

/// One source/target pair as vocabulary ids.
/// Both sides are framed: [SOS] tokens... [EOS]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairedSample {
    pub source_ids: Vec<usize>,
    pub target_ids: Vec<usize>,
}

impl PairedSample {
    /// Number of real source positions, framing included.
    pub fn source_len(&self) -> usize {
        self.source_ids.len()
    }
}

pub struct PairedDataset {
    samples: Vec<PairedSample>,
}

impl PairedDataset {
    /// Encode every pair of a split; tokens outside the vocabulary map to UNK.
    pub fn from_corpus(corpus: &SplitCorpus) -> Self {
        let source_vocab = corpus.source_vocab();
        let target_vocab = corpus.target_vocab();
        let samples = corpus
            .pairs()
            .map(|(source, target)| PairedSample {
                source_ids: frame(source_vocab.encode(source)),
                target_ids: frame(target_vocab.encode(target)),
            })
            .collect();
        Self { samples }
    }
}

fn frame(ids: Vec<usize>) -> Vec<usize> {
    let mut framed = Vec::with_capacity(ids.len() + 2);
    framed.push(SOS_ID);
    framed.extend(ids);
    framed.push(EOS_ID);
    framed
}

impl Dataset<PairedSample> for PairedDataset {
    fn get(&self, index: usize) -> Option<PairedSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::corpus::{Split, SplitText};
    use crate::domain::vocabulary::{Vocabulary, UNK_ID};
    use std::sync::Arc;

    fn line(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn test_samples_are_framed_and_encoded() {
        let source_vocab = Arc::new(Vocabulary::build(&vec![line("a b")], 100));
        let target_vocab = Arc::new(Vocabulary::build(&vec![line("x")], 100));
        let corpus = SplitCorpus::new(
            Split::Test,
            source_vocab,
            target_vocab,
            SplitText { source: vec![line("b q")], target: vec![line("x")] },
        )
        .unwrap();

        let dataset = PairedDataset::from_corpus(&corpus);
        assert_eq!(dataset.len(), 1);
        let sample = dataset.get(0).unwrap();
        assert_eq!(sample.source_ids, vec![SOS_ID, 5, UNK_ID, EOS_ID]);
        assert_eq!(sample.target_ids, vec![SOS_ID, 4, EOS_ID]);
        assert!(dataset.get(1).is_none());
    }

    #[test]
    fn test_empty_line_is_just_the_frame() {
        let vocab  = Arc::new(Vocabulary::build(&Vec::<Vec<String>>::new(), 100));
        let corpus = SplitCorpus::new(
            Split::Train,
            vocab.clone(),
            vocab,
            SplitText { source: vec![Vec::new()], target: vec![Vec::new()] },
        )
        .unwrap();
        let sample = PairedDataset::from_corpus(&corpus).get(0).unwrap();
        assert_eq!(sample.source_ids, vec![SOS_ID, EOS_ID]);
        assert_eq!(sample.source_len(), 2);
    }
}
