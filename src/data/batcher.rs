// ============================================================
// Layer 4 — Seq2Seq Batcher
// ============================================================
// Stacks a Vec<PairedSample> into padded Int tensors.
//
//   Input:  N samples, source/target of varying lengths
//   Output: source [N, S_max], target [N, T_max], source lengths
//
// Short sequences are right-padded with the padding id (0).
// Source lengths are kept on the host; the encoder turns them
// into a step mask so padded steps never touch its state.

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::PairedSample;
use crate::domain::vocabulary::PAD_ID;

#[derive(Debug, Clone)]
pub struct Seq2SeqBatch<B: Backend> {
    /// Source ids — shape: [batch_size, source_len]
    pub source: Tensor<B, 2, Int>,

    /// Real (unpadded) length of each source row
    pub source_lengths: Vec<usize>,

    /// Target ids, framed with SOS/EOS — shape: [batch_size, target_len]
    pub target: Tensor<B, 2, Int>,
}

#[derive(Clone, Debug, Default)]
pub struct Seq2SeqBatcher;

impl Seq2SeqBatcher {
    pub fn new() -> Self {
        Self
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The DataLoader calls .batch(items, device) with each mini-batch of samples.
impl<B: Backend> Batcher<B, PairedSample, Seq2SeqBatch<B>> for Seq2SeqBatcher {
    fn batch(&self, items: Vec<PairedSample>, device: &B::Device) -> Seq2SeqBatch<B> {
        let source_lengths: Vec<usize> = items.iter().map(PairedSample::source_len).collect();
        let source = pad_stack(items.iter().map(|s| s.source_ids.as_slice()), device);
        let target = pad_stack(items.iter().map(|s| s.target_ids.as_slice()), device);
        Seq2SeqBatch { source, source_lengths, target }
    }
}

/// Right-pad every row to the longest one and build a [rows, len] tensor.
fn pad_stack<'a, B, I>(rows: I, device: &B::Device) -> Tensor<B, 2, Int>
where
    B: Backend,
    I: Iterator<Item = &'a [usize]> + Clone,
{
    let batch_size = rows.clone().count();
    let seq_len    = rows.clone().map(<[usize]>::len).max().unwrap_or(0).max(1);

    let mut flat: Vec<i32> = Vec::with_capacity(batch_size * seq_len);
    for row in rows {
        flat.extend(row.iter().map(|&id| id as i32));
        flat.extend(std::iter::repeat(PAD_ID as i32).take(seq_len - row.len()));
    }

    Tensor::<B, 1, Int>::from_ints(flat.as_slice(), device)
        .reshape([batch_size, seq_len])
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn sample(source: &[usize], target: &[usize]) -> PairedSample {
        PairedSample { source_ids: source.to_vec(), target_ids: target.to_vec() }
    }

    fn batch(items: Vec<PairedSample>) -> Seq2SeqBatch<TestBackend> {
        Batcher::<TestBackend, _, _>::batch(&Seq2SeqBatcher::new(), items, &Default::default())
    }

    #[test]
    fn test_batch_pads_to_longest_row() {
        let batch = batch(vec![
            sample(&[2, 7, 3], &[2, 9, 9, 3]),
            sample(&[2, 3], &[2, 3]),
        ]);

        assert_eq!(batch.source.dims(), [2, 3]);
        assert_eq!(batch.target.dims(), [2, 4]);
        assert_eq!(batch.source_lengths, vec![3, 2]);

        let source: Vec<i64> = batch.source.into_data().iter::<i64>().collect();
        assert_eq!(source, vec![2, 7, 3, 2, 3, 0]);
        let target: Vec<i64> = batch.target.into_data().iter::<i64>().collect();
        assert_eq!(target, vec![2, 9, 9, 3, 2, 3, 0, 0]);
    }

    #[test]
    fn test_single_sample_batch() {
        let batch = batch(vec![sample(&[2, 5, 3], &[2, 3])]);
        assert_eq!(batch.source.dims(), [1, 3]);
        assert_eq!(batch.target.dims(), [1, 2]);
    }
}
