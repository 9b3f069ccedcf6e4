// ============================================================
// Layer 5 — Generator
// ============================================================
// Rebuilds a trained model from a checkpoint directory and
// produces greedy samples in the target language.
use anyhow::Result;
use burn::prelude::*;

use crate::data::config::Side;
use crate::domain::vocabulary::Vocabulary;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::RnnEncDec;

type InferBackend = burn::backend::Wgpu;

pub struct Generator<B: Backend = InferBackend> {
    model:        RnnEncDec<B>,
    target_vocab: Vocabulary,
    device:       B::Device,
}

impl Generator<InferBackend> {
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        Self::load(ckpt_manager, device)
    }
}

impl<B: Backend> Generator<B> {
    /// Load architecture, target vocabulary and weights on `device`.
    pub fn load(ckpt_manager: &CheckpointManager, device: B::Device) -> Result<Self> {
        let model_cfg    = ckpt_manager.load_model_config()?;
        let target_vocab = ckpt_manager.load_vocab(Side::Target)?;
        anyhow::ensure!(
            target_vocab.len() == model_cfg.target_vocab_size,
            "target vocabulary has {} tokens but the model expects {}",
            target_vocab.len(),
            model_cfg.target_vocab_size,
        );

        let model: RnnEncDec<B> = model_cfg.with_dropout_ratio(0.0).init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self { model, target_vocab, device })
    }

    pub fn generate(&self, number_to_gen: usize, max_len: usize) -> Vec<Vec<String>> {
        self.model.generate(&self.target_vocab, number_to_gen, max_len, &self.device)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::vocabulary::SpecialToken;
    use crate::ml::model::RnnEncDecConfig;
    use crate::ml::rnn::RnnType;
    use burn::backend::NdArray;
    use tempfile::tempdir;

    fn target_vocab() -> Vocabulary {
        let words = vec!["guten".to_string(), "tag".to_string(), "welt".to_string()];
        Vocabulary::build(&vec![words], 100)
    }

    #[test]
    fn test_load_and_generate_from_saved_run() {
        let dir    = tempdir().unwrap();
        let mgr    = CheckpointManager::new(dir.path().to_string_lossy().into_owned());
        let device = Default::default();
        let vocab  = target_vocab();
        let cfg    = RnnEncDecConfig::new(6, vocab.len())
            .with_embedding_size(4)
            .with_hidden_size(6)
            .with_rnn_type(RnnType::Gru);

        mgr.save_model_config(&cfg).unwrap();
        mgr.save_vocab(Side::Target, &vocab).unwrap();
        mgr.save_best(&cfg.init::<NdArray>(&device), 1).unwrap();

        let generator = Generator::<NdArray>::load(&mgr, device).unwrap();
        let samples   = generator.generate(3, 7);
        assert_eq!(samples.len(), 3);
        for sample in &samples {
            assert!(sample.len() <= 7);
            assert!(!sample.iter().any(|t| t == SpecialToken::EndOfSequence.as_str()));
        }
    }

    #[test]
    fn test_vocab_size_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path().to_string_lossy().into_owned());
        mgr.save_model_config(&RnnEncDecConfig::new(6, 50)).unwrap();
        mgr.save_vocab(Side::Target, &target_vocab()).unwrap();
        assert!(Generator::<NdArray>::load(&mgr, Default::default()).is_err());
    }

    #[test]
    fn test_missing_checkpoint_is_an_error() {
        let dir = tempdir().unwrap();
        let mgr = CheckpointManager::new(dir.path().to_string_lossy().into_owned());
        assert!(Generator::<NdArray>::load(&mgr, Default::default()).is_err());
    }
}
