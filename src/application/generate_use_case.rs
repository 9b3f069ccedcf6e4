// ============================================================
// Layer 2 — Generate Use Case
// ============================================================
// Loads a finished training run from its checkpoint directory
// and produces greedy samples in the target language.

use anyhow::{ensure, Result};

use crate::infra::checkpoint::CheckpointManager;
use crate::ml::generator::Generator;

pub struct GenerateUseCase {
    generator: Generator,
}

impl GenerateUseCase {
    pub fn new(checkpoint_dir: &str) -> Result<Self> {
        let ckpt      = CheckpointManager::new(checkpoint_dir);
        let generator = Generator::from_checkpoint(&ckpt)?;
        Ok(Self { generator })
    }

    /// `num_samples` sequences of at most `max_len` tokens each.
    pub fn generate(&self, num_samples: usize, max_len: usize) -> Result<Vec<Vec<String>>> {
        ensure!(num_samples > 0, "num_samples must be positive");
        Ok(self.generator.generate(num_samples, max_len))
    }
}
