// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Resolve dataset config      (Layer 4 - data)
//   Step 2: Load and tokenise splits    (Layer 4 - data)
//   Step 3: Assemble split corpora      (Layer 4 - data)
//   Step 4: Save configs + vocabularies (Layer 6 - infra)
//   Step 5: Run training loop           (Layer 5 - ml)
//   Step 6: Print generated samples     (Layer 2)

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::{
    assembler::CorpusAssembler,
    config::{DatasetConfig, Side},
    loader::PairedCorpusLoader,
    tokenizer::WordTokenizer,
};
use crate::domain::corpus::SplitCorpus;
use crate::domain::traits::CorpusSource;
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::RnnEncDecConfig;
use crate::ml::rnn::{CombineMethod, RnnType};
use crate::ml::trainer::{run_training, TrainingReport};

// ─── Training Configuration ──────────────────────────────────────────────────
// All settings for a training run.
// Serialisable so it can be saved next to the checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub dataset:        DatasetConfig,
    pub checkpoint_dir: String,
    pub embedding_size: usize,
    pub hidden_size:    usize,
    pub num_layers:     usize,
    pub rnn_type:       RnnType,
    pub bidirectional:  bool,
    pub combine_method: CombineMethod,
    pub dropout:        f64,
    pub epochs:         usize,
    pub batch_size:     usize,
    pub lr:             f64,
    pub clip_grad_norm: Option<f64>,
    pub stopping_step:  Option<usize>,
    pub seed:           u64,
    pub num_samples:    usize,
    pub max_gen_len:    usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            dataset:        DatasetConfig::default(),
            checkpoint_dir: "checkpoints".to_string(),
            embedding_size: 128,
            hidden_size:    256,
            num_layers:     2,
            rnn_type:       RnnType::Lstm,
            bidirectional:  true,
            combine_method: CombineMethod::Concat,
            dropout:        0.3,
            epochs:         20,
            batch_size:     32,
            lr:             1e-3,
            clip_grad_norm: Some(0.1),
            stopping_step:  Some(2),
            seed:           2020,
            num_samples:    10,
            max_gen_len:    100,
        }
    }
}

impl TrainConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size > 0, "batch_size must be positive");
        ensure!(self.epochs > 0, "epochs must be positive");
        ensure!(self.lr > 0.0, "lr must be positive, got {}", self.lr);
        Ok(())
    }

    /// Model architecture for the given vocabulary sizes.
    pub fn model_config(&self, source_vocab_size: usize, target_vocab_size: usize) -> RnnEncDecConfig {
        RnnEncDecConfig::new(source_vocab_size, target_vocab_size)
            .with_embedding_size(self.embedding_size)
            .with_hidden_size(self.hidden_size)
            .with_num_layers(self.num_layers)
            .with_rnn_type(self.rnn_type)
            .with_bidirectional(self.bidirectional)
            .with_combine_method(self.combine_method)
            .with_dropout_ratio(self.dropout)
    }
}

pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Load the corpus and return the three split records.
    pub fn prepare_corpora(&self) -> Result<Vec<SplitCorpus>> {
        let resolved = self.config.dataset.resolve()?;
        tracing::info!("Loading paired corpus from '{}'", resolved.data_dir.display());

        let data = PairedCorpusLoader::new(&resolved, WordTokenizer::new())
            .load()
            .with_context(|| format!("Cannot load dataset '{}'", resolved.data_dir.display()))?;
        Ok(CorpusAssembler::new(&resolved).assemble(data)?)
    }

    pub fn execute(&self) -> Result<TrainingReport> {
        let cfg = &self.config;
        cfg.validate()?;

        let corpora = self.prepare_corpora()?;
        let train   = &corpora[0];

        let model_cfg = cfg.model_config(train.source_vocab().len(), train.target_vocab().len());
        model_cfg.validate()?;

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(cfg)?;
        ckpt_manager.save_model_config(&model_cfg)?;
        ckpt_manager.save_vocab(Side::Source, train.source_vocab())?;
        ckpt_manager.save_vocab(Side::Target, train.target_vocab())?;

        run_training(cfg, &model_cfg, &corpora, ckpt_manager)
    }
}
