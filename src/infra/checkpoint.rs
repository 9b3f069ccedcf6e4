// ============================================================
// Layer 6 — Checkpoint Manager
// ============================================================
// Saves and restores everything a run needs to be reproduced.
//
// File layout:
//   checkpoints/
//     model_epoch_1.*        ← weights after epoch 1 (CompactRecorder)
//     model_best.*           ← weights of the best validation epoch
//     latest_epoch.json      ← number of the latest saved epoch
//     best_epoch.json        ← number of the epoch behind model_best
//     train_config.json      ← full TrainConfig
//     model_config.json      ← RnnEncDecConfig (architecture + vocab sizes)
//     source_vocab.json      ← source tokens in id order
//     target_vocab.json      ← target tokens in id order

use anyhow::{Context, Result};
use std::{fs, path::PathBuf};
use burn::{
    prelude::*,
    record::{CompactRecorder, Recorder},
    tensor::backend::AutodiffBackend,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::application::train_use_case::TrainConfig;
use crate::data::config::Side;
use crate::domain::vocabulary::Vocabulary;
use crate::ml::model::{RnnEncDec, RnnEncDecConfig};

pub struct CheckpointManager {
    dir: PathBuf,
}

impl CheckpointManager {
    /// Create a new CheckpointManager.
    /// Creates the directory if it doesn't already exist.
    pub fn new(dir: impl Into<String>) -> Self {
        let dir = PathBuf::from(dir.into());
        fs::create_dir_all(&dir).ok();
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Save model weights for a given epoch and move the latest pointer.
    pub fn save_model<B: AutodiffBackend>(
        &self,
        model: &RnnEncDec<B>,
        epoch: usize,
    ) -> Result<()> {
        self.record(model, &format!("model_epoch_{epoch}"))?;
        self.write_json("latest_epoch.json", &epoch)?;
        tracing::debug!("Saved checkpoint: epoch {}", epoch);
        Ok(())
    }

    /// Save the weights of the best epoch so far.
    pub fn save_best<B: Backend>(&self, model: &RnnEncDec<B>, epoch: usize) -> Result<()> {
        self.record(model, "model_best")?;
        self.write_json("best_epoch.json", &epoch)?;
        tracing::debug!("Saved best checkpoint: epoch {}", epoch);
        Ok(())
    }

    fn record<B: Backend>(&self, model: &RnnEncDec<B>, name: &str) -> Result<()> {
        let path = self.dir.join(name);
        CompactRecorder::new()
            .record(model.clone().into_record(), path.clone())
            .with_context(|| format!("Failed to save checkpoint to '{}'", path.display()))
    }

    /// Load the best weights, or the latest epoch if no best was recorded.
    pub fn load_model<B: Backend>(
        &self,
        model:  RnnEncDec<B>,
        device: &B::Device,
    ) -> Result<RnnEncDec<B>> {
        let name = match self.read_json::<usize>("best_epoch.json") {
            Ok(epoch) => {
                tracing::info!("Loading best checkpoint (epoch {})", epoch);
                "model_best".to_string()
            }
            Err(_) => {
                let epoch = self.latest_epoch()?;
                tracing::info!("Loading checkpoint from epoch {}", epoch);
                format!("model_epoch_{epoch}")
            }
        };
        let path = self.dir.join(name);

        let record = CompactRecorder::new()
            .load(path.clone(), device)
            .with_context(|| {
                format!("Cannot load checkpoint '{}'. Have you trained the model first?",
                    path.display())
            })?;

        Ok(model.load_record(record))
    }

    pub fn save_config(&self, cfg: &TrainConfig) -> Result<()> {
        self.write_json("train_config.json", cfg)
    }

    pub fn save_model_config(&self, cfg: &RnnEncDecConfig) -> Result<()> {
        self.write_json("model_config.json", cfg)
    }

    pub fn load_model_config(&self) -> Result<RnnEncDecConfig> {
        self.read_json("model_config.json")
    }

    pub fn save_vocab(&self, side: Side, vocab: &Vocabulary) -> Result<()> {
        self.write_json(vocab_file(side), vocab)
    }

    pub fn load_vocab(&self, side: Side) -> Result<Vocabulary> {
        self.read_json(vocab_file(side))
    }

    fn latest_epoch(&self) -> Result<usize> {
        self.read_json("latest_epoch.json")
            .context("Cannot find 'latest_epoch.json'. Have you run 'train' first?")
    }

    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&path, json)
            .with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let path = self.dir.join(name);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}

fn vocab_file(side: Side) -> &'static str {
    match side {
        Side::Source => "source_vocab.json",
        Side::Target => "target_vocab.json",
    }
}
