// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Train + validation loop using Adam.
//
//   - Training runs on TrainBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on the inner backend; dev and
//     test losses and sample generation run there (no dropout, no
//     parameter updates)
//   - Batches come from Burn DataLoaders; the train loader reshuffles
//     every epoch from the configured seed
//   - The best dev epoch is kept in memory and on disk; training stops
//     early after `stopping_step` epochs without improvement

use std::sync::Arc;

use anyhow::Result;
use burn::{
    data::{
        dataloader::{DataLoader, DataLoaderBuilder},
        dataset::Dataset,
    },
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::backend::AutodiffBackend,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{Seq2SeqBatch, Seq2SeqBatcher},
    dataset::PairedDataset,
};
use crate::domain::corpus::{Split, SplitCorpus};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{RnnEncDec, RnnEncDecConfig};

type TrainBackend = burn::backend::Autodiff<burn::backend::Wgpu>;

type BatchLoader<B> = Arc<dyn DataLoader<B, Seq2SeqBatch<B>>>;

/// Outcome of a finished run.
#[derive(Debug, Clone)]
pub struct TrainingReport {
    pub epochs_run:      usize,
    pub best_epoch:      usize,
    pub best_valid_loss: f64,
    pub test_loss:       f64,
    pub samples:         Vec<Vec<String>>,
}

pub fn run_training(
    cfg:          &TrainConfig,
    model_cfg:    &RnnEncDecConfig,
    corpora:      &[SplitCorpus],
    ckpt_manager: CheckpointManager,
) -> Result<TrainingReport> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop::<TrainBackend>(cfg, model_cfg, corpora, ckpt_manager, device)
}

pub fn train_loop<B: AutodiffBackend>(
    cfg:          &TrainConfig,
    model_cfg:    &RnnEncDecConfig,
    corpora:      &[SplitCorpus],
    ckpt_manager: CheckpointManager,
    device:       B::Device,
) -> Result<TrainingReport> {
    let split = |s: Split| corpora.iter().find(|c| c.split() == s);
    let train = split(Split::Train).ok_or_else(|| anyhow::anyhow!("no train split"))?;

    let train_dataset = PairedDataset::from_corpus(train);
    anyhow::ensure!(!train_dataset.is_empty(), "train split has no cases");

    // ── Data loaders ──────────────────────────────────────────────────────────
    let train_loader: BatchLoader<B> = DataLoaderBuilder::new(Seq2SeqBatcher::new())
        .batch_size(cfg.batch_size)
        .shuffle(cfg.seed)
        .set_device(device.clone())
        .build(train_dataset);
    let dev_loader  = split(Split::Dev).map(|c| eval_loader::<B::InnerBackend>(c, cfg.batch_size, &device));
    let test_loader = split(Split::Test).map(|c| eval_loader::<B::InnerBackend>(c, cfg.batch_size, &device));

    // ── Build model ───────────────────────────────────────────────────────────
    let mut model: RnnEncDec<B> = model_cfg.init(&device);
    tracing::info!(
        "Model ready: {:?} x{} layers, hidden={}, bidirectional={}, vocab {} -> {}",
        model_cfg.rnn_type, model_cfg.num_layers, model_cfg.hidden_size,
        model.encoder.is_bidirectional(),
        model_cfg.source_vocab_size, model_cfg.target_vocab_size,
    );

    // ── Adam optimiser ────────────────────────────────────────────────────────
    let optim_cfg = AdamConfig::new()
        .with_grad_clipping(cfg.clip_grad_norm.map(|n| GradientClippingConfig::Norm(n as f32)));
    let mut optim = optim_cfg.init();

    let metrics = MetricsLogger::new(ckpt_manager.dir().clone())?;

    let mut best_valid_loss = f64::INFINITY;
    let mut best_epoch      = 0usize;
    let mut best_model      = model.valid();
    let mut epochs_run      = 0usize;

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        epochs_run = epoch;

        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for batch in train_loader.iter() {
            let loss = model.compute_loss(batch);

            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }
        let avg_train_loss = train_loss_sum / train_batches.max(1) as f64;

        // ── Validation phase ──────────────────────────────────────────────────
        let model_valid = model.valid();
        let valid_loss  = dev_loader
            .as_ref()
            .filter(|l| l.num_items() > 0)
            .map(|l| evaluate_loss(&model_valid, l.as_ref()))
            .unwrap_or(avg_train_loss);

        let row = EpochMetrics::new(epoch, avg_train_loss, valid_loss);
        metrics.log(&row)?;
        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | valid_loss={:.4} | valid_ppl={:.2}",
            epoch, cfg.epochs, avg_train_loss, valid_loss, row.valid_perplexity(),
        );

        ckpt_manager.save_model(&model, epoch)?;

        if row.is_improvement(best_valid_loss) {
            best_valid_loss = valid_loss;
            best_epoch      = epoch;
            ckpt_manager.save_best(&model_valid, epoch)?;
            best_model = model_valid;
        } else if let Some(patience) = cfg.stopping_step {
            if epoch - best_epoch >= patience {
                tracing::info!(
                    "No improvement for {} epochs, stopping after epoch {} (best epoch {})",
                    patience, epoch, best_epoch
                );
                break;
            }
        }
    }

    // ── Final evaluation on the best model ────────────────────────────────────
    let test_loss = test_loader
        .as_ref()
        .map(|l| evaluate_loss(&best_model, l.as_ref()))
        .unwrap_or(f64::NAN);
    tracing::info!("Best epoch {} | valid_loss={:.4} | test_loss={:.4}",
        best_epoch, best_valid_loss, test_loss);

    let samples = best_model.generate(train.target_vocab(), cfg.num_samples, cfg.max_gen_len, &device);
    for (i, sample) in samples.iter().enumerate() {
        tracing::info!("Sample {}: {}", i + 1, sample.join(" "));
    }

    tracing::info!("Training complete! Metrics in '{}'", metrics.csv_path().display());
    Ok(TrainingReport { epochs_run, best_epoch, best_valid_loss, test_loss, samples })
}

/// Unshuffled loader over one split, for evaluation on the inner backend.
fn eval_loader<B: Backend>(corpus: &SplitCorpus, batch_size: usize, device: &B::Device) -> BatchLoader<B> {
    DataLoaderBuilder::new(Seq2SeqBatcher::new())
        .batch_size(batch_size)
        .set_device(device.clone())
        .build(PairedDataset::from_corpus(corpus))
}

/// Mean loss over every batch of a loader, without gradients.
/// An empty loader yields NaN.
pub fn evaluate_loss<B: Backend>(
    model:  &RnnEncDec<B>,
    loader: &dyn DataLoader<B, Seq2SeqBatch<B>>,
) -> f64 {
    let mut loss_sum = 0.0f64;
    let mut batches  = 0usize;
    for batch in loader.iter() {
        loss_sum += model.compute_loss(batch).into_scalar().elem::<f64>();
        batches  += 1;
    }
    if batches > 0 { loss_sum / batches as f64 } else { f64::NAN }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::assembler::CorpusAssembler;
    use crate::data::config::DatasetConfig;
    use crate::domain::corpus::{PairedTextData, SplitText};
    use crate::domain::vocabulary::SpecialToken;
    use crate::ml::rnn::RnnType;
    use burn::backend::{Autodiff, NdArray};
    use tempfile::tempdir;

    type TestAutodiff = Autodiff<NdArray>;

    fn line(raw: &str) -> Vec<String> {
        raw.split_whitespace().map(str::to_owned).collect()
    }

    fn corpora() -> Vec<SplitCorpus> {
        let pairs = |raw: &[(&str, &str)]| SplitText {
            source: raw.iter().map(|(s, _)| line(s)).collect(),
            target: raw.iter().map(|(_, t)| line(t)).collect(),
        };
        let data = PairedTextData {
            splits: [
                pairs(&[("a b", "x y"), ("b c", "y z"), ("c a", "z x")]),
                pairs(&[("a c", "x z")]),
                pairs(&[("b a", "y x")]),
            ],
        };
        let resolved = DatasetConfig::default().resolve().unwrap();
        CorpusAssembler::new(&resolved).assemble(data).unwrap()
    }

    fn config(dir: &std::path::Path) -> TrainConfig {
        TrainConfig {
            checkpoint_dir: dir.to_string_lossy().into_owned(),
            embedding_size: 6,
            hidden_size:    8,
            num_layers:     1,
            rnn_type:       RnnType::Gru,
            dropout:        0.0,
            epochs:         3,
            batch_size:     2,
            lr:             1e-2,
            stopping_step:  None,
            num_samples:    4,
            max_gen_len:    5,
            ..TrainConfig::default()
        }
    }

    #[test]
    fn test_train_loop_runs_and_reports() {
        let dir       = tempdir().unwrap();
        let cfg       = config(dir.path());
        let corpora   = corpora();
        let model_cfg = cfg.model_config(corpora[0].source_vocab().len(), corpora[0].target_vocab().len());
        let ckpt      = CheckpointManager::new(cfg.checkpoint_dir.clone());

        let report = train_loop::<TestAutodiff>(&cfg, &model_cfg, &corpora, ckpt, Default::default())
            .unwrap();

        assert_eq!(report.epochs_run, 3);
        assert!(report.best_epoch >= 1);
        assert!(report.best_valid_loss.is_finite());
        assert!(report.test_loss.is_finite());
        assert_eq!(report.samples.len(), 4);
        for sample in &report.samples {
            assert!(sample.len() <= 5);
            assert!(!sample.iter().any(|t| t == SpecialToken::EndOfSequence.as_str()));
        }
        let csv = std::fs::read_to_string(dir.path().join("metrics.csv")).unwrap();
        assert_eq!(csv.lines().count(), 4);
        assert!(dir.path().join("best_epoch.json").exists());
    }

    #[test]
    fn test_evaluate_loss_on_empty_split_is_nan() {
        let device = Default::default();
        let model  = RnnEncDecConfig::new(8, 8).with_embedding_size(4).with_hidden_size(4)
            .init::<NdArray>(&device);
        let vocab  = Arc::new(crate::domain::vocabulary::Vocabulary::from_tokens(Vec::new()));
        let empty  = SplitCorpus::new(Split::Dev, vocab.clone(), vocab, SplitText::default()).unwrap();
        let loader = eval_loader::<NdArray>(&empty, 4, &device);
        assert!(evaluate_loss(&model, loader.as_ref()).is_nan());
    }

    #[test]
    fn test_evaluate_loss_covers_every_batch() {
        let device  = Default::default();
        let corpora = corpora();
        let model   = RnnEncDecConfig::new(corpora[0].source_vocab().len(), corpora[0].target_vocab().len())
            .with_embedding_size(4)
            .with_hidden_size(4)
            .init::<NdArray>(&device);
        let loader  = eval_loader::<NdArray>(&corpora[0], 2, &device);
        assert_eq!(loader.num_items(), 3);
        let loss = evaluate_loss(&model, loader.as_ref());
        assert!(loss.is_finite() && loss > 0.0);
    }
}
