// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `generate`, and all
// their configurable flags.
//
// Per-side overrides (--source-max-vocab-size etc.) are optional;
// when absent the shared value applies to both sides.

use clap::{Args, Subcommand, ValueEnum};

use crate::application::train_use_case::TrainConfig;
use crate::data::config::DatasetConfig;
use crate::ml::rnn::{CombineMethod, RnnType};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train an encoder-decoder on a paired corpus
    Train(TrainArgs),

    /// Sample target-language sequences from a trained checkpoint
    Generate(GenerateArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum RnnTypeArg {
    Rnn,
    Gru,
    Lstm,
}

impl From<RnnTypeArg> for RnnType {
    fn from(a: RnnTypeArg) -> Self {
        match a {
            RnnTypeArg::Rnn  => RnnType::Rnn,
            RnnTypeArg::Gru  => RnnType::Gru,
            RnnTypeArg::Lstm => RnnType::Lstm,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum CombineArg {
    Sum,
    Concat,
}

impl From<CombineArg> for CombineMethod {
    fn from(a: CombineArg) -> Self {
        match a {
            CombineArg::Sum    => CombineMethod::Sum,
            CombineArg::Concat => CombineMethod::Concat,
        }
    }
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Directory holding {train,dev,test}.{source_suffix,target_suffix}
    #[arg(long, default_value = "dataset")]
    pub data_dir: String,

    #[arg(long, default_value = "src")]
    pub source_suffix: String,

    #[arg(long, default_value = "tgt")]
    pub target_suffix: String,

    /// Tokeniser language for source lines
    #[arg(long, default_value = "english")]
    pub source_language: String,

    /// Tokeniser language for target lines
    #[arg(long, default_value = "english")]
    pub target_language: String,

    /// Vocabulary cap shared by both sides (reserved tokens included)
    #[arg(long, default_value_t = 50_000)]
    pub max_vocab_size: usize,

    #[arg(long)]
    pub source_max_vocab_size: Option<usize>,

    #[arg(long)]
    pub target_max_vocab_size: Option<usize>,

    /// Lines are truncated to this many tokens
    #[arg(long, default_value_t = 100)]
    pub max_seq_length: usize,

    #[arg(long)]
    pub source_max_seq_length: Option<usize>,

    #[arg(long)]
    pub target_max_seq_length: Option<usize>,

    /// Directory to save model checkpoints, configs and vocabularies
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 128)]
    pub embedding_size: usize,

    #[arg(long, default_value_t = 256)]
    pub hidden_size: usize,

    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    #[arg(long, value_enum, default_value_t = RnnTypeArg::Lstm)]
    pub rnn_type: RnnTypeArg,

    /// Run a second encoder direction right to left
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub bidirectional: bool,

    /// How the two encoder directions are merged
    #[arg(long, value_enum, default_value_t = CombineArg::Concat)]
    pub combine_method: CombineArg,

    #[arg(long, default_value_t = 0.3)]
    pub dropout: f64,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Clip gradients to this global L2 norm
    #[arg(long)]
    pub clip_grad_norm: Option<f64>,

    /// Stop after this many epochs without a better dev loss
    #[arg(long, default_value_t = 2)]
    pub stopping_step: usize,

    #[arg(long, default_value_t = 2020)]
    pub seed: u64,

    /// Samples printed at the end of training
    #[arg(long, default_value_t = 10)]
    pub num_samples: usize,

    #[arg(long, default_value_t = 100)]
    pub max_gen_len: usize,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            dataset: DatasetConfig {
                data_dir:              a.data_dir,
                source_language:       a.source_language,
                target_language:       a.target_language,
                source_suffix:         a.source_suffix,
                target_suffix:         a.target_suffix,
                max_vocab_size:        Some(a.max_vocab_size),
                source_max_vocab_size: a.source_max_vocab_size,
                target_max_vocab_size: a.target_max_vocab_size,
                max_seq_length:        Some(a.max_seq_length),
                source_max_seq_length: a.source_max_seq_length,
                target_max_seq_length: a.target_max_seq_length,
            },
            checkpoint_dir: a.checkpoint_dir,
            embedding_size: a.embedding_size,
            hidden_size:    a.hidden_size,
            num_layers:     a.num_layers,
            rnn_type:       a.rnn_type.into(),
            bidirectional:  a.bidirectional,
            combine_method: a.combine_method.into(),
            dropout:        a.dropout,
            epochs:         a.epochs,
            batch_size:     a.batch_size,
            lr:             a.lr,
            clip_grad_norm: a.clip_grad_norm,
            stopping_step:  Some(a.stopping_step),
            seed:           a.seed,
            num_samples:    a.num_samples,
            max_gen_len:    a.max_gen_len,
        }
    }
}

/// All arguments for the `generate` command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    #[arg(long, default_value_t = 10)]
    pub num_samples: usize,

    /// Upper bound on tokens per sample
    #[arg(long, default_value_t = 100)]
    pub max_len: usize,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    fn parse(args: &[&str]) -> Commands {
        Cli::try_parse_from(args).unwrap().command
    }

    #[test]
    fn test_train_defaults_map_to_config() {
        let Commands::Train(args) = parse(&["paired-seq2seq", "train"]) else {
            panic!("expected train");
        };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.dataset.data_dir, "dataset");
        assert_eq!(cfg.rnn_type, RnnType::Lstm);
        assert_eq!(cfg.combine_method, CombineMethod::Concat);
        assert!(cfg.bidirectional);
        assert_eq!(cfg.stopping_step, Some(2));
        assert_eq!(cfg.dataset.source_max_vocab_size, None);
    }

    #[test]
    fn test_train_flags_override_defaults() {
        let Commands::Train(args) = parse(&[
            "paired-seq2seq", "train",
            "--rnn-type", "gru",
            "--bidirectional", "false",
            "--combine-method", "sum",
            "--target-max-vocab-size", "500",
            "--clip-grad-norm", "0.5",
        ]) else {
            panic!("expected train");
        };
        let cfg: TrainConfig = args.into();
        assert_eq!(cfg.rnn_type, RnnType::Gru);
        assert!(!cfg.bidirectional);
        assert_eq!(cfg.combine_method, CombineMethod::Sum);
        assert_eq!(cfg.dataset.target_max_vocab_size, Some(500));
        assert_eq!(cfg.clip_grad_norm, Some(0.5));
    }

    #[test]
    fn test_generate_args() {
        let Commands::Generate(args) = parse(&["paired-seq2seq", "generate", "--num-samples", "3"]) else {
            panic!("expected generate");
        };
        assert_eq!(args.num_samples, 3);
        assert_eq!(args.max_len, 100);
        assert_eq!(args.checkpoint_dir, "checkpoints");
    }

    #[test]
    fn test_unknown_rnn_type_is_rejected() {
        assert!(Cli::try_parse_from(["paired-seq2seq", "train", "--rnn-type", "transformer"]).is_err());
    }
}
