// ============================================================
// Layer 4 — Dataset Configuration
// ============================================================
// Two shapes of the same settings:
//
//   DatasetConfig          — what the user supplied. Per-side
//                            overrides are optional; a pair of
//                            overrides applies only when both
//                            sides are set.
//   ResolvedDatasetConfig  — built once by `resolve()`. Every
//                            effective value is precomputed per
//                            side, so nothing downstream looks at
//                            an Option again.
//
// Vocabulary size and sequence length resolve separately:
//   source_max_vocab_size + target_max_vocab_size, else max_vocab_size
//   source_max_seq_length + target_max_seq_length, else max_seq_length
// A single override without its partner is ignored and the shared
// value is used for both sides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::corpus::Split;
use crate::domain::error::{DatasetError, Result};
use crate::domain::language::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub data_dir:              String,
    pub source_language:       String,
    pub target_language:       String,
    pub source_suffix:         String,
    pub target_suffix:         String,
    pub max_vocab_size:        Option<usize>,
    pub source_max_vocab_size: Option<usize>,
    pub target_max_vocab_size: Option<usize>,
    pub max_seq_length:        Option<usize>,
    pub source_max_seq_length: Option<usize>,
    pub target_max_seq_length: Option<usize>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir:              "dataset".to_string(),
            source_language:       "english".to_string(),
            target_language:       "english".to_string(),
            source_suffix:         "src".to_string(),
            target_suffix:         "tgt".to_string(),
            max_vocab_size:        Some(50_000),
            source_max_vocab_size: None,
            target_max_vocab_size: None,
            max_seq_length:        Some(100),
            source_max_seq_length: None,
            target_max_seq_length: None,
        }
    }
}

impl DatasetConfig {
    /// Precompute every effective value. Fails if a setting has neither
    /// both overrides nor a shared value, or if a language name is unknown.
    pub fn resolve(&self) -> Result<ResolvedDatasetConfig> {
        let (source_vocab, target_vocab) = pick_pair(
            "max_vocab_size",
            self.source_max_vocab_size,
            self.target_max_vocab_size,
            self.max_vocab_size,
        )?;
        let (source_seq, target_seq) = pick_pair(
            "max_seq_length",
            self.source_max_seq_length,
            self.target_max_seq_length,
            self.max_seq_length,
        )?;
        let source = SideConfig {
            language:       self.source_language.parse()?,
            suffix:         self.source_suffix.clone(),
            max_vocab_size: source_vocab,
            max_seq_length: source_seq,
        };
        let target = SideConfig {
            language:       self.target_language.parse()?,
            suffix:         self.target_suffix.clone(),
            max_vocab_size: target_vocab,
            max_seq_length: target_seq,
        };
        if source.suffix.is_empty() || target.suffix.is_empty() {
            return Err(DatasetError::Config("file suffixes must not be empty".to_string()));
        }
        Ok(ResolvedDatasetConfig {
            data_dir: PathBuf::from(&self.data_dir),
            source,
            target,
        })
    }
}

/// (source, target): both overrides when both are set, else the shared value twice.
fn pick_pair(
    name:   &str,
    source: Option<usize>,
    target: Option<usize>,
    shared: Option<usize>,
) -> Result<(usize, usize)> {
    match (source, target) {
        (Some(source), Some(target)) => Ok((source, target)),
        _ => shared.map(|v| (v, v)).ok_or_else(|| {
            DatasetError::Config(format!(
                "{name} is unset and source_{name} / target_{name} are not both given"
            ))
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Source,
    Target,
}

/// Effective settings for one language side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideConfig {
    pub language:       Language,
    pub suffix:         String,
    pub max_vocab_size: usize,
    pub max_seq_length: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDatasetConfig {
    pub data_dir: PathBuf,
    pub source:   SideConfig,
    pub target:   SideConfig,
}

impl ResolvedDatasetConfig {
    pub fn side(&self, side: Side) -> &SideConfig {
        match side {
            Side::Source => &self.source,
            Side::Target => &self.target,
        }
    }

    /// `{data_dir}/{split}.{suffix}`
    pub fn file_path(&self, split: Split, side: Side) -> PathBuf {
        split_file(&self.data_dir, split, &self.side(side).suffix)
    }
}

fn split_file(dir: &Path, split: Split, suffix: &str) -> PathBuf {
    dir.join(format!("{}.{}", split.prefix(), suffix))
}
