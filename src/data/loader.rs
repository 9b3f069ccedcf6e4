// ============================================================
// Layer 4 — Paired Corpus Loader
// ============================================================
// Reads one source file and one target file per split:
//
//   {data_dir}/train.{source_suffix}   {data_dir}/train.{target_suffix}
//   {data_dir}/dev.{source_suffix}     {data_dir}/dev.{target_suffix}
//   {data_dir}/test.{source_suffix}    {data_dir}/test.{target_suffix}
//
// Only the training source file is checked up front (MissingFile).
// Any other absent file fails when it is opened (Io).
//
// Per line:
//   - trim surrounding whitespace
//   - tokenise with that side's language
//   - truncate to that side's max sequence length
//   - empty lines give empty token lists; they are kept, not skipped
//
// A split whose two files have different line counts is rejected
// (Misaligned) so that line i of the source always pairs with
// line i of the target.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::data::config::{ResolvedDatasetConfig, Side, SideConfig};
use crate::domain::corpus::{PairedTextData, Split, SplitText, TokenizedLine};
use crate::domain::error::{DatasetError, Result};
use crate::domain::traits::{CorpusSource, LineTokenizer};

pub struct PairedCorpusLoader<'a, T: LineTokenizer> {
    config:    &'a ResolvedDatasetConfig,
    tokenizer: T,
}

impl<'a, T: LineTokenizer> PairedCorpusLoader<'a, T> {
    pub fn new(config: &'a ResolvedDatasetConfig, tokenizer: T) -> Self {
        Self { config, tokenizer }
    }

    fn load_split(&self, split: Split) -> Result<SplitText> {
        let source = self.load_file(split, Side::Source)?;
        let target = self.load_file(split, Side::Target)?;
        if source.len() != target.len() {
            return Err(DatasetError::Misaligned {
                split,
                source_lines: source.len(),
                target_lines: target.len(),
            });
        }
        Ok(SplitText { source, target })
    }

    fn load_file(&self, split: Split, side: Side) -> Result<Vec<TokenizedLine>> {
        let path = self.config.file_path(split, side);
        let lines = read_tokenized(&path, self.config.side(side), &self.tokenizer)?;
        tracing::debug!("Loaded {} lines from '{}'", lines.len(), path.display());
        Ok(lines)
    }
}

impl<T: LineTokenizer> CorpusSource for PairedCorpusLoader<'_, T> {
    fn load(&self) -> Result<PairedTextData> {
        let train_source = self.config.file_path(Split::Train, Side::Source);
        if !train_source.is_file() {
            return Err(DatasetError::MissingFile(train_source));
        }

        let mut data = PairedTextData::default();
        for split in Split::ALL {
            data.splits[split.index()] = self.load_split(split)?;
        }
        tracing::debug!("Loaded {} pairs from '{}'", data.len(), self.config.data_dir.display());
        Ok(data)
    }
}

/// Tokenise every line of one file with the side's settings.
fn read_tokenized<T: LineTokenizer>(
    path:      &Path,
    side:      &SideConfig,
    tokenizer: &T,
) -> Result<Vec<TokenizedLine>> {
    let io_err = |source| DatasetError::Io { path: path.to_path_buf(), source };
    let reader = BufReader::new(File::open(path).map_err(io_err)?);

    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(io_err)?;
        let mut tokens = tokenizer.tokenize(line.trim(), side.language)?;
        tokens.truncate(side.max_seq_length);
        lines.push(tokens);
    }
    Ok(lines)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::config::DatasetConfig;
    use crate::data::tokenizer::WordTokenizer;
    use std::fs;
    use tempfile::tempdir;

    fn config(dir: &Path, max_seq_length: usize) -> ResolvedDatasetConfig {
        DatasetConfig {
            data_dir:       dir.to_string_lossy().into_owned(),
            max_seq_length: Some(max_seq_length),
            ..DatasetConfig::default()
        }
        .resolve()
        .unwrap()
    }

    fn write_all(dir: &Path, files: &[(&str, &str)]) {
        for (name, body) in files {
            fs::write(dir.join(name), body).unwrap();
        }
    }

    #[test]
    fn test_loads_three_aligned_splits() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[
            ("train.src", "a b\nc d\n"),
            ("train.tgt", "x y\nz w\n"),
            ("dev.src",   "e\n"),
            ("dev.tgt",   "v\n"),
            ("test.src",  "f g h\n"),
            ("test.tgt",  "u\n"),
        ]);
        let cfg  = config(dir.path(), 10);
        let data = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap();

        for split in Split::ALL {
            let text = data.split(split);
            assert_eq!(text.source.len(), text.target.len());
        }
        assert_eq!(data.split(Split::Train).source[1], ["c", "d"]);
        assert_eq!(data.split(Split::Test).source[0], ["f", "g", "h"]);
    }

    #[test]
    fn test_lines_are_truncated_to_max_length() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[
            ("train.src", "one two three four five\nshort\n"),
            ("train.tgt", "a b c d e f\nx\n"),
            ("dev.src", ""), ("dev.tgt", ""),
            ("test.src", ""), ("test.tgt", ""),
        ]);
        let cfg   = config(dir.path(), 3);
        let data  = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap();
        let train = data.split(Split::Train);
        assert_eq!(train.source[0], ["one", "two", "three"]);
        assert_eq!(train.source[1], ["short"]);
        assert_eq!(train.target[0].len(), 3);
    }

    #[test]
    fn test_each_side_uses_its_own_language_and_length() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[
            ("train.src", "l'homme a mangé la pomme\n"),
            ("train.tgt", "don't x y z\n"),
            ("dev.src", ""), ("dev.tgt", ""),
            ("test.src", ""), ("test.tgt", ""),
        ]);
        let cfg = DatasetConfig {
            data_dir:              dir.path().to_string_lossy().into_owned(),
            source_language:       "french".to_string(),
            target_language:       "english".to_string(),
            source_max_seq_length: Some(3),
            target_max_seq_length: Some(4),
            ..DatasetConfig::default()
        }
        .resolve()
        .unwrap();

        let data  = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap();
        let train = data.split(Split::Train);
        assert_eq!(train.source[0], ["l'", "homme", "a"]);
        assert_eq!(train.target[0], ["do", "n't", "x", "y"]);
    }

    #[test]
    fn test_empty_lines_are_kept() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[
            ("train.src", "a\n\nb\n"),
            ("train.tgt", "x\n\ny\n"),
            ("dev.src", ""), ("dev.tgt", ""),
            ("test.src", ""), ("test.tgt", ""),
        ]);
        let cfg  = config(dir.path(), 10);
        let data = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap();
        let train = data.split(Split::Train);
        assert_eq!(train.source.len(), 3);
        assert!(train.source[1].is_empty());
        assert!(train.target[1].is_empty());
    }

    #[test]
    fn test_missing_train_source_is_missing_file() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[("train.tgt", "x y\n")]);
        let cfg = config(dir.path(), 10);
        let err = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap_err();
        match err {
            DatasetError::MissingFile(path) => assert!(path.ends_with("train.src")),
            other => panic!("expected MissingFile, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_dev_file_fails_at_open_not_missing_file() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[("train.src", "a b\n"), ("train.tgt", "x y\n")]);
        let cfg = config(dir.path(), 10);
        let err = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap_err();
        match err {
            DatasetError::Io { path, .. } => assert!(path.ends_with("dev.src")),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_line_count_mismatch_is_misaligned() {
        let dir = tempdir().unwrap();
        write_all(dir.path(), &[
            ("train.src", "a\nb\n"),
            ("train.tgt", "x\n"),
            ("dev.src", ""), ("dev.tgt", ""),
            ("test.src", ""), ("test.tgt", ""),
        ]);
        let cfg = config(dir.path(), 10);
        let err = PairedCorpusLoader::new(&cfg, WordTokenizer::new()).load().unwrap_err();
        assert!(matches!(err, DatasetError::Misaligned { split: Split::Train, .. }));
    }
}
