// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw paired text files to padded tensor batches.
//
//   {split}.{suffix} files
//       │
//       ▼
//   DatasetConfig::resolve → effective per-side settings
//       │
//       ▼
//   PairedCorpusLoader     → reads, tokenises, truncates
//       │
//       ▼
//   CorpusAssembler        → vocabularies + three SplitCorpus records
//       │
//       ▼
//   PairedDataset          → ids framed with SOS/EOS (Burn Dataset)
//       │
//       ▼
//   Seq2SeqBatcher         → padded Int tensors
//
// Each module is responsible for exactly one step.

/// Raw and resolved dataset settings
pub mod config;

/// Language-aware word tokenizer
pub mod tokenizer;

/// Reads train/dev/test file pairs
pub mod loader;

/// Builds vocabularies and per-split corpus records
pub mod assembler;

/// Implements Burn's Dataset trait for id-encoded pairs
pub mod dataset;

/// Pads samples into tensor batches
pub mod batcher;
