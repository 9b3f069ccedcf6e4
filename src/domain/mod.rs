// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types that describe a paired corpus:
//   - the reserved tokens and the Vocabulary built per language side
//   - the three splits (train / dev / test) and their SplitCorpus records
//   - the tokenizer languages and the seams used by the data layer
//   - the DatasetError taxonomy
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits

/// Error taxonomy for loading and assembling corpora
pub mod error;

/// Reserved tokens and the immutable Vocabulary
pub mod vocabulary;

/// Split names and per-split corpus records
pub mod corpus;

/// Languages understood by the tokenizer
pub mod language;

/// Core abstractions (traits) that other layers implement
pub mod traits;
