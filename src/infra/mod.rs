// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting persistence used by training and generation:
//
//   checkpoint.rs — Model weights through Burn's CompactRecorder,
//                   plus JSON files for the training config, the
//                   model config and both vocabularies, so the
//                   `generate` command can rebuild everything.
//
//   metrics.rs    — Per-epoch loss rows appended to a CSV file.

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
