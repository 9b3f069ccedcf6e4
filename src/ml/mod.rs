// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model code lives here.
//
//   rnn.rs       — recurrent cells (RNN, GRU, LSTM), masked
//                  encoder with optional second direction,
//                  stacked decoder
//   model.rs     — encoder-decoder with embeddings, output
//                  projection, masked loss and greedy decoding
//   trainer.rs   — epoch loop: Adam, dev evaluation, early
//                  stopping, checkpoints, metrics
//   generator.rs — restores a checkpoint for sampling

/// Recurrent building blocks
pub mod rnn;

/// Encoder-decoder model
pub mod model;

/// Training loop with validation and checkpointing
pub mod trainer;

/// Checkpoint-backed sample generation
pub mod generator;
