// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: each use case wires the data,
// ml and infra layers together for one command. No tensor math
// and no printing happen here.

// Load corpus, build vocabularies, train, checkpoint
pub mod train_use_case;

// Restore a checkpoint and sample from the decoder
pub mod generate_use_case;
