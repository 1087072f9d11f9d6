// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Model, training loop and epoch callbacks. Batching lives in
// the data layer; checkpoint files in infra.
//
//   model.rs     — embedding + masked-mean sentiment classifier,
//                  optionally seeded from a word-vector matrix
//
//   trainer.rs   — the ModelTrainer seam and its Burn
//                  implementation: fit with validation tail,
//                  Ctrl-C interruption, reload weights, predict
//
//   callbacks.rs — early stopping and best-model checkpointing
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

pub mod model;

pub mod trainer;

pub mod callbacks;
