// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by more than one layer:
//
//   store.rs      — bincode persistence of the word-vector box
//                   and the prepared (split, representation)
//                   tensors
//
//   fetcher.rs    — runs the corpus download script
//
//   checkpoint.rs — model weights via Burn's CompactRecorder,
//                   plus JSON run configs
//
//   metrics.rs    — per-epoch metrics CSV
//
//   signal.rs     — Ctrl-C → shared stop flag
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Binary persistence of vectors and dataset tensors
pub mod store;

/// Corpus download script runner
pub mod fetcher;

/// Model checkpoint saving and loading
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;

/// Ctrl-C handling
pub mod signal;
