// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The collaborators the pipeline talks to, expressed as traits
// so implementations are injected at assembly time:
//
//   Segmenter       — text → sentences of tokens
//   ParallelMapper  — order-preserving map over a batch
//   CorpusFetcher   — one-shot repair of a missing corpus
//   Persistable     — save/restore an object to a single file
//
// The application layer only sees these traits; tests swap in
// sequential or scripted implementations.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::Result;
use std::path::Path;

use crate::domain::document::Paragraph;
use crate::domain::error::CorpusError;

// ─── Segmenter ────────────────────────────────────────────────────────────────
/// Splits a cleaned review into sentences of tokens.
///
/// Implementations must be usable from several worker threads at once.
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> std::result::Result<Paragraph, CorpusError>;
}

// ─── ParallelMapper ───────────────────────────────────────────────────────────
/// Applies `f` to every item and returns the results in input order.
/// Blocks until every item has been processed.
///
/// Implementations:
///   - RayonMapper      → work-stealing thread pool
///   - SequentialMapper → plain iterator, used in tests
pub trait ParallelMapper {
    fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Send + Sync;
}

// ─── CorpusFetcher ────────────────────────────────────────────────────────────
/// Attempts to (re)download the corpus when the layout check fails.
pub trait CorpusFetcher {
    fn fetch(&self) -> std::result::Result<(), CorpusError>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
///
/// Implementations:
///   - WordVectorBox → vocabulary + matrix + build options
pub trait Persistable: Sized {
    /// Save this component's state to the given path
    fn save(&self, path: &Path) -> Result<()>;

    /// Load a component's state from the given path
    fn load(path: &Path) -> Result<Self>;
}
