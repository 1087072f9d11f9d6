// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Everything from raw review files to rectangular tensors and
// training batches.
//
// The pipeline flows in this order:
//
//   <root>/<split>/<class>/*.txt
//       │
//       ▼
//   CorpusLoader      → reads files, cleans text (parallel)
//       │
//       ▼
//   RuleSegmenter     → sentences of tokens (parallel)
//       │
//       ▼
//   WordVectorBox     → token → vocabulary index
//       │
//       ▼
//   Normaliser        → ragged → [docs, sentences, words]
//       │
//       ▼
//   SplitTensors      → features + labels per split
//       │
//       ▼
//   SentimentBatcher  → tensor batches for training
//
// Reference: Burn Book §4 (Datasets and Dataloaders)
//            Rust Book §13 (Iterators and Closures)

/// Reads the review corpus and checks its layout
pub mod loader;

/// Cleans raw review bytes
pub mod preprocessor;

/// Splits cleaned text into sentences of tokens
pub mod segmenter;

/// Order-preserving parallel map
pub mod parallel;

/// Vocabulary + embedding matrix
pub mod word_vectors;

/// Fixed-length alignment of nested sequences
pub mod normalizer;

/// Split tensors, training samples, Burn Dataset
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Paired shuffling and validation split
pub mod splitter;
