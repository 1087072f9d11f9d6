// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs, enums, error types, and traits that
// define the core concepts of the system.
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//   - Only plain Rust structs, enums, and traits
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

// Reviews, polarity, splits, and the sentence/token hierarchy
pub mod document;

// Typed errors for vectors, corpus, and training
pub mod error;

// Core abstractions (traits) that other layers implement
pub mod traits;
