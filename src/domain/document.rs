// ============================================================
// Layer 3 — Review Domain Types
// ============================================================
// A review is one plain-text file from the corpus. After
// segmentation it becomes a Paragraph: an ordered list of
// sentences, each an ordered list of token strings.
//
//   Paragraph
//     └── Sentence (Vec<String>)
//           └── token
//
// Ownership is purely compositional — a sentence never points
// back at its paragraph.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};
use std::fmt;

/// One sentence: an ordered list of tokens.
pub type Sentence = Vec<String>;

/// One segmented review: an ordered list of sentences.
pub type Paragraph = Vec<Sentence>;

/// The sentiment class a review belongs to.
/// The directory name (`pos` / `neg`) is the source of truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Directory name under `<root>/<split>/`
    pub fn dir_name(self) -> &'static str {
        match self {
            Polarity::Positive => "pos",
            Polarity::Negative => "neg",
        }
    }

    /// Scalar training target: 1.0 for positive, 0.0 for negative
    pub fn label(self) -> f32 {
        match self {
            Polarity::Positive => 1.0,
            Polarity::Negative => 0.0,
        }
    }
}

/// Which half of the corpus a review comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    pub const ALL: [Split; 2] = [Split::Train, Split::Test];

    pub fn dir_name(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "test",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Which word-vector table produced a tensor.
///
/// Local  → vectors trained on the review corpus itself
/// Global → a larger general-purpose reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    Local,
    Global,
}

impl Representation {
    pub const ALL: [Representation; 2] = [Representation::Local, Representation::Global];

    /// Name used in persisted tensor file names
    pub fn file_tag(self) -> &'static str {
        match self {
            Representation::Local => "glove",
            Representation::Global => "global_glove",
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_tag())
    }
}

/// A raw review loaded from disk, already cleaned
/// (ASCII only, lowercased, paragraph breaks → newlines).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    /// File name — kept for traceability in logs
    pub source: String,

    /// Class taken from the containing directory
    pub polarity: Polarity,

    /// Cleaned review text, not yet segmented
    pub text: String,
}

impl Review {
    pub fn new(source: impl Into<String>, polarity: Polarity, text: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            polarity,
            text: text.into(),
        }
    }
}
