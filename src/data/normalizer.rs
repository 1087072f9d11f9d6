// ============================================================
// Layer 4 — Sequence Normaliser
// ============================================================
// Turns ragged nested sequences into rectangular ones.
//
// The primitive, `align`, fixes one sequence to `target_length`:
//
//   len >= target           → keep the LAST `target` elements
//   len <  target, !prepend → [pad, pad, ..., x1, x2, ...]
//   len <  target,  prepend → [x1, x2, ..., pad, pad, ...]
//
// Keeping the tail favours the end of a review, where the
// verdict usually sits. `prepend` is an alignment toggle: when
// false the content is right-aligned and padding comes first.
//
// Applied twice for a review:
//
//   sentence  → WORDS_PER_SENTENCE tokens      (pad = 0)
//   paragraph → SENTENCES_PER_PARAGRAPH rows   (pad = [0; W])
//
// Both levels share one `prepend` flag so a padding sentence
// and the padding inside a short sentence sit on the same side.
//
// Every pad slot is its own clone of the pad value; nothing in
// the output aliases anything else.

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::data::word_vectors::PAD_INDEX;

/// Fix one sequence to `target_length` elements.
pub fn align<T: Clone>(sequence: &[T], target_length: usize, pad: &T, prepend: bool) -> Vec<T> {
    if sequence.len() >= target_length {
        return sequence[sequence.len() - target_length..].to_vec();
    }

    let shortfall = target_length - sequence.len();
    let padding = std::iter::repeat_with(|| pad.clone()).take(shortfall);

    let mut out = Vec::with_capacity(target_length);
    if prepend {
        out.extend_from_slice(sequence);
        out.extend(padding);
    } else {
        out.extend(padding);
        out.extend_from_slice(sequence);
    }
    out
}

/// Fix every sub-sequence to `target_length` elements.
///
/// Generic over the element type so the same function handles
/// token indices (`T = u32`) and whole sentences (`T = Vec<u32>`).
pub fn normalize_sos<T: Clone>(
    sequences: &[Vec<T>],
    target_length: usize,
    pad: &T,
    prepend: bool,
) -> Vec<Vec<T>> {
    sequences
        .iter()
        .map(|seq| align(seq, target_length, pad, prepend))
        .collect()
}

/// Target shape of one normalised review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphShape {
    pub sentences_per_paragraph: usize,
    pub words_per_sentence: usize,
    pub prepend: bool,
}

impl Default for ParagraphShape {
    fn default() -> Self {
        Self {
            sentences_per_paragraph: 50,
            words_per_sentence: 50,
            prepend: false,
        }
    }
}

impl ParagraphShape {
    /// A sentence made only of padding
    pub fn pad_sentence(&self) -> Vec<u32> {
        vec![PAD_INDEX; self.words_per_sentence]
    }
}

/// Normalise one review: words inside each sentence first,
/// then the list of sentences.
pub fn normalize_paragraph(paragraph: &[Vec<u32>], shape: &ParagraphShape) -> Vec<Vec<u32>> {
    let sentences = normalize_sos(paragraph, shape.words_per_sentence, &PAD_INDEX, shape.prepend);
    align(
        &sentences,
        shape.sentences_per_paragraph,
        &shape.pad_sentence(),
        shape.prepend,
    )
}

/// Normalise a batch of reviews.
pub fn normalize_paragraphs<I>(paragraphs: I, shape: &ParagraphShape) -> Vec<Vec<Vec<u32>>>
where
    I: IntoIterator,
    I::Item: AsRef<[Vec<u32>]>,
{
    paragraphs
        .into_iter()
        .map(|p| normalize_paragraph(p.as_ref(), shape))
        .collect()
}

/// Stack normalised reviews into a [documents, sentences, words] array.
///
/// Every input must already have the shape described by `shape`.
pub fn stack_paragraphs(paragraphs: &[Vec<Vec<u32>>], shape: &ParagraphShape) -> Array3<u32> {
    let dims = (
        paragraphs.len(),
        shape.sentences_per_paragraph,
        shape.words_per_sentence,
    );
    Array3::from_shape_fn(dims, |(d, s, w)| paragraphs[d][s][w])
}
