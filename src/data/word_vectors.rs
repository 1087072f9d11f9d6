// ============================================================
// Layer 4 — Word Vector Box
// ============================================================
// Loads a whitespace-delimited embedding file
//
//   token v_1 v_2 ... v_d
//
// into a vocabulary (token → row index) and an embedding matrix
// of shape [vocab_size, d]. Row i of the matrix always belongs
// to vocabulary index i.
//
// Lifecycle:
//   WordVectorSource ──build(options)──▶ WordVectorBox
//
// `build` consumes the source, so a box can only be built once.
// The box itself exposes no mutation and is Send + Sync, so it
// can be shared by reference across worker threads.
//
// Optional build steps (applied in this order):
//   1. zero token         — all-zero `<pad>` row at index 0,
//                           shifting file rows down by one
//   2. variance normalise — each dimension divided by its
//                           standard deviation over every row
//   3. norm normalise     — each row scaled to unit L2 norm
//
// Reference: ndarray crate documentation
//            Pennington et al. (2014) GloVe

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use crate::domain::document::{Paragraph, Sentence};
use crate::domain::error::VectorError;

/// Vocabulary entry reserved for padding and unknown tokens
pub const PAD_TOKEN: &str = "<pad>";

/// Index of the zero token when one is configured
pub const PAD_INDEX: u32 = 0;

/// Switches for the optional build steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub zero_token: bool,
    pub normalize_variance: bool,
    pub normalize_norm: bool,
}

impl BuildOptions {
    pub fn new(zero_token: bool, normalize_variance: bool, normalize_norm: bool) -> Self {
        Self {
            zero_token,
            normalize_variance,
            normalize_norm,
        }
    }
}

// ─── WordVectorSource ─────────────────────────────────────────────────────────
/// Where the raw embedding text comes from.
#[derive(Debug, Clone)]
pub enum WordVectorSource {
    File(PathBuf),
    #[cfg(test)]
    Text(String),
}

impl WordVectorSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    #[cfg(test)]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Parse the source and produce a query-ready, immutable box.
    pub fn build(self, options: BuildOptions) -> Result<WordVectorBox, VectorError> {
        let parsed = match self {
            WordVectorSource::File(path) => {
                tracing::info!("Building word vectors from '{}'", path.display());
                let file = File::open(&path).map_err(|source| VectorError::Io {
                    path: path.clone(),
                    source,
                })?;
                parse_lines(BufReader::new(file), &path)?
            }
            #[cfg(test)]
            WordVectorSource::Text(text) => parse_lines(text.as_bytes(), Path::new("<inline>"))?,
        };

        WordVectorBox::assemble(parsed, options)
    }
}

/// Raw parse result: tokens in file order, row-major values.
struct ParsedVectors {
    tokens: Vec<String>,
    values: Vec<f32>,
    dimension: usize,
}

fn parse_lines<R: BufRead>(reader: R, path: &Path) -> Result<ParsedVectors, VectorError> {
    let mut dimension: Option<usize> = None;
    let mut tokens = Vec::new();
    let mut values = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|source| VectorError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut fields = line.split_whitespace();
        let Some(token) = fields.next() else {
            continue;
        };

        let row = fields
            .map(|v| {
                v.parse::<f32>().map_err(|_| {
                    VectorError::malformed(line_no, format!("cannot parse '{v}' for token '{token}'"))
                })
            })
            .collect::<Result<Vec<f32>, _>>()?;

        // The first vector line fixes the dimensionality for the whole file
        let dim = *dimension.get_or_insert(row.len());
        if dim == 0 {
            return Err(VectorError::malformed(line_no, format!("token '{token}' has no values")));
        }
        if row.len() != dim {
            return Err(VectorError::malformed(
                line_no,
                format!("expected {dim} values for token '{token}', found {}", row.len()),
            ));
        }

        tokens.push(token.to_string());
        values.extend(row);
    }

    let dimension = dimension.ok_or_else(|| VectorError::malformed(0, "source contains no vectors"))?;

    Ok(ParsedVectors {
        tokens,
        values,
        dimension,
    })
}

// ─── WordVectorBox ────────────────────────────────────────────────────────────
/// Vocabulary + embedding matrix, read-only once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordVectorBox {
    vocab: HashMap<String, u32>,
    tokens: Vec<String>,
    matrix: Array2<f32>,
    options: BuildOptions,
}

impl WordVectorBox {
    fn assemble(parsed: ParsedVectors, options: BuildOptions) -> Result<Self, VectorError> {
        let ParsedVectors {
            tokens: file_tokens,
            values,
            dimension,
        } = parsed;

        let first_file_row = usize::from(options.zero_token);
        let capacity = file_tokens.len() + first_file_row;

        let mut vocab = HashMap::with_capacity(capacity);
        let mut tokens = Vec::with_capacity(capacity);
        let mut data = Vec::with_capacity(capacity * dimension);

        if options.zero_token {
            vocab.insert(PAD_TOKEN.to_string(), PAD_INDEX);
            tokens.push(PAD_TOKEN.to_string());
            data.resize(dimension, 0.0);
        }

        let mut duplicates = 0usize;
        for (token, row) in file_tokens.into_iter().zip(values.chunks_exact(dimension)) {
            // First occurrence wins; dropping the row keeps row i == index i
            if vocab.contains_key(&token) {
                duplicates += 1;
                continue;
            }
            vocab.insert(token.clone(), tokens.len() as u32);
            tokens.push(token);
            data.extend_from_slice(row);
        }

        if duplicates > 0 {
            tracing::warn!("Skipped {} duplicate token row(s)", duplicates);
        }

        let mut matrix = Array2::from_shape_vec((tokens.len(), dimension), data)
            .map_err(|e| VectorError::malformed(0, e.to_string()))?;

        if options.normalize_variance {
            normalize_variance(&mut matrix);
        }
        if options.normalize_norm {
            normalize_norm(&mut matrix);
        }

        tracing::info!(
            "Word vectors ready: {} tokens x {} dims (zero_token={}, variance={}, norm={})",
            tokens.len(),
            dimension,
            options.zero_token,
            options.normalize_variance,
            options.normalize_norm,
        );

        Ok(Self {
            vocab,
            tokens,
            matrix,
            options,
        })
    }

    /// Number of vocabulary entries (including the zero token, if any)
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.matrix.ncols()
    }

    pub fn matrix(&self) -> &Array2<f32> {
        &self.matrix
    }

    /// Vocabulary index of `token`.
    ///
    /// Absent tokens map to [`PAD_INDEX`] when a zero token is
    /// configured, otherwise they are an error.
    pub fn index_of(&self, token: &str) -> Result<u32, VectorError> {
        match self.vocab.get(token) {
            Some(&index) => Ok(index),
            None if self.options.zero_token => Ok(PAD_INDEX),
            None => Err(VectorError::UnknownToken(token.to_string())),
        }
    }

    pub fn sentence_indices(&self, sentence: &[String]) -> Result<Vec<u32>, VectorError> {
        sentence.iter().map(|t| self.index_of(t)).collect()
    }

    /// Structure-preserving map of `index_of` over one paragraph
    pub fn paragraph_indices(&self, paragraph: &[Sentence]) -> Result<Vec<Vec<u32>>, VectorError> {
        paragraph.iter().map(|s| self.sentence_indices(s)).collect()
    }

    /// Lazily map every document to its nested index form.
    ///
    /// The iterator yields exactly one item per document and is
    /// `Clone`, so a clone taken before iterating restarts it.
    pub fn indices_of<'a>(&'a self, documents: &'a [Paragraph]) -> DocumentIndices<'a> {
        DocumentIndices {
            vectors: self,
            documents: documents.iter(),
        }
    }
}

/// Iterator returned by [`WordVectorBox::indices_of`].
#[derive(Clone)]
pub struct DocumentIndices<'a> {
    vectors: &'a WordVectorBox,
    documents: std::slice::Iter<'a, Paragraph>,
}

impl Iterator for DocumentIndices<'_> {
    type Item = Result<Vec<Vec<u32>>, VectorError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.documents
            .next()
            .map(|paragraph| self.vectors.paragraph_indices(paragraph))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.documents.size_hint()
    }
}

impl ExactSizeIterator for DocumentIndices<'_> {}

/// Scale each dimension to unit variance over the whole vocabulary,
/// pad row included. Zero-variance dimensions are left as they are.
fn normalize_variance(matrix: &mut Array2<f32>) {
    if matrix.nrows() == 0 {
        return;
    }
    let variance = matrix.var_axis(Axis(0), 0.0);

    for (mut column, var) in matrix.axis_iter_mut(Axis(1)).zip(variance.iter()) {
        let std_dev = var.sqrt();
        if std_dev > 0.0 {
            column /= std_dev;
        }
    }
}

/// Scale each row to unit L2 norm; zero rows stay zero.
fn normalize_norm(matrix: &mut Array2<f32>) {
    for mut row in matrix.outer_iter_mut() {
        let l2norm = row.dot(&row).sqrt();
        if l2norm > 0.0 {
            row /= l2norm;
        }
    }
}
